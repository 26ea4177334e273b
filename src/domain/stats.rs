//! Flat profiling stats, one entry per function.
//!
//! The JSON shape is the one produced by the upstream stats encoder: an object
//! keyed by `"file,line,name"` whose values are positional 5-element arrays
//! `[calls, recursive, local, cumulative, callers]`.

use indexmap::IndexMap;
use serde::Deserialize;

/// Stats keyed by function identifier, in document order.
pub type StatsMap = IndexMap<String, StatsEntry>;

/// Self-reported stats for one function.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawEntry")]
pub struct StatsEntry {
    /// Total invocation count
    pub calls: u64,
    /// Recursive (non-primitive) invocation count
    pub recursive: u64,
    /// Self time
    pub local: f64,
    /// Inclusive time
    pub cumulative: f64,
    /// Caller id -> attribution recorded for that caller
    pub callers: IndexMap<String, CallerStats>,
}

impl StatsEntry {
    pub fn new(calls: u64, recursive: u64, local: f64, cumulative: f64) -> Self {
        Self {
            calls,
            recursive,
            local,
            cumulative,
            callers: IndexMap::new(),
        }
    }

    /// Builder-style helper used by tests and benches.
    pub fn with_caller(mut self, caller: impl Into<String>, stats: CallerStats) -> Self {
        self.callers.insert(caller.into(), stats);
        self
    }
}

#[derive(Deserialize)]
struct RawEntry(u64, u64, f64, f64, IndexMap<String, CallerStats>);

impl From<RawEntry> for StatsEntry {
    fn from(RawEntry(calls, recursive, local, cumulative, callers): RawEntry) -> Self {
        Self {
            calls,
            recursive,
            local,
            cumulative,
            callers,
        }
    }
}

/// Attribution a callee records for one of its callers.
///
/// Only the presence of the caller key matters when building the tree; the
/// payload is kept for renderers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CallerStats {
    /// `[calls, recursive, local, cumulative]`
    Timed(u64, u64, f64, f64),
    /// Older stats dumps only record a call count.
    Count(u64),
    Raw(serde_json::Value),
}

impl CallerStats {
    pub fn calls(&self) -> Option<u64> {
        match self {
            CallerStats::Timed(calls, ..) | CallerStats::Count(calls) => Some(*calls),
            CallerStats::Raw(_) => None,
        }
    }
}

/// A function identifier split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionKey {
    pub file: String,
    pub line: u32,
    pub name: String,
}

impl FunctionKey {
    /// Parse a `"file,line,name"` identifier.
    ///
    /// File names may contain commas, so the line is the first segment (after
    /// the leading one) that parses as an integer. Returns `None` when no such
    /// segment exists.
    pub fn parse(key: &str) -> Option<Self> {
        let commas: Vec<usize> = key.match_indices(',').map(|(i, _)| i).collect();
        for pair in commas.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            if let Ok(line) = key[start + 1..end].parse::<u32>() {
                return Some(FunctionKey {
                    file: key[..start].to_string(),
                    line,
                    name: key[end + 1..].to_string(),
                });
            }
        }
        None
    }

    /// True for interpreter builtins, which carry no source location.
    pub fn is_builtin(&self) -> bool {
        self.file == "~" && self.line == 0
    }

    pub fn label(&self) -> String {
        if self.is_builtin() {
            self.name.clone()
        } else {
            format!("{} ({}:{})", self.name, self.file, self.line)
        }
    }
}

/// Human-readable label for any identifier, falling back to the raw key.
pub fn display_label(key: &str) -> String {
    FunctionKey::parse(key)
        .map(|k| k.label())
        .unwrap_or_else(|| key.to_string())
}
