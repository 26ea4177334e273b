// Infrastructure implementations for statstree.

pub mod config;

use crate::domain::callgraph::{build_call_tree, CallTree, RootPolicy};
use crate::domain::error::StatsError;
use crate::domain::stats::StatsMap;
use crate::ports::{CallTreeBuilder, StatsSource};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Stats JSON stored on disk.
pub struct JsonStatsFile {
    path: PathBuf,
}

impl JsonStatsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatsSource for JsonStatsFile {
    fn load(&self) -> Result<StatsMap, StatsError> {
        let bytes = fs::read(&self.path).map_err(|source| StatsError::Read {
            path: self.path.clone(),
            source,
        })?;
        let stats: StatsMap = serde_json::from_slice(&bytes)?;
        debug!("Loaded {} stats entries from {}", stats.len(), self.path.display());
        Ok(stats)
    }
}

/// Stats JSON already held in memory (e.g. a response body).
pub struct JsonStatsStr<'a>(pub &'a str);

impl StatsSource for JsonStatsStr<'_> {
    fn load(&self) -> Result<StatsMap, StatsError> {
        Ok(serde_json::from_str(self.0)?)
    }
}

/// Location of an uploaded profile inside the system temp directory.
pub fn stored_profile_path(name: &str) -> Result<PathBuf, StatsError> {
    if name.is_empty() {
        return Err(StatsError::EmptyProfileName);
    }
    Ok(std::env::temp_dir().join(name))
}

/// Builds call trees with a fixed root tie-break policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct PolicyTreeBuilder {
    pub policy: RootPolicy,
}

impl PolicyTreeBuilder {
    pub fn new(policy: RootPolicy) -> Self {
        Self { policy }
    }
}

impl CallTreeBuilder for PolicyTreeBuilder {
    fn build_call_tree<'s>(&self, stats: &'s StatsMap) -> CallTree<'s> {
        build_call_tree(stats, self.policy)
    }
}
