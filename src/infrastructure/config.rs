//! Optional TOML configuration.
//!
//! ```toml
//! root_policy = "last-match"
//! ```

use crate::domain::callgraph::RootPolicy;
use crate::domain::error::StatsError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    root_policy: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    pub root_policy: RootPolicy,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, StatsError> {
        let raw: RawConfig =
            toml::from_str(text).map_err(|e| StatsError::Config(e.to_string()))?;
        let root_policy = match raw.root_policy {
            Some(name) => name.parse().map_err(StatsError::Config)?,
            None => RootPolicy::default(),
        };
        Ok(Config { root_policy })
    }

    pub fn load(path: &Path) -> Result<Self, StatsError> {
        let text = fs::read_to_string(path).map_err(|source| StatsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
