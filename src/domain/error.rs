//! Structured error types for loading stats and configuration.
//!
//! Building the call tree itself never fails; these only cover the edges
//! where files and text come in.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Failed to read stats file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stats document is not valid profile JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Profile name must not be empty")]
    EmptyProfileName,
}
