//! Configuration for merge runs

use serde::Deserialize;
use std::path::Path;

use crate::error::{MergeError, MergeResult};

/// Tunables for one merge run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    /// Maximum number of children any node combines in one merge step
    pub merge_factor: usize,
    /// Maximum number of node executions in flight at once
    pub parallelism: usize,
    /// Whether valid outputs from a previous run are reused instead of
    /// recomputed
    pub resume: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            merge_factor: 2,
            parallelism: 4,
            resume: true,
        }
    }
}

impl MergeConfig {
    /// Check parameter bounds; called before any work starts
    pub fn validate(&self) -> MergeResult<()> {
        if self.merge_factor < 2 {
            return Err(MergeError::invalid_parameter(
                "merge_factor",
                self.merge_factor,
                "must be at least 2",
            ));
        }
        if self.parallelism < 1 {
            return Err(MergeError::invalid_parameter(
                "parallelism",
                self.parallelism,
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> MergeResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MergeError::storage_io("Failed to read config file", path.into(), e))?;
        let config: MergeConfig = toml::from_str(&contents).map_err(|e| MergeError::Storage {
            message: format!("Failed to parse config file: {e}"),
            path: Some(path.into()),
            source: Some(Box::new(e)),
        })?;
        config.validate()?;
        Ok(config)
    }
}
