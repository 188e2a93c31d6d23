use std::{fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_CHUNK_CAPACITY: usize = 2048;

/// Tunables for a follow loop.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TailerConfig {
    /// Wait between read attempts that produced no bytes.
    pub poll_interval: Duration,
    /// Upper bound on bytes produced by a single read.
    pub chunk_capacity: usize,
}

impl Default for TailerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
        }
    }
}

/// On-disk shape of [`TailerConfig`]; every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TailerConfigFile {
    #[serde(default)]
    poll_interval_ms: Option<u64>,
    #[serde(default)]
    chunk_capacity: Option<usize>,
}

impl TailerConfig {
    /// Parses a TOML document such as:
    ///
    /// ```toml
    /// poll_interval_ms = 250
    /// chunk_capacity = 4096
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let file: TailerConfigFile =
            toml::from_str(input).map_err(|source| ConfigError::Parse { source })?;
        let defaults = Self::default();
        let config = Self {
            poll_interval: file
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            chunk_capacity: file.chunk_capacity.unwrap_or(defaults.chunk_capacity),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_capacity == 0 {
            return Err(ConfigError::InvalidChunkCapacity);
        }
        Ok(())
    }
}
