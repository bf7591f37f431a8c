//! Engine configuration
//!
//! Settings come from a TOML file; every key is optional and falls back to
//! the defaults in [`crate::constants`].
//!
//! ```toml
//! [cache]
//! max_entries = 1000
//!
//! [downsample]
//! default_target_points = 1000
//!
//! [worker]
//! request_timeout_ms = 30000
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cache: CacheConfig,
    pub downsample: DownsampleConfig,
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry bound of the downsample result cache
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: constants::cache::DEFAULT_MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownsampleConfig {
    /// Base budget for requests that omit `targetPoints`
    pub default_target_points: usize,
}

impl Default for DownsampleConfig {
    fn default() -> Self {
        Self {
            default_target_points: constants::downsample::DEFAULT_TARGET_POINTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// How long a caller waits for a response before giving up
    pub request_timeout_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: constants::worker::DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl WorkerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl EngineConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load `path` if given, else the default file in the working directory
    /// if it exists, else built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(constants::config::CONFIG_FILE);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject sizes the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.max_entries == 0 {
            return Err(ConfigError::Invalid {
                field: "cache.max_entries",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.downsample.default_target_points == 0 {
            return Err(ConfigError::Invalid {
                field: "downsample.default_target_points",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.worker.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "worker.request_timeout_ms",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
