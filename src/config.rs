//! phaseboard configuration.
//!
//! Loaded from `~/.phaseboard/config.toml`. Every key is optional and a
//! missing file is the default configuration.
//!
//! ```toml
//! storage-root = "/var/lib/phaseboard"
//! log-level = "info"
//! ```

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::storage::Storage;

/// Environment variable that overrides the storage root.
pub const HOME_ENV: &str = "PHASEBOARD_HOME";

/// Log filter used when neither `PHASEBOARD_LOG` nor `log-level` is set.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// phaseboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Directory holding the build database.
    pub storage_root: Option<PathBuf>,

    /// Default tracing filter, e.g. `info` or `phaseboard=debug`.
    pub log_level: Option<String>,
}

impl Config {
    /// Load config from `~/.phaseboard/config.toml`.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from a specific file. A missing file yields the default.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The config file path: `~/.phaseboard/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".phaseboard").join("config.toml"))
    }

    /// Resolve the storage root.
    ///
    /// Checks in order: `PHASEBOARD_HOME`, `storage-root`, `~/.phaseboard/`.
    pub fn storage_root(&self) -> Option<PathBuf> {
        self.storage_root_with(env::var_os(HOME_ENV).map(PathBuf::from))
    }

    fn storage_root_with(&self, env_root: Option<PathBuf>) -> Option<PathBuf> {
        env_root
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| self.storage_root.clone())
            .or_else(Storage::default_root)
    }

    /// The configured log filter, or [`DEFAULT_LOG_LEVEL`].
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
