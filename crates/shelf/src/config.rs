//! Server configuration loaded from `config.json`.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

/// Settings read at startup. Missing fields take their defaults, so an
/// older config file keeps working after a new field is added.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the listener binds, like `0.0.0.0:8080`.
    pub bind_addr: String,
    /// Directory all served and managed files live under.
    pub root_dir: String,
    /// Socket receive timeout in seconds; `0` disables the timeout.
    pub read_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            root_dir: "./files".to_string(),
            read_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load the config file, writing one with default settings when it
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed, or when
    /// the default file cannot be written.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let config = Self::default();
                fs::write(path, serde_json::to_string_pretty(&config)?)?;
                info!("created default config at {}", path.display());
                Ok(config)
            }
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Receive timeout as a [`Duration`], `None` when disabled.
    #[must_use]
    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_secs > 0).then(|| Duration::from_secs(self.read_timeout_secs))
    }
}

/// Errors raised while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read or written.
    Io(io::Error),
    /// The file is not valid JSON for [`Config`].
    Parse(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config I/O error: {err}"),
            Self::Parse(err) => write!(f, "config parse error: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}
