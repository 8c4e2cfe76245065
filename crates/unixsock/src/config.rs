//! TOML configuration for socket handles and logging.
//!
//! ```toml
//! [socket]
//! mode = "non_blocking"
//! kind = "datagram"
//! open_retry_interval_ms = 500
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```
//!
//! Every field is optional; missing ones take their defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::logging::LogConfig;
use crate::socket::{DEFAULT_OPEN_RETRY_INTERVAL, Mode, SocketKind};

/// Settings applied to a [`UnixSocket`](crate::UnixSocket) at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketConfig {
    pub mode: Mode,
    pub kind: SocketKind,
    /// Minimum delay between open attempts after a failure (milliseconds).
    pub open_retry_interval_ms: u64,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Blocking,
            kind: SocketKind::Datagram,
            open_retry_interval_ms: DEFAULT_OPEN_RETRY_INTERVAL.as_millis() as u64,
        }
    }
}

impl SocketConfig {
    #[must_use]
    pub fn open_retry_interval(&self) -> Duration {
        Duration::from_millis(self.open_retry_interval_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub socket: SocketConfig,
    pub logging: LogConfig,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
