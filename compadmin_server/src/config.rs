use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, Level};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub bind: IpAddr,
    pub port: u16,
    /// Path the admin page is served at. Starts and ends with `/`.
    pub mount_path: String,
    pub char_encoding: String,
    pub log_level: String,
    /// Overrides for user-facing message templates, by resource key.
    pub resources: IndexMap<String, String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 2939,
            mount_path: "/".to_owned(),
            char_encoding: "utf-8".to_owned(),
            log_level: "info".to_owned(),
            resources: IndexMap::new(),
        }
    }
}

impl AdminConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("loading config from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config: AdminConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_owned(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.mount_path.starts_with('/') || !self.mount_path.ends_with('/') {
            return Err(ConfigError::Invalid(format!(
                "mount_path {:?} must start and end with '/'",
                self.mount_path
            )));
        }
        if self.char_encoding.trim().is_empty() || !self.char_encoding.is_ascii() {
            return Err(ConfigError::Invalid(format!(
                "char_encoding {:?} is not a usable charset name",
                self.char_encoding
            )));
        }
        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("unknown log_level {:?}", self.log_level)))
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}
