//! Service configuration loaded from TOML.
//!
//! Lookup order: the file named by `RELIEF_HUB_CONFIG`, then
//! `relief-hub.toml` in the working directory, then built-in defaults.
//! `PORT` overrides the port of `server.listen_addr`.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Env var naming the config file
pub const CONFIG_ENV: &str = "RELIEF_HUB_CONFIG";

/// File looked for in the working directory when `CONFIG_ENV` is unset
pub const DEFAULT_CONFIG_FILE: &str = "relief-hub.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid PORT value {0:?}")]
    Port(String),
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
    #[serde(default)]
    pub allocation: AllocationConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

/// Rules deciding which new requests are held for a POC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Substrings of the lowercased resource name that force a hold
    #[serde(default = "default_keywords")]
    pub sensitive_keywords: Vec<String>,
    /// Per-category quantity above which a request is held
    #[serde(default = "default_thresholds")]
    pub thresholds: BTreeMap<String, u64>,
    /// Threshold for categories missing from `thresholds`
    #[serde(default = "default_threshold")]
    pub default_threshold: u64,
    /// Run reverse allocation when a POC approves a held request
    #[serde(default)]
    pub rematch_on_approval: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Trust score a donor earns per match
    #[serde(default = "default_trust_reward")]
    pub trust_reward: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Most notifications returned by a listing
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

// Default value functions

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 4000))
}

fn default_keywords() -> Vec<String> {
    ["cash", "money", "fund", "finance", "donation", "loan"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_thresholds() -> BTreeMap<String, u64> {
    [
        ("food-nutrition", 500),
        ("medical-healthcare", 50),
        ("shelter-clothing", 200),
        ("water-sanitation", 1000),
        ("other", 10),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn default_threshold() -> u64 {
    100
}

fn default_trust_reward() -> i64 {
    crate::engine::DEFAULT_TRUST_REWARD
}

fn default_list_limit() -> usize {
    20
}

fn default_log_filter() -> String {
    "relief_hub=info,tower_http=info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            sensitive_keywords: default_keywords(),
            thresholds: default_thresholds(),
            default_threshold: default_threshold(),
            rematch_on_approval: false,
        }
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            trust_reward: default_trust_reward(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load from the environment-selected file, falling back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::config_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        if let Ok(port) = std::env::var("PORT") {
            config.apply_port(&port)?;
        }
        Ok(config)
    }

    /// Parse a specific file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replace the listen port, keeping the host
    pub fn apply_port(&mut self, port: &str) -> Result<(), ConfigError> {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::Port(port.to_string()))?;
        self.server.listen_addr.set_port(port);
        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        // Explicit override must exist; a missing file there is an error
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.exists().then_some(local)
    }
}
