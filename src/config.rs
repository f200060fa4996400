use std::{
    collections::HashMap,
    fs::{self, File},
    io::prelude::*,
    path::{Path, PathBuf},
    time::Duration,
};

use net::{ServerAddress, SlpClient};
use serde::{Deserialize, Serialize};

/// Env var that points at an alternative settings file.
pub const CONFIG_PATH_VAR: &str = "MCSTAT_CONFIG";

/// Top-level configuration for the application, loaded from a TOML file.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct McstatConfig {
    /// Socket address the HTTP API binds to, e.g. "0.0.0.0:1410".
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Seconds between two polls.
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Per connection attempt. Values below 1 ms are raised to 1 ms.
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Budget for the whole exchange once connected. Raised to at least 1 ms.
    #[serde(default = "default_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Protocol version announced in the handshake.
    #[serde(default)]
    pub protocol_version: u32,

    /// Flat file the samples are appended to.
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,

    /// Server whose player count is recorded, as `"host[:port]"` or a
    /// `[target]` table.
    #[serde(default = "default_target")]
    pub target: ServerAddress,

    #[serde(flatten)]
    pub other_fields: HashMap<String, toml::Value>,
}

fn default_bind() -> String {
    "0.0.0.0:1410".to_string()
}

fn default_target() -> ServerAddress {
    ServerAddress::with_default_port("localhost")
}

fn default_interval() -> u64 {
    10
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_history_file() -> PathBuf {
    PathBuf::from("player_stats.txt")
}

impl Default for McstatConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            target: default_target(),
            interval: default_interval(),
            connect_timeout_ms: default_timeout_ms(),
            read_timeout_ms: default_timeout_ms(),
            protocol_version: 0,
            history_file: default_history_file(),
            other_fields: HashMap::new(),
        }
    }
}

impl McstatConfig {
    /// `$MCSTAT_CONFIG`, or `settings.toml` in `dir`.
    pub fn resolve_path(dir: &Path) -> PathBuf {
        dotenvy::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| dir.join("settings.toml"))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self, McstatConfigLoadError> {
        let raw = fs::read_to_string(path).map_err(McstatConfigLoadError::Io)?;
        let config: Self = toml::from_str(&raw).map_err(McstatConfigLoadError::Parse)?;

        for field in &config.other_fields {
            log::warn!(
                "Unknown configuration '{}' with value {:?}",
                field.0,
                field.1
            );
        }

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let config_str = toml::to_string(&self)?;
        let mut file = File::create(path)?;
        file.write_all(config_str.as_bytes())?;
        Ok(())
    }

    /// Loads `path`, writing defaults there when the file cannot be read.
    /// A file that exists but does not parse is an error.
    pub fn load_or_init(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => {
                // Save config to fill missing fields
                let _ = config.save(path);
                Ok(config)
            }
            Err(McstatConfigLoadError::Io(_)) => {
                let default_config = Self::default();
                let _ = default_config.save(path);
                Ok(default_config)
            }
            Err(McstatConfigLoadError::Parse(parse_error)) => Err(parse_error.into()),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(1))
    }

    pub fn client(&self) -> SlpClient {
        SlpClient::new(
            Duration::from_millis(self.connect_timeout_ms),
            Duration::from_millis(self.read_timeout_ms),
        )
        .with_protocol_version(self.protocol_version)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum McstatConfigLoadError {
    #[error("Could not open config")]
    Io(#[from] std::io::Error),
    #[error("Could not parse")]
    Parse(#[from] toml::de::Error),
}
