//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use zanrcore::error::FrequencyError;
use zanrcore::protocol::{DEFAULT_PORT, KEEPALIVE_INTERVAL, PROTOCOL_VERSION};
use zanrcore::{BitOrder, FrequencyTable, HuffmanCodec};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must not be 0")]
    Zero(&'static str),

    #[error("Server host is empty")]
    EmptyHost,

    #[error("Frequency table {path}: {source}")]
    Frequencies {
        path: PathBuf,
        #[source]
        source: FrequencyError,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub protocol: ProtocolConfig,
    pub relay: RelayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Prompted for on the terminal when absent
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    pub version: u8,
    pub keepalive_secs: u64,
    #[serde(default)]
    pub bit_order: BitOrder,
    /// JSON array of 256 weights; the built-in table is used when absent
    #[serde(default)]
    pub frequencies_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check values that would only fail later at runtime
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.server.port == 0 {
            return Err(ConfigError::Zero("server.port"));
        }
        if self.protocol.keepalive_secs == 0 {
            return Err(ConfigError::Zero("protocol.keepalive_secs"));
        }
        self.frequency_table()?;
        Ok(())
    }

    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.protocol.keepalive_secs)
    }

    /// Frequency table from the configured file, or the built-in one
    pub fn frequency_table(&self) -> Result<FrequencyTable, ConfigError> {
        match &self.protocol.frequencies_file {
            Some(path) => FrequencyTable::load(path).map_err(|source| ConfigError::Frequencies {
                path: path.clone(),
                source,
            }),
            None => Ok(FrequencyTable::default()),
        }
    }

    /// Build the compression tree described by this configuration
    pub fn huffman(&self) -> Result<HuffmanCodec, ConfigError> {
        let table = self.frequency_table()?;
        Ok(HuffmanCodec::with_bit_order(&table, self.protocol.bit_order))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "localhost".to_string(),
                port: DEFAULT_PORT,
                password: None,
            },
            protocol: ProtocolConfig {
                version: PROTOCOL_VERSION,
                keepalive_secs: KEEPALIVE_INTERVAL.as_secs(),
                bit_order: BitOrder::default(),
                frequencies_file: None,
            },
            relay: RelayConfig {
                address: "0.0.0.0".to_string(),
                port: 5000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}
