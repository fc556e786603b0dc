//! Bridge server configuration.
//!
//! Loaded from a YAML file:
//!
//! ```yaml
//! port: 8883
//! chunk_size: 128
//! max_line: 256
//! documents:
//!   thing1:
//!     state: "on"
//!     temp: 72.5
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use sbridge_protocol::{DEFAULT_CHUNK_SIZE, JSON_CHUNK_PREFIX, MAX_LINE_LENGTH};

/// Errors loading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file could not be parsed as YAML.
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configured chunk size leaves no room for chunk payload.
    #[error("chunk_size {0} leaves no payload room after the chunk prefix")]
    ChunkSizeTooSmall(usize),
}

/// Bridge server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Chunk size for fragmented JSON responses.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Maximum accepted command line length.
    #[serde(default = "default_max_line")]
    pub max_line: usize,

    /// Shadow documents preloaded into the JSON document cache, keyed by
    /// identifier.
    #[serde(default)]
    pub documents: HashMap<String, Value>,
}

fn default_port() -> u16 {
    9350
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_max_line() -> usize {
    MAX_LINE_LENGTH
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            port: default_port(),
            chunk_size: default_chunk_size(),
            max_line: default_max_line(),
            documents: HashMap::new(),
        }
    }
}

impl BridgeConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<BridgeConfig, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: BridgeConfig = serde_yaml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// A chunk size at or below the chunk prefix length would force the
    /// chunking codec to emit empty chunks; that is rejected here, at
    /// configuration time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size <= JSON_CHUNK_PREFIX.len() {
            return Err(ConfigError::ChunkSizeTooSmall(self.chunk_size));
        }
        Ok(())
    }
}
