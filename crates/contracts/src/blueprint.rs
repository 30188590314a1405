//! TeeBlueprint - Config Loader output
//!
//! Describes the set of destination sinks a tee run fans out to.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete tee configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeeBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Bytes read from the input per fan-out write
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Destination sinks, in order
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

/// Default read chunk size (matches the usual copy buffer of 32 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

impl Default for TeeBlueprint {
    fn default() -> Self {
        Self {
            version: ConfigVersion::V1,
            chunk_size: DEFAULT_CHUNK_SIZE,
            sinks: Vec::new(),
        }
    }
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl SinkConfig {
    /// Create a sink config without parameters
    pub fn new(name: impl Into<String>, sink_type: SinkType) -> Self {
        Self {
            name: name.into(),
            sink_type,
            params: HashMap::new(),
        }
    }

    /// Add a type-specific parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// In-memory buffer
    Memory,
    /// Tracing log output
    Log,
    /// Process standard output
    Stdout,
    /// File output
    File,
    /// Network output (TCP or UDP)
    Network,
}

impl SinkType {
    /// Parameters that must be present for this sink type
    pub fn required_params(&self) -> &'static [&'static str] {
        match self {
            SinkType::File => &["path"],
            SinkType::Network => &["addr"],
            SinkType::Memory | SinkType::Log | SinkType::Stdout => &[],
        }
    }
}
