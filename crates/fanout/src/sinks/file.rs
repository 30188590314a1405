//! FileSink - appends or truncates a file on disk

use async_trait::async_trait;
use contracts::{ByteSink, ContractError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output file
    pub path: PathBuf,
    /// Append to existing content instead of truncating
    pub append: bool,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .ok_or_else(|| "missing 'path' parameter".to_string())?;

        let append = match params.get("append").map(String::as_str) {
            Some("true") => true,
            Some("false") | None => false,
            Some(other) => return Err(format!("invalid 'append' value '{}'", other)),
        };

        Ok(Self { path, append })
    }
}

/// Sink that writes to a file
///
/// Each write is flushed before it is reported as accepted.
pub struct FileSink {
    name: String,
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Open (creating if needed) the configured file
    #[instrument(name = "file_sink_open", skip(name, config), fields(path = %config.path.display()))]
    pub async fn open(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        let name = name.into();

        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(config.append)
            .truncate(!config.append)
            .open(&config.path)
            .await?;

        debug!(sink = %name, append = config.append, "FileSink opened");

        Ok(Self {
            name,
            path: config.path,
            file: Mutex::new(file),
        })
    }

    /// Create from params map (for factory)
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = FileSinkConfig::from_params(params)
            .map_err(|e| ContractError::config_validation(format!("sinks[{}].params", name), e))?;

        Self::open(name.clone(), config)
            .await
            .map_err(|e| ContractError::sink_connection(name, e.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush file contents and metadata to disk
    pub async fn sync_all(&self) -> Result<(), ContractError> {
        let file = self.file.lock().await;
        file.sync_all()
            .await
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    async fn persist(&self, buf: &[u8]) -> std::io::Result<()> {
        let mut file = self.file.lock().await;
        file.write_all(buf).await?;
        file.flush().await
    }
}

#[async_trait]
impl ByteSink for FileSink {
    #[instrument(
        name = "file_sink_write",
        skip(self, buf),
        fields(sink = %self.name, bytes = buf.len())
    )]
    async fn write(&self, buf: &[u8]) -> Result<usize, ContractError> {
        self.persist(buf).await.map_err(|e| {
            error!(sink = %self.name, error = %e, "Write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })?;
        Ok(buf.len())
    }
}
