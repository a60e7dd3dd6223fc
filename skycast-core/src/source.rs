//! Where snapshots come from.
//!
//! Fetching runs wherever the caller likes (typically a tokio task). The result
//! must be handed back to the thread that owns the `ObservableValue` before it
//! is `set`.

use async_trait::async_trait;
use std::{fmt::Debug, path::PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::model::WeatherSnapshot;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read snapshot from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse snapshot from {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait SnapshotSource: Send + Sync + Debug {
    async fn fetch(&self) -> Result<WeatherSnapshot, SourceError>;
}

/// Reads a JSON-encoded [`WeatherSnapshot`] from disk on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl SnapshotSource for JsonFileSource {
    async fn fetch(&self) -> Result<WeatherSnapshot, SourceError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Read { path: self.path.clone(), source })?;

        let snapshot: WeatherSnapshot = serde_json::from_str(&body)
            .map_err(|source| SourceError::Parse { path: self.path.clone(), source })?;

        debug!(
            path = %self.path.display(),
            update_time = %snapshot.update_time(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }
}
