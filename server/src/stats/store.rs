//! File-backed statistics store

use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

pub const SUMMARY_FILE: &str = "summary_stats.json";
pub const TRANSITION_MATRIX_FILE: &str = "transition_matrix.json";

/// Errors that can occur when reading statistics
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Statistics file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse statistics file {file}: {reason}")]
    ParseError { file: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Reads statistics documents from a directory
///
/// Files are read on every request so a pipeline re-run shows up without a restart.
#[derive(Debug, Clone)]
pub struct StatsStore {
    dir: PathBuf,
}

impl StatsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Per-class area summary for both periods
    pub async fn summary(&self) -> Result<Value, StatsError> {
        self.read_json(SUMMARY_FILE).await
    }

    /// Class transition matrix between the two periods
    pub async fn transition_matrix(&self) -> Result<Value, StatsError> {
        self.read_json(TRANSITION_MATRIX_FILE).await
    }

    async fn read_json(&self, file: &str) -> Result<Value, StatsError> {
        let path = self.dir.join(file);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StatsError::NotFound(file.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        debug!("Read {} bytes from {:?}", bytes.len(), path);

        serde_json::from_slice(&bytes).map_err(|e| StatsError::ParseError {
            file: file.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_stats_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("landcover-stats-{}-{}", name, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_reads_summary_and_matrix() {
        let dir = temp_stats_dir("read");
        std::fs::write(dir.join(SUMMARY_FILE), r#"{"2018": {"Forest": 120.5}}"#).unwrap();
        std::fs::write(dir.join(TRANSITION_MATRIX_FILE), r#"[[1, 0], [0, 1]]"#).unwrap();
        let store = StatsStore::new(&dir);

        assert_eq!(store.summary().await.unwrap(), json!({"2018": {"Forest": 120.5}}));
        assert_eq!(store.transition_matrix().await.unwrap(), json!([[1, 0], [0, 1]]));

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = temp_stats_dir("missing");
        let store = StatsStore::new(&dir);

        assert!(matches!(store.summary().await, Err(StatsError::NotFound(f)) if f == SUMMARY_FILE));

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let dir = temp_stats_dir("invalid");
        std::fs::write(dir.join(TRANSITION_MATRIX_FILE), "{not json").unwrap();
        let store = StatsStore::new(&dir);

        assert!(matches!(
            store.transition_matrix().await,
            Err(StatsError::ParseError { .. })
        ));

        std::fs::remove_dir_all(dir).ok();
    }
}
