use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures at the ingestion boundary. All of them abort the run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("content root does not exist: {}", .0.display())]
    RootMissing(PathBuf),
    #[error("failed to walk content directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),
    #[error("transient I/O error reading {} (gave up after {attempts} attempts): {source}", .path.display())]
    IoTransient {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ingestion timed out after {0:?}")]
    Timeout(Duration),
    #[error("ingestion cancelled")]
    Cancelled,
    #[error("read task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IngestError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
