use std::path::PathBuf;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum SnapError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write output document {path}: {source}")]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Configuration error: {0}")]
    Config(String),
}
impl SnapError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SnapError::Io {
            path: path.into(),
            source,
        }
    }
    pub(crate) fn read_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SnapError::ReadDir {
            path: path.into(),
            source,
        }
    }
    pub(crate) fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SnapError::Output {
            path: path.into(),
            source,
        }
    }
    /// Output-stream failures abort the whole run; everything else is scoped to one root.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SnapError::Output { .. } | SnapError::InvalidPath(_))
    }
}
