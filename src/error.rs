use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or reshaping the metadata table.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("row {row}: expected {expected} fields, found {found}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("archive {0} contains no .csv entry")]
    EmptyArchive(PathBuf),

    #[error("column '{name}' has {found} values but the table has {expected} rows")]
    LengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// Errors raised while drawing charts.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no TrueType font found (searched {searched} locations); pass --font <PATH>")]
    FontNotFound { searched: usize },

    #[error("invalid font file {path}: {reason}")]
    InvalidFont { path: PathBuf, reason: String },

    #[error("drawing {path} failed: {reason}")]
    Drawing { path: PathBuf, reason: String },
}

impl RenderError {
    /// Wrap a plotters drawing error, which is generic over the backend.
    pub fn drawing(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        RenderError::Drawing {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }
}
