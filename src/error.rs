use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TimeDiffError>;

#[derive(Debug, Error)]
pub enum TimeDiffError {
    #[error("{} does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("{} is not a usable dataset: {reason}", path.display())]
    InvalidFile { path: PathBuf, reason: String },

    /// A normalized cell that still does not parse as a clock time.
    #[error("row {row} column {column}: {value:?} is not a valid time: {source}")]
    Parse {
        row: usize,
        column: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TimeDiffError {
    pub(crate) fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// One-line diagnostic printed at the process boundary.
    pub fn diagnostic(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "File not found",
            Self::InvalidFile { .. } => "Invalid file",
            Self::Parse { .. } => "Invalid time value",
            Self::Csv { .. } | Self::Io { .. } => "Failed to process file",
        }
    }
}
