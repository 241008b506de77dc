use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning the source file into a [`Dataset`](super::model::Dataset).
#[derive(Debug, Error)]
pub enum DataError {
    #[error("data file '{}' is unavailable: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("data file '{}' is not valid CSV: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("data file '{}' is missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },
    #[error("row {row}: column '{column}' value '{value}' is not numeric")]
    MalformedNumericField {
        row: usize,
        column: String,
        value: String,
    },
}

impl DataError {
    /// The file could not be used at all (missing, unreadable or wrong shape).
    /// Fatal at startup: nothing of the dashboard renders.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DataError::Unavailable { .. } | DataError::Csv { .. } | DataError::MissingColumn { .. }
        )
    }
}
