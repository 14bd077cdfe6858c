use thiserror::Error;

use crate::model::Side;
use crate::util::AdapterError;

/// Structured error type for schemacompare library operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot build {side} snapshot: {source}")]
    Source {
        side: Side,
        #[source]
        source: AdapterError,
    },

    #[error("Invalid filter pattern: {pattern}")]
    InvalidFilter { pattern: String },

    #[error("Schema comparison failed with {errors} error(s)")]
    Invalid { errors: usize, report: String },

    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },
}

impl Error {
    pub fn adapter(side: Side, source: AdapterError) -> Self {
        Self::Source { side, source }
    }

    pub fn invalid_filter(pattern: impl Into<String>) -> Self {
        Self::InvalidFilter {
            pattern: pattern.into(),
        }
    }

    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }
}
