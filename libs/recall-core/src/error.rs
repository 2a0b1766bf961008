//! Error types for recall-core.

use thiserror::Error;

/// Result type alias using CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the core before or around scheduling.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("quality must be between 0 and 5, got {0}")]
    InvalidQuality(i64),

    #[error("card store error: {0}")]
    Store(String),
}
