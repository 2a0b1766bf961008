//! Session error types.

use thiserror::Error;

/// Errors returned to the caller of a session operation.
///
/// Only precondition violations end up here; network and server failures are
/// resolved into session state and notices instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("quality must be between 0 and 5, got {0}")]
    InvalidQuality(i64),
}
