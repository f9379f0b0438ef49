//! Error handling for scldoc-store
//!
//! Wraps scldoc-core's `DocError` with store-specific helpers

use scldoc_core::DocError;

/// Result type alias using DocError
pub type Result<T> = std::result::Result<T, DocError>;

/// Create a store error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> DocError {
    DocError::Store {
        message: err.to_string(),
    }
}
