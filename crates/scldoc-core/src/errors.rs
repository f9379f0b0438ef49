use thiserror::Error;

/// Result type alias using DocError
pub type Result<T> = std::result::Result<T, DocError>;

/// Error taxonomy for scldoc operations
///
/// Every error is reported synchronously to the caller of the operation
/// that detected it; the engine never retries on its own.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocError {
    // ===== Resolution Errors =====
    /// Requested id/tag absent from both the staged log and the store
    #[error("Record not found: <{tag_name}> id={id}")]
    NotFound { tag_name: String, id: String },

    /// Resolved record's tag disagrees with the requested tag
    #[error("Tag mismatch for id={id}: requested <{expected}>, found <{found}>")]
    TagMismatch {
        expected: String,
        found: String,
        id: String,
    },

    /// Navigation target is staged as deleted
    #[error("Record was deleted in this chain: <{tag_name}> id={id}")]
    DeletedReference { tag_name: String, id: String },

    /// An id is required to navigate to a non-singleton tag
    #[error("Tag <{tag_name}> is not a singleton: an id is required")]
    MissingId { tag_name: String },

    // ===== Invariant Violations =====
    /// go_to_parent on a record without a parent
    #[error("Cannot go up from root: id={id}")]
    RootHasNoParent { id: String },

    /// delete on the document root
    #[error("Cannot delete the root record: id={id}")]
    CannotDeleteRoot { id: String },

    // ===== Commit Errors =====
    /// The store transaction was rejected; the staged log is untouched
    #[error(
        "Commit failed ({creates} creates, {updates} updates, {deletes} deletes): {reason}"
    )]
    CommitFailed {
        creates: usize,
        updates: usize,
        deletes: usize,
        reason: String,
    },

    // ===== Generic Errors =====
    /// Store implementation failure (I/O, SQL, corrupt row)
    #[error("Store error: {message}")]
    Store { message: String },

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<serde_json::Error> for DocError {
    fn from(err: serde_json::Error) -> Self {
        DocError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_failed_message_carries_counts() {
        let err = DocError::CommitFailed {
            creates: 2,
            updates: 1,
            deletes: 0,
            reason: "disk full".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2 creates"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn test_serde_json_error_converts() {
        let bad = serde_json::from_str::<serde_json::Value>("{");
        let err: DocError = bad.unwrap_err().into();
        assert!(matches!(err, DocError::Serialization { .. }));
    }
}
