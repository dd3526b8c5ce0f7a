//! Error types for store operations.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record was not found.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A unique constraint rejected the write.
    ///
    /// `constraint` names the rule, e.g.
    /// `"version(versionable, version_type, take_name, version_number)"`.
    #[error("uniqueness violation on {constraint}: {detail}")]
    UniquenessViolation { constraint: String, detail: String },

    /// A record points at a parent that does not exist.
    #[error("{kind} {id} refers to missing {parent}")]
    DanglingParent {
        kind: &'static str,
        id: String,
        parent: &'static str,
    },

    /// A lock guarding the backend was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StoreError {
    pub(crate) fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn unique(constraint: &str, detail: impl Into<String>) -> Self {
        Self::UniquenessViolation {
            constraint: constraint.to_string(),
            detail: detail.into(),
        }
    }

    /// Returns `true` for [`StoreError::UniquenessViolation`].
    pub fn is_uniqueness_violation(&self) -> bool {
        matches!(self, Self::UniquenessViolation { .. })
    }
}

/// Convenience type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
