use thiserror::Error;

use vtrack_model::{ModelError, ValidationError, VersionSummary};
use vtrack_store::StoreError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A version was asked to reference itself.
    #[error("{version} cannot reference itself")]
    SelfReference { version: VersionSummary },

    /// The reference would close a cycle in the reference graph.
    #[error("circular dependency: {reference} already depends on {referencer}")]
    CircularDependency {
        referencer: VersionSummary,
        reference: VersionSummary,
    },
}

impl TrackerError {
    /// Returns `true` if the store rejected a write on a unique constraint.
    ///
    /// These are never retried by the tracker; a caller racing another writer
    /// for the same version number can retry `create_version`.
    pub fn is_uniqueness_violation(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_uniqueness_violation())
    }

    /// The validation failure behind this error, if any.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Model(ModelError::Validation(err)) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for TrackerError {
    fn from(err: ValidationError) -> Self {
        Self::Model(ModelError::Validation(err))
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
