use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("unknown owner kind: {0:?} (expected \"Asset\" or \"Shot\")")]
    UnknownOwnerKind(String),
}
