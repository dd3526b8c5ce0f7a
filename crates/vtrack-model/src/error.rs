//! Error types for model construction and validation.

use thiserror::Error;

use vtrack_template::TemplateError;
use vtrack_types::OwnerKind;

/// A rejected field value.
///
/// Every validating constructor reports one of these three kinds so callers
/// can tell a wrongly typed value from a well-typed but unacceptable one
/// from an absent one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The value has the wrong type (e.g. a number where a string is expected).
    #[error("{field}: expected {expected}")]
    TypeMismatch { field: String, expected: String },

    /// The value has the right type but unacceptable content.
    #[error("{field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// A required value was not supplied.
    #[error("{field} is required")]
    MissingRequiredField { field: String },
}

impl ValidationError {
    pub fn type_mismatch(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
        }
    }

    /// The name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::TypeMismatch { field, .. }
            | Self::InvalidValue { field, .. }
            | Self::MissingRequiredField { field } => field,
        }
    }
}

/// Errors raised by the domain model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The version type applies to a different kind of owner.
    #[error("version type {version_type:?} is for {expected} owners, not {actual}")]
    IncompatibleType {
        version_type: String,
        expected: OwnerKind,
        actual: OwnerKind,
    },

    /// The status is neither a configured code nor a configured display name.
    #[error("invalid status {value:?}; expected one of: {allowed}")]
    InvalidStatus { value: String, allowed: String },

    /// A version type template failed to parse.
    #[error("template syntax error in {field}: {source}")]
    TemplateSyntax {
        field: String,
        #[source]
        source: TemplateError,
    },

    /// A template parsed but could not be rendered for this context.
    #[error("failed to render {field}: {source}")]
    Render {
        field: String,
        #[source]
        source: TemplateError,
    },

    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for model results.
pub type ModelResult<T> = Result<T, ModelError>;
