//! Error types for template parsing and rendering.

use thiserror::Error;

/// Errors that can occur while parsing or rendering a template.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// The template source is malformed.
    #[error("template syntax error at line {line}: {message}")]
    Syntax {
        /// 1-based line of the offending construct.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// A filter name is not known to the renderer.
    #[error("unknown filter {name:?} at line {line}")]
    UnknownFilter { name: String, line: usize },

    /// A filter was applied to values it cannot handle.
    #[error("filter {filter:?} failed: {reason}")]
    Filter { filter: String, reason: String },
}

impl TemplateError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn filter(filter: &str, reason: impl Into<String>) -> Self {
        Self::Filter {
            filter: filter.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for template results.
pub type TemplateResult<T> = Result<T, TemplateError>;
