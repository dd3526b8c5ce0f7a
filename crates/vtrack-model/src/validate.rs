//! Field validators shared by the model constructors.
//!
//! The conditioners in `vtrack-naming` never fail; these wrappers turn an
//! empty result into a [`ValidationError::InvalidValue`].

use vtrack_naming::{condition_code, condition_free_text};

use crate::error::ValidationError;

/// Condition a display name, rejecting input that leaves nothing behind.
pub fn name(field: &str, input: &str) -> Result<String, ValidationError> {
    non_empty_after(field, input, condition_free_text(input))
}

/// Condition a code, rejecting input that leaves nothing behind.
pub fn code(field: &str, input: &str) -> Result<String, ValidationError> {
    non_empty_after(field, input, condition_code(input))
}

/// Require non-blank text, returned trimmed.
pub fn text(field: &str, input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::invalid(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn non_empty_after(
    field: &str,
    input: &str,
    conditioned: String,
) -> Result<String, ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::invalid(field, "must not be empty"));
    }
    if conditioned.is_empty() {
        return Err(ValidationError::invalid(
            field,
            format!("{input:?} is empty after normalization"),
        ));
    }
    Ok(conditioned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_conditioned() {
        assert_eq!(code("code", "hero char").unwrap(), "Hero_Char");
    }

    #[test]
    fn name_is_conditioned() {
        assert_eq!(name("name", "  hero   char ").unwrap(), "Hero char");
    }

    #[test]
    fn empty_input_rejected() {
        let err = code("code", "   ").unwrap_err();
        assert_eq!(err, ValidationError::invalid("code", "must not be empty"));
    }

    #[test]
    fn empty_after_normalization_rejected() {
        let err = name("base_name", "!!!").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "base_name"));
        assert!(err.to_string().contains("empty after normalization"));
    }

    #[test]
    fn text_is_trimmed() {
        assert_eq!(text("name", "  Model ").unwrap(), "Model");
        assert!(text("name", "").is_err());
    }
}
