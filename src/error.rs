//! Error types
//!
//! Nothing in the labs is fatal. These errors are absorbed at the edges:
//! field errors become answer marks, settings errors fall back to defaults.

use thiserror::Error;

/// Why a student-entered numeric field could not be read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field is blank")]
    Blank,
    #[error("not a number: {0:?}")]
    NotNumeric(String),
}

/// Parse a numeric input field the way the page reads it (trimmed, finite)
pub fn parse_field(text: &str) -> Result<f64, FieldError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Blank);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FieldError::NotNumeric(trimmed.to_string())),
    }
}

#[derive(Debug, Error)]
pub enum LabError {
    #[error("invalid lab settings: {0}")]
    Settings(#[from] serde_json::Error),
    #[error(transparent)]
    Field(#[from] FieldError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field(" 12.5 "), Ok(12.5));
        assert_eq!(parse_field(""), Err(FieldError::Blank));
        assert_eq!(parse_field("   "), Err(FieldError::Blank));
        assert_eq!(
            parse_field("abc"),
            Err(FieldError::NotNumeric("abc".to_string()))
        );
        assert!(matches!(parse_field("inf"), Err(FieldError::NotNumeric(_))));
    }
}
