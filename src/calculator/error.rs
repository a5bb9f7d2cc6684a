//! Error kinds produced while editing or evaluating an expression.

use thiserror::Error;

/// Prefix every error buffer starts with.
pub const ERROR_PREFIX: &str = "Error: ";

/// Why an edit or an evaluation was rejected.
///
/// None of these are fatal: the session renders them into the buffer
/// as `"Error: <reason>"` and waits for the next symbol.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CalcError {
    /// Factorial of a negative or non-integer number.
    #[error("Factorial is only defined for non-negative integers")]
    FactorialUndefined,
    #[error("Square root of a negative number")]
    NegativeSqrt,
    #[error("Logarithm of a non-positive number")]
    NonPositiveLog,
    #[error("Division by zero")]
    DivisionByZero,
    /// A numeric-looking token that does not parse, e.g. `1.2.3`.
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
    #[error("No number before %")]
    NoOperandForPercent,
    #[error("Invalid character '{0}'")]
    InvalidCharacters(char),
    #[error("Unknown name '{0}'")]
    DisallowedName(String),
    /// Overflow, malformed grouping and any other evaluator-level failure.
    #[error("{0}")]
    OverflowOrSyntax(String),
}

impl CalcError {
    pub(crate) fn syntax(detail: impl Into<String>) -> Self {
        Self::OverflowOrSyntax(detail.into())
    }

    /// The text shown in the buffer while this error is displayed.
    pub fn display_text(&self) -> String {
        format!("{}{}", ERROR_PREFIX, self)
    }
}

/// Check whether a buffer currently shows an error message.
pub fn is_error_text(buffer: &str) -> bool {
    buffer.starts_with(ERROR_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text() {
        assert_eq!(
            CalcError::DivisionByZero.display_text(),
            "Error: Division by zero"
        );
        assert_eq!(
            CalcError::DisallowedName("exec".into()).display_text(),
            "Error: Unknown name 'exec'"
        );
    }

    #[test]
    fn test_is_error_text() {
        assert!(is_error_text(&CalcError::NegativeSqrt.display_text()));
        assert!(!is_error_text("12+3"));
        assert!(!is_error_text("0"));
    }
}
