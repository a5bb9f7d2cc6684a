//! Evaluation pipeline and result formatting.
//!
//! Wraps the rewriter, the whitelist check and the parser into a single
//! call, and turns the numeric result into the canonical buffer text.

use tracing::trace;

use super::detection::check_whitelist;
use super::error::CalcError;
use super::parser::Expr;
use super::rewrite::rewrite_expression;

/// Decimal places used when formatting results.
pub const DEFAULT_PRECISION: usize = 10;

/// Longest buffer, in characters, that is evaluated at all.
pub const MAX_EXPRESSION_LEN: usize = 1024;

/// Result of evaluating a calculator expression.
#[derive(Clone, Debug, PartialEq)]
pub enum CalcResult {
    /// Successful calculation with a finite result.
    Success {
        /// The expression as it was typed.
        expression: String,
        /// The numeric value.
        value: f64,
        /// Formatted for the buffer.
        display_result: String,
    },
    /// The expression was rejected.
    Error {
        /// The expression as it was typed.
        expression: String,
        error: CalcError,
    },
}

impl CalcResult {
    /// Get the expression that was evaluated.
    pub fn expression(&self) -> &str {
        match self {
            Self::Success { expression, .. } => expression,
            Self::Error { expression, .. } => expression,
        }
    }

    /// Check if this is a successful result.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Get the buffer text (formatted result or error message).
    pub fn display(&self) -> String {
        match self {
            Self::Success { display_result, .. } => display_result.clone(),
            Self::Error { error, .. } => error.display_text(),
        }
    }
}

/// Rewrite, check and evaluate a buffer, returning the raw value.
pub fn evaluate_expression(input: &str) -> Result<f64, CalcError> {
    if input.chars().count() > MAX_EXPRESSION_LEN {
        return Err(CalcError::syntax("Expression too long"));
    }

    let rewritten = rewrite_expression(input.trim_ascii());
    trace!(input, %rewritten, "rewrote expression");

    check_whitelist(&rewritten)?;
    let value = Expr::parse(&rewritten)?.eval()?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::syntax("Result too large"))
    }
}

/// Evaluate a buffer and format the outcome for display.
pub fn calculate(input: &str, precision: usize) -> CalcResult {
    let expression = input.trim().to_string();

    match evaluate_expression(&expression) {
        Ok(value) => CalcResult::Success {
            display_result: format_with_precision(value, precision),
            expression,
            value,
        },
        Err(error) => CalcResult::Error { expression, error },
    }
}

/// Format a number with the default precision.
pub fn format_result(value: f64) -> String {
    format_with_precision(value, DEFAULT_PRECISION)
}

/// Format a number with fixed precision and no trailing zeros.
pub fn format_with_precision(value: f64, precision: usize) -> String {
    let formatted = format!("{:.*}", precision, value);
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };

    match trimmed {
        "" | "-0" | "-" => "0".to_string(),
        other => other.to_string(),
    }
}
