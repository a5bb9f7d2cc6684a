//! Calculator module for evaluating buffer expressions.
//!
//! This module provides functionality to:
//! - Rewrite calculator notation into the evaluator's grammar
//! - Reject anything outside the function whitelist
//! - Parse and evaluate over a closed grammar
//! - Format results for the buffer

mod clipboard;
mod detection;
mod error;
mod evaluation;
mod parser;
mod rewrite;

pub use clipboard::sanitize_paste;
pub use detection::{MATH_FUNCTIONS, check_whitelist, is_known_name};
pub use error::{CalcError, ERROR_PREFIX, is_error_text};
pub use evaluation::{
    CalcResult, DEFAULT_PRECISION, MAX_EXPRESSION_LEN, calculate, evaluate_expression,
    format_result, format_with_precision,
};
pub use parser::{Expr, Function, MAX_DEPTH, factorial};
pub use rewrite::{PI_LITERAL, rewrite_expression};
