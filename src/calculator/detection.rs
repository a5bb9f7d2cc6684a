//! Whitelist check for rewritten expressions.
//!
//! Runs before the parser sees the text, so anything outside the closed
//! grammar is rejected up front instead of relying on the parser to
//! stumble over it.

use lazy_static::lazy_static;
use regex::Regex;

use super::error::CalcError;

/// Function and constant names the evaluator resolves.
pub const MATH_FUNCTIONS: &[&str] = &[
    "sqrt", "fact", "sin", "cos", "tan", "log10", "ln", "abs", "pi",
];

lazy_static! {
    /// Matches strings containing only characters of the closed grammar.
    /// ASCII only, so Unicode digits and spaces are rejected here.
    static ref MATH_SAFE_CHARS: Regex = Regex::new(r"^[0-9 \t\r\n\.\+\-\*/\^()a-zA-Z_]*$").unwrap();

    /// Identifier tokens (letters first, digits allowed after).
    static ref IDENTIFIER: Regex = Regex::new(r"[a-zA-Z_][a-zA-Z0-9_]*").unwrap();
}

/// Check if a name is one of the whitelisted functions or constants.
pub fn is_known_name(name: &str) -> bool {
    MATH_FUNCTIONS.contains(&name)
}

/// Reject expressions containing characters or names outside the whitelist.
///
/// Returns the first offending character as [`CalcError::InvalidCharacters`]
/// or the first unknown identifier as [`CalcError::DisallowedName`].
pub fn check_whitelist(expression: &str) -> Result<(), CalcError> {
    if !MATH_SAFE_CHARS.is_match(expression) {
        let bad = expression
            .chars()
            .find(|&c| !is_safe_char(c))
            .unwrap_or('?');
        return Err(CalcError::InvalidCharacters(bad));
    }

    if let Some(name) = IDENTIFIER
        .find_iter(expression)
        .map(|m| m.as_str())
        .find(|name| !is_known_name(name))
    {
        return Err(CalcError::DisallowedName(name.to_string()));
    }

    Ok(())
}

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '\t' | '\r' | '\n') || "._+-*/^()".contains(c)
}
