//! Scans over the text in front of the cursor.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Unsigned decimal number at the end of the text. A bare trailing dot
    /// (`5.`) still counts, since that is what a half-typed number looks like.
    static ref TRAILING_NUMBER: Regex = Regex::new(r"\d+(?:\.\d*)?$").unwrap();
}

/// Characters that coalesce when typed back to back.
pub fn is_operator(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '^')
}

/// Operators a percentage can be taken against.
pub fn is_binary_operator(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/')
}

/// A number found directly in front of the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumberSpan<'a> {
    /// Byte offset of the number within the scanned text.
    pub start: usize,
    /// The number as typed, including a leading `-` for signed scans.
    pub text: &'a str,
}

impl NumberSpan<'_> {
    pub fn is_negative(&self) -> bool {
        self.text.starts_with('-')
    }
}

/// Find the unsigned number that ends the text.
///
/// A run of digits that is glued to a name (`log10`) or to another number
/// (`1.2.3`) is not a number.
pub fn trailing_unsigned(text: &str) -> Option<NumberSpan<'_>> {
    let found = TRAILING_NUMBER.find(text)?;
    let glued = text[..found.start()]
        .chars()
        .next_back()
        .is_some_and(|c| c == '.' || c.is_ascii_alphabetic() || c == '_');
    if glued {
        return None;
    }

    Some(NumberSpan {
        start: found.start(),
        text: found.as_str(),
    })
}

/// Find the number that ends the text, including its sign.
///
/// A `-` in front of the digits is a sign only when it opens the text or
/// follows an operator or `(`; otherwise it is a subtraction.
pub fn trailing_signed(text: &str) -> Option<NumberSpan<'_>> {
    let unsigned = trailing_unsigned(text)?;
    let head = &text[..unsigned.start];

    let Some(sign_at) = head.strip_suffix('-').map(str::len) else {
        return Some(unsigned);
    };

    let is_sign = head[..sign_at]
        .chars()
        .next_back()
        .is_none_or(|c| is_operator(c) || c == '(');
    if is_sign {
        Some(NumberSpan {
            start: sign_at,
            text: &text[sign_at..],
        })
    } else {
        Some(unsigned)
    }
}

/// Byte offset just after the innermost `(` that is still open in `text`.
pub fn open_group_start(text: &str) -> usize {
    let mut depth = 0usize;
    for (i, c) in text.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' if depth == 0 => return i + 1,
            '(' => depth -= 1,
            _ => {}
        }
    }
    0
}
