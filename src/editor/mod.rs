//! Cursor-aware expression editing.
//!
//! [`apply`] is a pure function of the current [`EditState`] and one
//! [`Symbol`]: it never mutates its input and returns the replacement state,
//! or the [`CalcError`] that the edit was rejected with. Evaluation is not an
//! edit; the session runs it and only uses this module for every other key.

mod scan;
mod symbol;

pub use scan::{NumberSpan, is_operator, trailing_signed, trailing_unsigned};
pub use symbol::{Constant, FunctionKey, Operator, Symbol, UnknownSymbol};

use crate::calculator::{
    CalcError, DEFAULT_PRECISION, evaluate_expression, format_with_precision, is_error_text,
};

use scan::{is_binary_operator, open_group_start};

/// Text shown when the buffer is logically empty.
pub const PLACEHOLDER: &str = "0";

/// The expression buffer together with its cursor.
///
/// The cursor is a character offset in `0..=len`; every constructor clamps
/// it, so a state can never point past the end of its buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditState {
    buffer: String,
    cursor: usize,
}

impl Default for EditState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditState {
    /// The session start state: `"0"` with the cursor in front of it.
    pub fn new() -> Self {
        Self {
            buffer: PLACEHOLDER.to_string(),
            cursor: 0,
        }
    }

    /// Build a state, clamping the cursor and replacing an empty buffer
    /// with the placeholder.
    pub fn from_parts(buffer: impl Into<String>, cursor: usize) -> Self {
        let buffer = buffer.into();
        if buffer.is_empty() {
            return Self::new();
        }
        let cursor = cursor.min(buffer.chars().count());
        Self { buffer, cursor }
    }

    /// A state with the cursor at the end of `buffer`.
    pub fn at_end(buffer: impl Into<String>) -> Self {
        Self::from_parts(buffer, usize::MAX)
    }

    /// The state shown while `error` is displayed.
    pub fn error(error: &CalcError) -> Self {
        Self::at_end(error.display_text())
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length of the buffer in characters.
    pub fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    /// Always false: the placeholder keeps the buffer non-empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Check if the buffer shows only the placeholder zero.
    pub fn is_placeholder(&self) -> bool {
        self.buffer == PLACEHOLDER
    }

    /// Check if the buffer shows an error message.
    pub fn is_error(&self) -> bool {
        is_error_text(&self.buffer)
    }

    /// The same buffer with the cursor moved (and clamped).
    pub fn with_cursor(&self, cursor: usize) -> Self {
        Self::from_parts(self.buffer.clone(), cursor)
    }

    /// Insert text at the cursor, as a paste would.
    pub fn insert(&self, text: &str) -> Self {
        let (buffer, cursor) = self.working_text(None);
        let (before, after) = split_at_char(buffer, cursor);
        splice(before, text, after)
    }

    /// Buffer and cursor an edit starts from.
    ///
    /// An error message always reads as an empty buffer. The placeholder
    /// reads as empty too, except for the keys that keep it: a decimal point
    /// extends it to `0.`, and delete and clear behave the same either way.
    fn working_text(&self, symbol: Option<Symbol>) -> (&str, usize) {
        if self.is_error() {
            return ("", 0);
        }
        if self.is_placeholder() {
            match symbol {
                Some(Symbol::DecimalPoint) => return (&self.buffer, 1),
                Some(Symbol::Delete | Symbol::Clear | Symbol::Evaluate) => {}
                _ => return ("", 0),
            }
        }
        (&self.buffer, self.cursor)
    }
}

/// Apply one key press to the buffer.
pub fn apply(state: &EditState, symbol: Symbol) -> Result<EditState, CalcError> {
    apply_with_precision(state, symbol, DEFAULT_PRECISION)
}

/// Apply one key press, formatting computed literals (the `%` key) with
/// `precision` decimals.
pub fn apply_with_precision(
    state: &EditState,
    symbol: Symbol,
    precision: usize,
) -> Result<EditState, CalcError> {
    let (buffer, cursor) = state.working_text(Some(symbol));
    let (before, after) = split_at_char(buffer, cursor);

    let next = match symbol {
        Symbol::Digit(c) if c.is_ascii_digit() => splice(before, &c.to_string(), after),
        Symbol::Digit(_) => EditState::from_parts(buffer, cursor),
        Symbol::DecimalPoint => splice(before, ".", after),
        Symbol::Operator(op) => insert_operator(before, op.as_char(), after),
        Symbol::Power => insert_operator(before, '^', after),
        Symbol::OpenParen => splice(before, "(", after),
        Symbol::CloseParen => splice(before, ")", after),
        Symbol::Function(func) => apply_function(before, func, after)?,
        Symbol::Inverse => apply_inverse(before, after)?,
        Symbol::Constant(constant) => splice(before, constant.literal(), after),
        Symbol::SignToggle => toggle_sign(before, after),
        Symbol::Percent => apply_percent(before, after, precision)?,
        Symbol::Clear => EditState::new(),
        Symbol::Delete => delete_back(before, after),
        Symbol::Evaluate => state.clone(),
    };

    Ok(next)
}

/// Replace the operator in front of the cursor, or insert a new one.
fn insert_operator(before: &str, op: char, after: &str) -> EditState {
    let head = match before.chars().next_back() {
        Some(prev) if is_operator(prev) => &before[..before.len() - prev.len_utf8()],
        _ => before,
    };
    splice(head, &op.to_string(), after)
}

/// Wrap the number in front of the cursor in a function call.
fn apply_function(before: &str, func: FunctionKey, after: &str) -> Result<EditState, CalcError> {
    let Some(span) = trailing_signed(before) else {
        // Leave the cursor inside the parentheses for the argument.
        let head = format!("{before}{}(", func.name());
        return Ok(EditState::from_parts(
            format!("{head}){after}"),
            head.chars().count(),
        ));
    };

    let value = parse_number(span.text)?;
    let replacement = match func {
        FunctionKey::Fact if value < 0.0 || value.fract() != 0.0 => {
            return Err(CalcError::FactorialUndefined);
        }
        FunctionKey::Fact if value == 0.0 => "1".to_string(),
        FunctionKey::Sqrt if value < 0.0 => return Err(CalcError::NegativeSqrt),
        FunctionKey::Log10 if value <= 0.0 => return Err(CalcError::NonPositiveLog),
        _ => format!("{}({})", func.name(), span.text),
    };

    Ok(splice(&before[..span.start], &replacement, after))
}

/// The `1/x` key.
fn apply_inverse(before: &str, after: &str) -> Result<EditState, CalcError> {
    let Some(span) = trailing_signed(before) else {
        return Ok(splice(before, "1/", after));
    };

    if parse_number(span.text)? == 0.0 {
        return Err(CalcError::DivisionByZero);
    }
    Ok(splice(&before[..span.start], &format!("1/{}", span.text), after))
}

fn toggle_sign(before: &str, after: &str) -> EditState {
    if let Some(span) = trailing_signed(before) {
        let toggled = match span.text.strip_prefix('-') {
            Some(unsigned) => unsigned.to_string(),
            None => format!("-{}", span.text),
        };
        return splice(&before[..span.start], &toggled, after);
    }

    let starts_operand = before
        .chars()
        .next_back()
        .is_none_or(|c| is_operator(c) || c == '(');
    if starts_operand {
        splice(before, "-", after)
    } else {
        splice(before, "", after)
    }
}

/// Replace the number in front of the cursor with its percentage.
///
/// Against a preceding binary operator the percentage is taken of the
/// operand before it (`50+10%` is `50+5`). The operand is scoped to the
/// innermost open parenthesis, so `2*(50+10%` becomes `2*(50+5`. With no
/// operand the number is simply divided by 100.
fn apply_percent(before: &str, after: &str, precision: usize) -> Result<EditState, CalcError> {
    let span = trailing_unsigned(before).ok_or(CalcError::NoOperandForPercent)?;
    let number = parse_number(span.text)?;
    let head = &before[..span.start];
    let scope = &head[open_group_start(head)..];

    let base = match scope.chars().next_back() {
        Some(op) if is_binary_operator(op) => {
            let operand = &scope[..scope.len() - op.len_utf8()];
            let operand_is_sign = operand
                .trim_end()
                .chars()
                .next_back()
                .is_none_or(|c| is_operator(c) || c == '(');
            if operand_is_sign {
                None
            } else {
                Some(evaluate_expression(operand)?)
            }
        }
        _ => None,
    };

    let value = match base {
        Some(base) => base * (number / 100.0),
        None => number / 100.0,
    };

    Ok(splice(head, &format_with_precision(value, precision), after))
}

fn delete_back(before: &str, after: &str) -> EditState {
    let mut chars = before.chars();
    if chars.next_back().is_none() {
        return splice(before, "", after);
    }
    splice(chars.as_str(), "", after)
}

fn parse_number(text: &str) -> Result<f64, CalcError> {
    text.parse::<f64>()
        .map_err(|_| CalcError::InvalidNumber(text.to_string()))
}

/// Join `head + inserted + tail`, with the cursor right after `inserted`.
fn splice(head: &str, inserted: &str, tail: &str) -> EditState {
    let cursor = head.chars().count() + inserted.chars().count();
    EditState::from_parts(format!("{head}{inserted}{tail}"), cursor)
}

fn split_at_char(text: &str, cursor: usize) -> (&str, &str) {
    let split = text
        .char_indices()
        .nth(cursor)
        .map_or(text.len(), |(i, _)| i);
    text.split_at(split)
}
