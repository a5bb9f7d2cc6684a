//! Rewrites calculator notation into the evaluator's grammar.
//!
//! The passes run in a fixed order, each one working on the output of the
//! previous: constants, power, postfix factorial, implicit multiplication.
//! Rewriting is purely textual. Malformed input is passed through and left
//! for the evaluator to reject.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::detection::is_known_name;

/// Decimal expansion inserted for the `pi` key.
pub const PI_LITERAL: &str = "3.141592653589793";

lazy_static! {
    /// Identifier tokens and the `π` sign.
    static ref NAME: Regex = Regex::new(r"π|[a-zA-Z_][a-zA-Z0-9_]*").unwrap();

    /// `a^b` with optionally signed decimal operands. The leading group keeps a
    /// binary minus (`5-2^2`) from being read as the sign of `a`.
    static ref POWER: Regex = Regex::new(
        r"(^|[\s\+\-\*/\^(])(-?\d+(?:\.\d+)?)\s*\^\s*(-?\d+(?:\.\d+)?)"
    ).unwrap();
}

/// Run every rewrite pass over a raw buffer.
pub fn rewrite_expression(input: &str) -> String {
    let expr = replace_constants(input);
    let expr = rewrite_power(&expr);
    let expr = rewrite_factorial(&expr);
    insert_implicit_multiplication(&expr)
}

/// Replace `π` and the bare `pi` name with the parenthesized constant.
///
/// The `pi` key inserts [`PI_LITERAL`] as plain digits, so pressing it after
/// a number or a group glues the two together (`2` then `pi` reads
/// `23.141592653589793`). Such a glued expansion is split back out into its
/// own group, which implicit multiplication then picks up.
fn replace_constants(expr: &str) -> String {
    let expr = split_glued_pi(expr);
    NAME.replace_all(&expr, |caps: &Captures| match &caps[0] {
        "π" | "pi" => format!("({})", PI_LITERAL),
        other => other.to_string(),
    })
    .into_owned()
}

fn split_glued_pi(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut copied = 0;

    for (at, _) in expr.match_indices(PI_LITERAL) {
        let end = at + PI_LITERAL.len();
        let glued_before = expr[..at]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_digit() || c == ')');
        let continues = expr[end..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '.');
        if !glued_before || continues {
            continue;
        }

        out.push_str(&expr[copied..at]);
        out.push('(');
        out.push_str(PI_LITERAL);
        out.push(')');
        copied = end;
    }

    out.push_str(&expr[copied..]);
    out
}

/// Normalize `**` to `^` and group the operands of numeric powers.
fn rewrite_power(expr: &str) -> String {
    let expr = expr.replace("**", "^");
    POWER.replace_all(&expr, "${1}(${2})^(${3})").into_owned()
}

/// Turn postfix `X!` into `fact(X)`.
///
/// `X` is either a number or a parenthesized group, including a function
/// name directly in front of the group (`sqrt(4)!` becomes `fact(sqrt(4))`).
fn rewrite_factorial(expr: &str) -> String {
    let mut out: Vec<char> = Vec::with_capacity(expr.len() + 8);

    for c in expr.chars() {
        if c != '!' {
            out.push(c);
            continue;
        }

        match factorial_operand_start(&out) {
            Some(start) => {
                let operand: Vec<char> = out.drain(start..).collect();
                out.extend("fact(".chars());
                out.extend(operand);
                out.push(')');
            }
            None => out.push('!'),
        }
    }

    out.into_iter().collect()
}

fn factorial_operand_start(chars: &[char]) -> Option<usize> {
    let last = *chars.last()?;

    if last.is_ascii_digit() || last == '.' {
        let start = chars
            .iter()
            .rposition(|c| !(c.is_ascii_digit() || *c == '.'))
            .map_or(0, |i| i + 1);
        return Some(start);
    }

    if last != ')' {
        return None;
    }

    let mut depth = 0usize;
    let mut open = None;
    for (i, &c) in chars.iter().enumerate().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    open = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }

    // Unbalanced: leave the `!` for the whitelist check to reject.
    let open = open?;
    let name_start = chars[..open]
        .iter()
        .rposition(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map_or(0, |i| i + 1);

    let name: String = chars[name_start..open].iter().collect();
    if name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        Some(name_start)
    } else {
        Some(open)
    }
}

/// Insert `*` where a value is directly followed by `(` or a known name.
fn insert_implicit_multiplication(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len() + 4);
    let mut after_value = false;
    let mut rest = expr;

    while let Some(c) = rest.chars().next() {
        let len = if c.is_ascii_alphabetic() || c == '_' {
            run_len(rest, |ch| ch.is_ascii_alphanumeric() || ch == '_')
        } else if c.is_ascii_digit() || c == '.' {
            run_len(rest, |ch| ch.is_ascii_digit() || ch == '.')
        } else {
            c.len_utf8()
        };
        let (token, tail) = rest.split_at(len);

        if after_value && (token == "(" || is_known_name(token)) {
            out.push('*');
        }
        if !c.is_whitespace() {
            after_value = c.is_ascii_digit() || c == '.' || c == ')';
        }

        out.push_str(token);
        rest = tail;
    }

    out
}

fn run_len(s: &str, pred: impl Fn(char) -> bool) -> usize {
    s.find(|ch: char| !pred(ch)).unwrap_or(s.len())
}
