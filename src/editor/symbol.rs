//! Discrete input symbols, one per calculator key.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::calculator::PI_LITERAL;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn as_char(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }
}

/// Functions that have their own key and wrap the number before the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunctionKey {
    Sqrt,
    Fact,
    Log10,
}

impl FunctionKey {
    pub fn name(self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt",
            Self::Fact => "fact",
            Self::Log10 => "log10",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constant {
    Pi,
}

impl Constant {
    /// Text inserted into the buffer for this constant.
    pub fn literal(self) -> &'static str {
        match self {
            Self::Pi => PI_LITERAL,
        }
    }
}

/// A single key press delivered by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    Digit(char),
    DecimalPoint,
    Operator(Operator),
    Power,
    OpenParen,
    CloseParen,
    Function(FunctionKey),
    /// The `1/x` key.
    Inverse,
    Constant(Constant),
    SignToggle,
    Percent,
    Clear,
    Delete,
    Evaluate,
}

impl Symbol {
    /// Create a digit symbol, or `None` if `c` is not an ASCII digit.
    pub fn digit(c: char) -> Option<Self> {
        c.is_ascii_digit().then_some(Self::Digit(c))
    }

    /// The label printed on the key for this symbol.
    pub fn label(&self) -> String {
        match self {
            Self::Digit(c) => c.to_string(),
            Self::DecimalPoint => ".".into(),
            Self::Operator(op) => op.as_char().to_string(),
            Self::Power => "^".into(),
            Self::OpenParen => "(".into(),
            Self::CloseParen => ")".into(),
            Self::Function(func) => func.name().into(),
            Self::Inverse => "1/x".into(),
            Self::Constant(Constant::Pi) => "pi".into(),
            Self::SignToggle => "+/-".into(),
            Self::Percent => "%".into(),
            Self::Clear => "AC".into(),
            Self::Delete => "DEL".into(),
            Self::Evaluate => "=".into(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A key label that does not name any symbol.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown key '{0}'")]
pub struct UnknownSymbol(pub String);

impl FromStr for Symbol {
    type Err = UnknownSymbol;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let symbol = match label {
            "." => Self::DecimalPoint,
            "+" => Self::Operator(Operator::Add),
            "-" => Self::Operator(Operator::Sub),
            "*" | "×" => Self::Operator(Operator::Mul),
            "/" | "÷" => Self::Operator(Operator::Div),
            "^" => Self::Power,
            "(" => Self::OpenParen,
            ")" => Self::CloseParen,
            "sqrt" | "√" => Self::Function(FunctionKey::Sqrt),
            "fact" | "!" => Self::Function(FunctionKey::Fact),
            "log10" | "log" => Self::Function(FunctionKey::Log10),
            "1/x" => Self::Inverse,
            "pi" | "π" => Self::Constant(Constant::Pi),
            "+/-" | "±" => Self::SignToggle,
            "%" => Self::Percent,
            "AC" | "C" => Self::Clear,
            "DEL" | "⌫" => Self::Delete,
            "=" => Self::Evaluate,
            other => {
                let mut chars = other.chars();
                match (chars.next().and_then(Self::digit), chars.next()) {
                    (Some(digit), None) => digit,
                    _ => return Err(UnknownSymbol(other.to_string())),
                }
            }
        };
        Ok(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        assert_eq!("7".parse::<Symbol>(), Ok(Symbol::Digit('7')));
        assert_eq!("+".parse::<Symbol>(), Ok(Symbol::Operator(Operator::Add)));
        assert_eq!("sqrt".parse::<Symbol>(), Ok(Symbol::Function(FunctionKey::Sqrt)));
        assert_eq!("1/x".parse::<Symbol>(), Ok(Symbol::Inverse));
        assert_eq!("+/-".parse::<Symbol>(), Ok(Symbol::SignToggle));
        assert_eq!("AC".parse::<Symbol>(), Ok(Symbol::Clear));
        assert_eq!("=".parse::<Symbol>(), Ok(Symbol::Evaluate));
    }

    #[test]
    fn test_unknown_labels() {
        assert_eq!(
            "12".parse::<Symbol>(),
            Err(UnknownSymbol("12".into()))
        );
        assert!("exp".parse::<Symbol>().is_err());
        assert!("".parse::<Symbol>().is_err());
    }

    #[test]
    fn test_digit_constructor() {
        assert_eq!(Symbol::digit('4'), Some(Symbol::Digit('4')));
        assert_eq!(Symbol::digit('x'), None);
    }
}
