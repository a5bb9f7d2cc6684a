//! Recursive-descent parser and evaluator for the closed calculator grammar.
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary ('^' unary)?
//! primary := number | 'pi' | func '(' expr ')' | '(' expr ')'
//! ```
//!
//! Nothing outside this grammar is ever resolved: names map onto the fixed
//! [`Function`] set or fail to parse.

use std::fmt;
use std::iter::Peekable;
use std::vec::IntoIter;

use super::error::CalcError;

/// Largest argument whose factorial still fits in an `f64`.
const MAX_FACTORIAL: f64 = 170.0;

/// How deep groups, signs and exponents may nest before parsing gives up.
pub const MAX_DEPTH: usize = 256;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Num(f64),
    Name(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    ParenOpen,
    ParenClose,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Num(num) => write!(f, "{num}"),
            Token::Name(name) => write!(f, "{name}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Caret => write!(f, "^"),
            Token::ParenOpen => write!(f, "("),
            Token::ParenClose => write!(f, ")"),
        }
    }
}

/// Functions callable from an expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Fact,
    Sin,
    Cos,
    Tan,
    Log10,
    Ln,
    Abs,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sqrt" => Self::Sqrt,
            "fact" => Self::Fact,
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "log10" => Self::Log10,
            "ln" => Self::Ln,
            "abs" => Self::Abs,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt",
            Self::Fact => "fact",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Log10 => "log10",
            Self::Ln => "ln",
            Self::Abs => "abs",
        }
    }

    /// Apply the function, enforcing its domain.
    pub fn apply(self, arg: f64) -> Result<f64, CalcError> {
        match self {
            Self::Sqrt if arg < 0.0 => Err(CalcError::NegativeSqrt),
            Self::Sqrt => Ok(arg.sqrt()),
            Self::Fact => factorial(arg),
            Self::Sin => Ok(arg.sin()),
            Self::Cos => Ok(arg.cos()),
            Self::Tan => Ok(arg.tan()),
            Self::Log10 | Self::Ln if arg <= 0.0 => Err(CalcError::NonPositiveLog),
            Self::Log10 => Ok(arg.log10()),
            Self::Ln => Ok(arg.ln()),
            Self::Abs => Ok(arg.abs()),
        }
    }
}

/// Factorial of a non-negative integer, as a float.
pub fn factorial(n: f64) -> Result<f64, CalcError> {
    if n < 0.0 || n.fract() != 0.0 || !n.is_finite() {
        return Err(CalcError::FactorialUndefined);
    }
    if n > MAX_FACTORIAL {
        return Err(CalcError::syntax("Result too large"));
    }

    Ok((2..=n as u64).fold(1.0, |acc, k| acc * k as f64))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Parsed expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(Function, Box<Expr>),
}

impl Expr {
    /// Parse an expression that already passed the whitelist check.
    pub fn parse(input: &str) -> Result<Self, CalcError> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(CalcError::syntax("Empty expression"));
        }

        let mut parser = Parser {
            tokens: tokens.into_iter().peekable(),
            depth: 0,
        };
        let expr = parser.parse_expr()?;

        match parser.tokens.next() {
            None => Ok(expr),
            Some(Token::ParenClose) => Err(CalcError::syntax("Unbalanced parentheses")),
            Some(extra) => Err(CalcError::syntax(format!("Unexpected '{extra}'"))),
        }
    }

    pub fn eval(&self) -> Result<f64, CalcError> {
        match self {
            Expr::Number(num) => Ok(*num),
            Expr::Neg(inner) => Ok(-inner.eval()?),
            Expr::Call(func, arg) => func.apply(arg.eval()?),
            Expr::Binary(op, lhs, rhs) => {
                let lhs = lhs.eval()?;
                let rhs = rhs.eval()?;
                match op {
                    BinaryOp::Add => Ok(lhs + rhs),
                    BinaryOp::Sub => Ok(lhs - rhs),
                    BinaryOp::Mul => Ok(lhs * rhs),
                    BinaryOp::Div if rhs == 0.0 => Err(CalcError::DivisionByZero),
                    BinaryOp::Div => Ok(lhs / rhs),
                    BinaryOp::Pow => Ok(lhs.powf(rhs)),
                }
            }
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        let token = match ch {
            c if c.is_ascii_whitespace() => continue,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '^' => Token::Caret,
            '(' => Token::ParenOpen,
            ')' => Token::ParenClose,
            '0'..='9' | '.' => {
                let mut end = start + ch.len_utf8();
                while let Some(&(i, c)) = chars.peek() {
                    if !(c.is_ascii_digit() || c == '.') {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                let text = &input[start..end];
                let num = text
                    .parse::<f64>()
                    .map_err(|_| CalcError::InvalidNumber(text.to_string()))?;
                Token::Num(num)
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = start + ch.len_utf8();
                while let Some(&(i, c)) = chars.peek() {
                    if !(c.is_ascii_alphanumeric() || c == '_') {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                Token::Name(input[start..end].to_string())
            }
            other => return Err(CalcError::InvalidCharacters(other)),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
    /// Current nesting of `parse_unary` calls. Every recursive rule passes
    /// through it, so this bounds the stack and the tree height.
    depth: usize,
}

impl Parser {
    fn parse_expr(&mut self) -> Result<Expr, CalcError> {
        let mut lhs = self.parse_term()?;

        loop {
            let op = match self.tokens.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.tokens.next();
            let rhs = self.parse_term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_term(&mut self) -> Result<Expr, CalcError> {
        let mut lhs = self.parse_unary()?;

        loop {
            let op = match self.tokens.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.tokens.next();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::syntax("Expression too deeply nested"));
        }

        let expr = self.parse_signed();
        self.depth -= 1;
        expr
    }

    fn parse_signed(&mut self) -> Result<Expr, CalcError> {
        match self.tokens.peek() {
            Some(Token::Minus) => {
                self.tokens.next();
                Ok(Expr::Neg(Box::new(self.parse_unary()?)))
            }
            Some(Token::Plus) => {
                self.tokens.next();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr, CalcError> {
        let base = self.parse_primary()?;

        if self.tokens.peek() == Some(&Token::Caret) {
            self.tokens.next();
            // Right associative: the exponent may itself contain a power.
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }

        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, CalcError> {
        match self.tokens.next() {
            Some(Token::Num(num)) => Ok(Expr::Number(num)),
            Some(Token::ParenOpen) => {
                let inner = self.parse_expr()?;
                self.expect_close()?;
                Ok(inner)
            }
            Some(Token::Name(name)) if name == "pi" => Ok(Expr::Number(std::f64::consts::PI)),
            Some(Token::Name(name)) => {
                let func =
                    Function::from_name(&name).ok_or(CalcError::DisallowedName(name.clone()))?;
                if self.tokens.next() != Some(Token::ParenOpen) {
                    return Err(CalcError::syntax(format!("Expected '(' after {name}")));
                }
                let arg = self.parse_expr()?;
                self.expect_close()?;
                Ok(Expr::Call(func, Box::new(arg)))
            }
            Some(other) => Err(CalcError::syntax(format!("Unexpected '{other}'"))),
            None => Err(CalcError::syntax("Incomplete expression")),
        }
    }

    fn expect_close(&mut self) -> Result<(), CalcError> {
        match self.tokens.next() {
            Some(Token::ParenClose) => Ok(()),
            _ => Err(CalcError::syntax("Unbalanced parentheses")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(input: &str) -> Result<f64, CalcError> {
        Expr::parse(input)?.eval()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2+3*4"), Ok(14.0));
        assert_eq!(eval("(2+3)*4"), Ok(20.0));
        assert_eq!(eval("10-4-3"), Ok(3.0));
        assert_eq!(eval("8/4/2"), Ok(1.0));
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(eval("2^3^2"), Ok(512.0));
        assert_eq!(eval("-2^2"), Ok(-4.0));
        assert_eq!(eval("(-2)^(2)"), Ok(4.0));
        assert_eq!(eval("2^-1"), Ok(0.5));
    }

    #[test]
    fn test_unary_signs() {
        assert_eq!(eval("--3"), Ok(3.0));
        assert_eq!(eval("5--3"), Ok(8.0));
        assert_eq!(eval("+4"), Ok(4.0));
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval("sqrt(16)"), Ok(4.0));
        assert_eq!(eval("fact(5)"), Ok(120.0));
        assert_eq!(eval("fact(0)"), Ok(1.0));
        assert_eq!(eval("log10(1000)"), Ok(3.0));
        assert_eq!(eval("abs(-2.5)"), Ok(2.5));
        assert_eq!(eval("sin(0)+cos(0)"), Ok(1.0));
        assert_eq!(eval("ln(1)"), Ok(0.0));
        assert_eq!(eval("pi"), Ok(std::f64::consts::PI));
    }

    #[test]
    fn test_domain_errors() {
        assert_eq!(eval("sqrt(-4)"), Err(CalcError::NegativeSqrt));
        assert_eq!(eval("fact(-1)"), Err(CalcError::FactorialUndefined));
        assert_eq!(eval("fact(2.5)"), Err(CalcError::FactorialUndefined));
        assert_eq!(eval("log10(0)"), Err(CalcError::NonPositiveLog));
        assert_eq!(eval("ln(-1)"), Err(CalcError::NonPositiveLog));
        assert_eq!(eval("5/0"), Err(CalcError::DivisionByZero));
        assert_eq!(eval("5/(2-2)"), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn test_factorial_overflow() {
        assert!(eval("fact(170)").is_ok());
        assert!(matches!(eval("fact(171)"), Err(CalcError::OverflowOrSyntax(_))));
    }

    #[test]
    fn test_invalid_number() {
        assert_eq!(eval("1.2.3+1"), Err(CalcError::InvalidNumber("1.2.3".into())));
        assert_eq!(eval("."), Err(CalcError::InvalidNumber(".".into())));
        assert_eq!(eval("5."), Ok(5.0));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(eval("(2+3"), Err(CalcError::OverflowOrSyntax(_))));
        assert!(matches!(eval("2+3)"), Err(CalcError::OverflowOrSyntax(_))));
        assert!(matches!(eval("2+"), Err(CalcError::OverflowOrSyntax(_))));
        assert!(matches!(eval("2*/3"), Err(CalcError::OverflowOrSyntax(_))));
        assert!(matches!(eval("sqrt 4"), Err(CalcError::OverflowOrSyntax(_))));
        assert!(matches!(eval(""), Err(CalcError::OverflowOrSyntax(_))));
        assert!(matches!(eval("2(3)"), Err(CalcError::OverflowOrSyntax(_))));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(eval(&nested(100)), Ok(1.0));
        assert_eq!(
            eval(&nested(20_000)),
            Err(CalcError::syntax("Expression too deeply nested"))
        );
        assert_eq!(
            eval(&format!("{}5", "-".repeat(MAX_DEPTH + 1))),
            Err(CalcError::syntax("Expression too deeply nested"))
        );
        assert!(eval(&format!("2{}", "^2".repeat(MAX_DEPTH + 1))).is_err());
    }

    #[test]
    fn test_unknown_names_never_resolve() {
        assert_eq!(eval("exp(1)"), Err(CalcError::DisallowedName("exp".into())));
    }
}
