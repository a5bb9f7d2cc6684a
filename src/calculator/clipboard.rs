//! Filtering of pasted text.
//!
//! The host owns the system clipboard; the core only sees the raw text and
//! keeps the characters a button could have produced.

/// Characters allowed through a paste.
const PASTE_CHARS: &str = "0123456789.+-*/()^";

/// Drop every character outside `[0-9.+\-*/()^]`.
pub fn sanitize_paste(raw: &str) -> String {
    raw.chars().filter(|&c| PASTE_CHARS.contains(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_expression_characters() {
        assert_eq!(sanitize_paste("(1+2)*3^2/4-5.5"), "(1+2)*3^2/4-5.5");
    }

    #[test]
    fn test_drops_everything_else() {
        assert_eq!(sanitize_paste(" 1,234 + x\n"), "1234+");
        assert_eq!(sanitize_paste("sqrt(4)"), "(4)");
        assert_eq!(sanitize_paste("π²"), "");
        assert_eq!(sanitize_paste("5%"), "5");
    }
}
