//! A single finalized calculation.

use serde::Serialize;

use crate::calculator::CalcResult;

/// One row of the history: the expression and, if it evaluated, its result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// The expression as it was typed.
    pub expression: String,
    /// The formatted result. None while it is not known yet.
    pub result: Option<String>,
}

impl HistoryEntry {
    pub fn new(expression: impl Into<String>, result: Option<String>) -> Self {
        Self {
            expression: expression.into(),
            result,
        }
    }

    /// Create a finalized entry from a successful evaluation.
    ///
    /// Failed evaluations are never recorded, so this returns `None` for them.
    pub fn from_calc_result(result: &CalcResult) -> Option<Self> {
        match result {
            CalcResult::Success {
                expression,
                display_result,
                ..
            } => Some(Self::new(expression.clone(), Some(display_result.clone()))),
            CalcResult::Error { .. } => None,
        }
    }

    /// Check if the expression evaluated successfully.
    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }

    /// Text to put back into the buffer when this entry is recalled:
    /// the result, or the expression when there is none.
    pub fn recall_text(&self) -> &str {
        self.result.as_deref().unwrap_or(&self.expression)
    }
}
