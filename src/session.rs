//! The calculator session the host talks to.
//!
//! [`Calculator`] owns the buffer, the cursor and the history. The host
//! only submits symbols, pastes and history steps, and renders the
//! [`RenderState`] it gets back. Each call runs to completion; a host that
//! shares one session between threads wraps the whole `Calculator` in a
//! single `Mutex`.

use tracing::{debug, warn};

use crate::calculator::{
    CalcResult, DEFAULT_PRECISION, MAX_EXPRESSION_LEN, calculate, sanitize_paste,
};
use crate::editor::{self, EditState, Symbol};
use crate::history::{Direction, History, HistoryEntry, Position};

/// What the host should display after an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderState {
    pub buffer: String,
    /// Cursor offset in characters.
    pub cursor: usize,
    /// The last-expression label, e.g. `2+3 =`. Empty when nothing to show.
    pub status: String,
}

pub struct Calculator {
    state: EditState,
    history: History,
    /// What was being typed when history navigation started.
    draft: Option<EditState>,
    status: String,
    precision: usize,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    pub fn new() -> Self {
        Self::with_precision(DEFAULT_PRECISION)
    }

    /// Create a session that formats results with `precision` decimals.
    pub fn with_precision(precision: usize) -> Self {
        Self {
            state: EditState::new(),
            history: History::new(),
            draft: None,
            status: String::new(),
            precision,
        }
    }

    /// Apply one key press.
    pub fn apply_symbol(&mut self, symbol: Symbol) -> RenderState {
        match symbol {
            Symbol::Evaluate => self.evaluate(),
            Symbol::Clear => {
                self.begin_typing();
                self.state = EditState::new();
                self.status.clear();
            }
            _ => {
                self.begin_typing();
                let edited = editor::apply_with_precision(&self.state, symbol, self.precision);
                self.state = match edited {
                    Ok(state) => state,
                    Err(error) => {
                        warn!(%symbol, %error, "edit rejected");
                        EditState::error(&error)
                    }
                };
            }
        }

        self.render()
    }

    /// Step through the history.
    pub fn navigate_history(&mut self, direction: Direction) -> RenderState {
        let was_live = self.history.is_live();

        match self.history.navigate(direction) {
            Some(Position::Entry(entry)) => {
                let recalled = EditState::at_end(entry.recall_text());
                self.status = format!("{} =", entry.expression);
                if was_live {
                    self.draft = Some(std::mem::replace(&mut self.state, recalled));
                } else {
                    self.state = recalled;
                }
            }
            Some(Position::Live) => {
                self.state = self.draft.take().unwrap_or_default();
                self.status.clear();
            }
            None => debug!(?direction, "history boundary reached"),
        }

        self.render()
    }

    pub fn clear_history(&mut self) {
        debug!(entries = self.history.len(), "clearing history");
        self.history.clear();
        self.draft = None;
    }

    /// Read-only snapshot of the history, oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    /// Insert pasted text at the cursor, keeping only expression characters.
    ///
    /// The paste is cut short so the buffer never outgrows what the
    /// evaluator accepts.
    pub fn paste(&mut self, raw: &str) -> RenderState {
        let room = MAX_EXPRESSION_LEN.saturating_sub(self.state.len());
        let filtered = sanitize_paste(raw);
        let text: String = filtered.chars().take(room).collect();
        if text.len() < filtered.len() {
            warn!(kept = text.len(), pasted = filtered.len(), "paste truncated");
        }
        if !text.is_empty() {
            self.begin_typing();
            self.state = self.state.insert(&text);
        }
        self.render()
    }

    /// Move the cursor to where the host's text field has it.
    pub fn move_cursor(&mut self, cursor: usize) -> RenderState {
        self.state = self.state.with_cursor(cursor);
        self.render()
    }

    pub fn render(&self) -> RenderState {
        RenderState {
            buffer: self.state.buffer().to_string(),
            cursor: self.state.cursor(),
            status: self.status.clone(),
        }
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn history_cursor(&self) -> usize {
        self.history.cursor()
    }

    /// Typing while replaying an entry edits that entry's text live.
    fn begin_typing(&mut self) {
        self.history.reset_cursor();
        self.draft = None;
    }

    fn evaluate(&mut self) {
        if self.state.is_error() {
            debug!("buffer already shows an error, nothing to evaluate");
            return;
        }
        if self.state.is_placeholder() {
            debug!("nothing typed, nothing to evaluate");
            return;
        }

        let result = calculate(self.state.buffer(), self.precision);
        self.state = EditState::at_end(result.display());

        match HistoryEntry::from_calc_result(&result) {
            Some(entry) => {
                debug!(expression = %entry.expression, result = %self.state.buffer(), "evaluated");
                self.status = format!("{} =", entry.expression);
                self.history.record(entry);
                self.draft = None;
            }
            None => {
                if let CalcResult::Error { expression, error } = &result {
                    warn!(%expression, %error, "evaluation failed");
                }
                self.status.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn press_all(calc: &mut Calculator, labels: &str) -> RenderState {
        let mut last = calc.render();
        for label in labels.split_whitespace() {
            last = calc.apply_symbol(label.parse().unwrap());
        }
        last
    }

    fn session_with(buffer: &str) -> Calculator {
        let mut calc = Calculator::new();
        calc.paste(buffer);
        calc
    }

    #[test]
    fn test_initial_render() {
        let calc = Calculator::new();
        assert_eq!(
            calc.render(),
            RenderState {
                buffer: "0".into(),
                cursor: 0,
                status: String::new(),
            }
        );
        assert!(calc.history().is_empty());
    }

    #[test]
    fn test_evaluate_appends_history() {
        let mut calc = Calculator::new();
        let render = press_all(&mut calc, "2 + 3 =");

        assert_eq!(render.buffer, "5");
        assert_eq!(render.cursor, 1);
        assert_eq!(render.status, "2+3 =");
        assert_eq!(calc.history(), &[HistoryEntry::new("2+3", Some("5".into()))]);
        assert_eq!(calc.history_cursor(), 1);
    }

    #[test]
    fn test_division_by_zero() {
        let mut calc = session_with("5/0");
        let render = calc.apply_symbol(Symbol::Evaluate);

        assert_eq!(render.buffer, "Error: Division by zero");
        assert!(calc.history().is_empty());
    }

    #[test]
    fn test_reevaluating_error_is_noop() {
        let mut calc = session_with("5/0");
        calc.apply_symbol(Symbol::Evaluate);
        let entries = calc.history().len();

        let render = calc.apply_symbol(Symbol::Evaluate);
        assert_eq!(render.buffer, "Error: Division by zero");
        assert_eq!(calc.history().len(), entries);
    }

    #[test]
    fn test_evaluating_placeholder_records_nothing() {
        let mut calc = Calculator::new();
        let render = calc.apply_symbol(Symbol::Evaluate);

        assert_eq!(render.buffer, "0");
        assert_eq!(render.status, "");
        assert!(calc.history().is_empty());
    }

    #[test]
    fn test_pi_after_digit_multiplies() {
        let mut calc = Calculator::new();
        let render = press_all(&mut calc, "2 pi");
        assert_eq!(render.buffer, "23.141592653589793");

        let render = calc.apply_symbol(Symbol::Evaluate);
        assert_eq!(render.buffer, "6.2831853072");
    }

    #[test]
    fn test_deeply_nested_paste_is_an_error() {
        let mut calc = Calculator::new();
        let render = calc.paste(&format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000)));
        assert!(render.buffer.chars().count() <= MAX_EXPRESSION_LEN);

        let render = calc.apply_symbol(Symbol::Evaluate);
        assert_eq!(render.buffer, "Error: Expression too deeply nested");
        assert!(calc.history().is_empty());
    }

    #[test]
    fn test_percent_uses_session_precision() {
        let mut calc = Calculator::with_precision(3);
        calc.paste("2/3+1");
        assert_eq!(calc.apply_symbol(Symbol::Percent).buffer, "2/3+0.007");

        let mut calc = Calculator::new();
        calc.paste("2/3+1");
        assert_eq!(calc.apply_symbol(Symbol::Percent).buffer, "2/3+0.0066666667");
    }

    #[test]
    fn test_typing_clears_error() {
        let mut calc = session_with("5/0");
        calc.apply_symbol(Symbol::Evaluate);

        let render = press_all(&mut calc, "7");
        assert_eq!(render.buffer, "7");
        assert_eq!(render.cursor, 1);
    }

    #[test]
    fn test_factorial_key_then_evaluate() {
        let mut calc = Calculator::new();
        let render = press_all(&mut calc, "5 fact");
        assert_eq!(render.buffer, "fact(5)");

        let render = calc.apply_symbol(Symbol::Evaluate);
        assert_eq!(render.buffer, "120");
    }

    #[test]
    fn test_negative_sqrt_shows_error() {
        let mut calc = Calculator::new();
        let render = press_all(&mut calc, "4 +/- sqrt");
        assert_eq!(render.buffer, "Error: Square root of a negative number");
        assert!(calc.history().is_empty());
    }

    #[test]
    fn test_implicit_multiplication() {
        let mut calc = Calculator::new();
        let render = press_all(&mut calc, "2 ( 3 ) =");
        assert_eq!(render.buffer, "6");
    }

    #[test]
    fn test_percent_then_evaluate() {
        let mut calc = Calculator::new();
        let render = press_all(&mut calc, "5 0 + 1 0 %");
        assert_eq!(render.buffer, "50+5");

        let render = calc.apply_symbol(Symbol::Evaluate);
        assert_eq!(render.buffer, "55");
    }

    #[test]
    fn test_clear_resets_status_and_history_cursor() {
        let mut calc = Calculator::new();
        press_all(&mut calc, "1 + 1 = AC 3 + 3 =");
        calc.navigate_history(Direction::Back);
        assert_eq!(calc.history_cursor(), 1);

        let render = calc.apply_symbol(Symbol::Clear);
        assert_eq!(render.buffer, "0");
        assert_eq!(render.status, "");
        assert_eq!(calc.history_cursor(), 2);
    }

    #[test]
    fn test_history_round_trip_restores_draft() {
        let mut calc = Calculator::new();
        press_all(&mut calc, "1 + 1 = AC 2 * 3 = AC 9 -");
        let draft = calc.render();
        assert_eq!(draft.buffer, "9-");

        assert_eq!(calc.navigate_history(Direction::Back).buffer, "6");
        assert_eq!(calc.navigate_history(Direction::Back).buffer, "2");
        assert_eq!(calc.navigate_history(Direction::Back).buffer, "2");
        assert_eq!(calc.history_cursor(), 0);

        assert_eq!(calc.navigate_history(Direction::Forward).buffer, "6");
        let live = calc.navigate_history(Direction::Forward);
        assert_eq!(live.buffer, draft.buffer);
        assert_eq!(live.cursor, draft.cursor);
        assert_eq!(calc.history_cursor(), calc.history().len());
    }

    #[test]
    fn test_failed_evaluation_keeps_history_cursor() {
        let mut calc = Calculator::new();
        press_all(&mut calc, "8 / 2 =");
        calc.paste("/0");
        assert_eq!(calc.render().buffer, "4/0");
        assert_eq!(calc.history_cursor(), 1);

        let render = calc.apply_symbol(Symbol::Evaluate);
        assert_eq!(render.buffer, "Error: Division by zero");
        assert_eq!(render.status, "");
        assert_eq!(calc.history_cursor(), 1);
        assert_eq!(calc.history().len(), 1);
    }

    #[test]
    fn test_typing_over_recalled_entry() {
        let mut calc = Calculator::new();
        press_all(&mut calc, "4 * 4 =");
        calc.apply_symbol(Symbol::Clear);
        calc.navigate_history(Direction::Back);

        let render = press_all(&mut calc, "+ 1");
        assert_eq!(render.buffer, "16+1");
        assert_eq!(calc.history_cursor(), 1);

        // Back to live is now a no-op step: the edited text is the draft.
        assert_eq!(calc.navigate_history(Direction::Forward).buffer, "16+1");
    }

    #[test]
    fn test_clear_history() {
        let mut calc = Calculator::new();
        press_all(&mut calc, "1 + 1 =");
        calc.clear_history();

        assert!(calc.history().is_empty());
        assert_eq!(calc.history_cursor(), 0);
        assert_eq!(calc.navigate_history(Direction::Back).buffer, "2");
    }

    #[test]
    fn test_paste_filters_and_inserts() {
        let mut calc = Calculator::new();
        let render = calc.paste("12 + x3");
        assert_eq!(render.buffer, "12+3");
        assert_eq!(render.cursor, 4);

        calc.move_cursor(2);
        let render = calc.paste("*(2)");
        assert_eq!(render.buffer, "12*(2)+3");
        assert_eq!(render.cursor, 6);

        assert_eq!(calc.paste("abc"), render);
    }

    #[test]
    fn test_move_cursor_clamps() {
        let mut calc = session_with("123");
        assert_eq!(calc.move_cursor(99).cursor, 3);
        assert_eq!(calc.move_cursor(1).cursor, 1);
    }

    #[test]
    fn test_precision() {
        let mut calc = Calculator::with_precision(3);
        calc.paste("2/3");
        assert_eq!(calc.apply_symbol(Symbol::Evaluate).buffer, "0.667");
    }

    proptest! {
        #[test]
        fn prop_history_navigation_returns_to_live(count in 1usize..8) {
            let mut calc = Calculator::new();
            for i in 0..count {
                calc.paste(&format!("{i}+1"));
                calc.apply_symbol(Symbol::Evaluate);
                calc.apply_symbol(Symbol::Clear);
            }
            let before = calc.render();

            for _ in 0..count {
                calc.navigate_history(Direction::Back);
            }
            for _ in 0..count {
                calc.navigate_history(Direction::Forward);
            }

            prop_assert_eq!(calc.render().buffer, before.buffer);
            prop_assert_eq!(calc.history_cursor(), count);
        }

        #[test]
        fn prop_result_reevaluates_to_itself(a in 0u32..10_000, b in 1u32..500) {
            let mut calc = session_with(&format!("{a}/{b}"));
            let shown = calc.apply_symbol(Symbol::Evaluate).buffer;

            calc.paste("+0");
            prop_assert_eq!(calc.apply_symbol(Symbol::Evaluate).buffer, shown);
        }
    }
}
