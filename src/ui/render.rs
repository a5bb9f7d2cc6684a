//! Terminal rendering of the calculator display.
//!
//! The display has two rows: the last expression as a muted label and the
//! buffer below it. Errors are drawn in an accent color.

use crate::calculator::is_error_text;
use crate::history::HistoryEntry;
use crate::session::RenderState;

const MUTED: &str = "\x1b[2m";
const ERROR: &str = "\x1b[38;5;209m";
const RESET: &str = "\x1b[0m";

/// Marker drawn at the cursor position.
pub const CURSOR_MARKER: char = '|';

/// How the display is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Style {
    pub show_cursor: bool,
    /// Emit ANSI colors. Off when output is not a terminal.
    pub color: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            show_cursor: true,
            color: false,
        }
    }
}

impl Style {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// Render the status label and buffer.
///
/// The status row is omitted when there is no last expression to show.
pub fn render_display(state: &RenderState, style: Style) -> String {
    let mut out = String::new();
    if !state.status.is_empty() {
        out.push_str(&style.paint(MUTED, &state.status));
        out.push('\n');
    }

    let buffer = if style.show_cursor && !is_error_text(&state.buffer) {
        with_cursor_marker(&state.buffer, state.cursor)
    } else {
        state.buffer.clone()
    };

    if is_error_text(&state.buffer) {
        out.push_str(&style.paint(ERROR, &buffer));
    } else {
        out.push_str(&buffer);
    }
    out
}

/// Render history entries oldest first, one `expression = result` per line.
pub fn render_history(entries: &[HistoryEntry], style: Style) -> String {
    entries
        .iter()
        .map(|entry| match &entry.result {
            Some(result) => format!("{} {}", style.paint(MUTED, &entry.expression), result_line(result)),
            None => style.paint(MUTED, &entry.expression),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn result_line(result: &str) -> String {
    format!("= {result}")
}

/// Insert the cursor marker at a character offset.
fn with_cursor_marker(buffer: &str, cursor: usize) -> String {
    let mut out = String::with_capacity(buffer.len() + 1);
    let mut placed = false;
    for (i, c) in buffer.chars().enumerate() {
        if i == cursor {
            out.push(CURSOR_MARKER);
            placed = true;
        }
        out.push(c);
    }
    if !placed {
        out.push(CURSOR_MARKER);
    }
    out
}
