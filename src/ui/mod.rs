mod render;

pub use render::{CURSOR_MARKER, Style, render_display, render_history};
