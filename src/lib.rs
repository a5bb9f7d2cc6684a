//! calcline: the core of an interactive calculator.
//!
//! The crate edits an expression buffer key by key, evaluates it with a
//! closed-grammar parser and keeps a replayable history of results. Hosts
//! drive everything through [`session::Calculator`].

pub mod calculator;
pub mod config;
pub mod editor;
pub mod history;
pub mod session;
pub mod ui;

pub use calculator::{CalcError, CalcResult, calculate};
pub use config::Config;
pub use editor::{EditState, Symbol};
pub use history::{Direction, HistoryEntry};
pub use session::{Calculator, RenderState};
