//! Minicon Console Library
//!
//! A small console abstraction for interactive terminal programs (games,
//! menus, prompts). This crate provides:
//!
//! - `key`: symbolic key values and the raw-unit decoder
//! - `content`: conversion of lines, grids, bytes and scalars into display text
//! - `console`: the display buffer (full render + in-place patch), hotkey
//!   dispatch, and blocking input helpers
//! - `backend`: the terminal-driver boundary, with a real termios backend on
//!   Unix and a deterministic in-memory backend for tests
//!
//! It is intentionally not a TUI toolkit: there are no widgets, colors, or
//! layout, just one fixed-origin viewport and one decoded key at a time.

pub mod backend;
pub mod console;
pub mod content;
pub mod error;
pub mod key;

pub use backend::{DecodeScheme, RawUnit, TerminalBackend, Viewport};
pub use console::{Action, ActionTable, Console, Flow};
pub use content::Content;
pub use error::{Error, Result};
pub use key::Key;
