//! Terminal driver boundary
//!
//! The console core never talks to the operating system directly. Everything
//! platform-specific sits behind [`TerminalBackend`]: delivering raw input
//! units, reporting the viewport, and painting text. Two raw-input encodings
//! exist in the wild and a backend declares which one it speaks via
//! [`DecodeScheme`]; the decoder in [`crate::key`] handles both.

mod headless;
#[cfg(unix)]
mod unix;

pub use headless::{HeadlessBackend, ScreenRecord};
#[cfg(unix)]
pub use unix::UnixBackend;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One undecoded input element as delivered by the terminal driver.
///
/// Either a plain byte/character value or an extended key code, depending on
/// the backend's [`DecodeScheme`].
pub type RawUnit = u32;

/// How a backend encodes special keys in its raw units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeScheme {
    /// Special keys arrive as two units: a sentinel lead unit (224) followed
    /// by a discriminating second unit. The Windows console encoding.
    PrefixEscape,
    /// Special keys arrive as a single unit above the character range
    /// (code > 256). The curses/keypad encoding.
    ExtendedCode,
}

/// Viewport dimensions in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Number of columns (characters)
    pub cols: u16,
    /// Number of rows (characters)
    pub rows: u16,
}

impl Viewport {
    /// Create a new viewport size
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

#[cfg(unix)]
impl From<libc::winsize> for Viewport {
    fn from(ws: libc::winsize) -> Self {
        Self {
            cols: ws.ws_col,
            rows: ws.ws_row,
        }
    }
}

/// Capability interface to the underlying terminal driver.
///
/// Implementations own the raw input source and the visible screen. The
/// core calls `read_unit` one unit at a time (blocking), and `paint` with
/// the full clipped text whenever the display changes.
pub trait TerminalBackend {
    /// Which raw-input encoding this backend speaks.
    fn scheme(&self) -> DecodeScheme;

    /// Block until one raw input unit is available and return it.
    ///
    /// A failed read is a hard error; the driver must not retry on its own.
    fn read_unit(&mut self) -> Result<RawUnit>;

    /// Viewport dimensions, or `None` on platforms that repaint the whole
    /// screen rather than clip to a fixed-size buffer.
    fn size(&self) -> Option<Viewport>;

    /// Write `text` starting at the origin and clear every previously
    /// painted cell that `text` does not cover.
    fn paint(&mut self, text: &str) -> Result<()>;
}
