//! Console state and the public input/display surface
//!
//! [`Console`] ties a [`TerminalBackend`] to the in-process display state
//! and the hotkey table. It is the single writer of both the visible screen
//! and the stored line set; input flows in through the decoder, gets checked
//! against the hotkey table, and only then reaches a caller.
//!
//! The model is single-threaded and blocking throughout: `get_key` and the
//! helpers built on it park the calling thread until the backend delivers a
//! unit. There are no timeouts and no retries; a failed raw read surfaces to
//! the caller as-is.

use std::collections::{HashMap, HashSet};

use unicode_width::UnicodeWidthChar;

use crate::backend::TerminalBackend;
use crate::content::Content;
use crate::error::{Error, Result};
use crate::key::{self, Key};

/// Loop-control result returned by an action in an [`ActionTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep waiting for the next key
    Continue,
    /// Leave the input loop
    Stop,
}

/// An action bound to a key in [`Console::process_input`]
pub type Action = Box<dyn FnMut(&mut Console) -> Flow>;

/// Key-to-action bindings for [`Console::process_input`].
///
/// Owned by the caller (not the console) so actions can borrow the console
/// mutably while they run.
pub type ActionTable = HashMap<Key, Action>;

/// A console: one terminal backend, the current display state, and the
/// hotkey table.
pub struct Console {
    backend: Box<dyn TerminalBackend>,
    /// Unclipped lines as of the last render; empty before the first one
    lines: Vec<String>,
    hotkeys: HashMap<Key, Box<dyn FnMut()>>,
}

impl Console {
    /// Create a console over the given backend with an empty display.
    pub fn new(backend: Box<dyn TerminalBackend>) -> Self {
        Self {
            backend,
            lines: Vec::new(),
            hotkeys: HashMap::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Display buffer
    // ---------------------------------------------------------------------

    /// Replace the whole display with `content`.
    ///
    /// The content is normalized to lines, clipped to the backend viewport,
    /// painted from the origin (clearing anything previously shown beyond
    /// it), and the *unclipped* lines become the new display state.
    ///
    /// Returns `true` if everything fit in the viewport and `false` if any
    /// row or column was truncated. Backends without a fixed-size buffer
    /// repaint everything and always report `true`.
    pub fn display(&mut self, content: impl Into<Content>) -> Result<bool> {
        let lines = content.into().into_lines()?;
        self.render(lines)
    }

    /// Replace part of one row, keeping the rest of the display constant.
    ///
    /// `content` must normalize to a single line; it replaces exactly
    /// `content.chars().count()` characters of row `y` starting at char
    /// column `x` (clamped at the end of the row), then the full updated
    /// line set is re-rendered. Requires a prior [`display`](Self::display):
    /// a row index at or beyond the stored line count fails with
    /// [`Error::OutOfRange`] and leaves the display untouched.
    pub fn set_display(&mut self, x: usize, y: usize, content: impl Into<Content>) -> Result<()> {
        let span = content.into().into_single_line()?;
        if y >= self.lines.len() {
            return Err(Error::OutOfRange {
                row: y,
                rows: self.lines.len(),
            });
        }
        let patched = splice(&self.lines[y], x, &span);
        let mut lines = self.lines.clone();
        lines[y] = patched;
        self.render(lines)?;
        Ok(())
    }

    /// The current display state: unclipped lines as of the last render.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The current display state as one newline-joined string.
    pub fn current_text(&self) -> String {
        self.lines.join("\n")
    }

    fn render(&mut self, lines: Vec<String>) -> Result<bool> {
        let (visible, fits) = match self.backend.size() {
            Some(viewport) => clip(&lines, viewport.cols as usize, viewport.rows as usize),
            // Repaint-whole-screen platforms never clip.
            None => (lines.join("\n"), true),
        };
        self.backend.paint(&visible)?;
        self.lines = lines;
        Ok(fits)
    }

    // ---------------------------------------------------------------------
    // Input dispatch
    // ---------------------------------------------------------------------

    /// Bind `action` to `key`. While bound, pressing `key` invokes the
    /// action and the key is never returned by [`get_key`](Self::get_key)
    /// or anything built on it.
    pub fn bind_hotkey(&mut self, key: Key, action: impl FnMut() + 'static) {
        self.hotkeys.insert(key, Box::new(action));
    }

    /// Remove the hotkey bound to `key`, if any.
    pub fn unbind_hotkey(&mut self, key: Key) {
        self.hotkeys.remove(&key);
    }

    /// Remove all hotkeys.
    pub fn clear_hotkeys(&mut self) {
        self.hotkeys.clear();
    }

    /// Block until the user presses a key that is not a hotkey and return
    /// it. Hotkeys fire their bound action and the wait continues.
    pub fn get_key(&mut self) -> Result<Key> {
        loop {
            let key = key::read_key(self.backend.as_mut())?;
            if let Some(action) = self.hotkeys.get_mut(&key) {
                tracing::debug!(%key, "hotkey intercepted");
                action();
                continue;
            }
            return Ok(key);
        }
    }

    /// Block until the user presses one of `allowed`; other keys are
    /// discarded.
    pub fn get_valid_key(&mut self, allowed: &HashSet<Key>) -> Result<Key> {
        loop {
            let key = self.get_key()?;
            if allowed.contains(&key) {
                return Ok(key);
            }
            tracing::trace!(%key, "discarding key outside the allowed set");
        }
    }

    /// Block until the user presses a key present in `table` and return
    /// the bound value.
    pub fn get_option<'t, T>(&mut self, table: &'t HashMap<Key, T>) -> Result<&'t T> {
        loop {
            let key = self.get_key()?;
            if let Some(value) = table.get(&key) {
                return Ok(value);
            }
            tracing::trace!(%key, "discarding key with no bound option");
        }
    }

    /// Run the key/action loop until an action returns [`Flow::Stop`].
    ///
    /// Keys without a binding are ignored; bound actions receive the console
    /// so they can update the display or read further input.
    pub fn process_input(&mut self, actions: &mut ActionTable) -> Result<()> {
        loop {
            let key = loop {
                let key = self.get_key()?;
                if actions.contains_key(&key) {
                    break key;
                }
                tracing::trace!(%key, "discarding unbound key");
            };
            if let Some(action) = actions.get_mut(&key) {
                if action(self) == Flow::Stop {
                    return Ok(());
                }
            }
        }
    }
}

/// Replace `span.chars().count()` characters of `line` at char column `x`.
///
/// Clamps at the end of the line: a span starting past the end appends, and
/// a span running off the end keeps nothing after it.
fn splice(line: &str, x: usize, span: &str) -> String {
    let head: String = line.chars().take(x).collect();
    let tail: String = line.chars().skip(x + span.chars().count()).collect();
    let mut out = head;
    out.push_str(span);
    out.push_str(&tail);
    out
}

/// Clip lines to `cols` display columns by `rows` lines.
///
/// Returns the newline-joined visible text and whether the input fit without
/// truncation. Column clipping counts display width, never splitting a wide
/// character in half.
fn clip(lines: &[String], cols: usize, rows: usize) -> (String, bool) {
    let mut fits = lines.len() <= rows;
    let clipped: Vec<String> = lines
        .iter()
        .take(rows)
        .map(|line| {
            let (kept, truncated) = clip_columns(line, cols);
            fits &= !truncated;
            kept
        })
        .collect();
    (clipped.join("\n"), fits)
}

fn clip_columns(line: &str, cols: usize) -> (String, bool) {
    let mut width = 0;
    let mut out = String::new();
    for c in line.chars() {
        width += c.width().unwrap_or(0);
        if width > cols {
            return (out, true);
        }
        out.push(c);
    }
    (out, false)
}
