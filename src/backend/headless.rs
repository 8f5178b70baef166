//! Headless terminal backend
//!
//! A deterministic in-memory backend for tests and host programs that want
//! to drive a console without a real terminal: input is a scripted queue of
//! raw units, and every paint is recorded instead of drawn. The decode
//! scheme and viewport are chosen at construction, so both raw encodings
//! (and the no-viewport, repaint-everything case) can be exercised anywhere.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use super::{DecodeScheme, RawUnit, TerminalBackend, Viewport};
use crate::error::Result;

/// What the headless backend has painted so far
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScreenRecord {
    /// The text of the most recent paint
    pub text: String,
    /// Total number of paints
    pub paints: usize,
}

/// In-memory backend with scripted input and a recorded screen
pub struct HeadlessBackend {
    scheme: DecodeScheme,
    viewport: Option<Viewport>,
    input: VecDeque<RawUnit>,
    record: Rc<RefCell<ScreenRecord>>,
}

impl HeadlessBackend {
    /// Create a backend speaking `scheme`, with `None` for a platform that
    /// repaints the whole screen instead of clipping.
    pub fn new(scheme: DecodeScheme, viewport: Option<Viewport>) -> Self {
        Self {
            scheme,
            viewport,
            input: VecDeque::new(),
            record: Rc::new(RefCell::new(ScreenRecord::default())),
        }
    }

    /// Queue one raw unit.
    pub fn push_unit(&mut self, unit: RawUnit) {
        self.input.push_back(unit);
    }

    /// Queue a slice of raw units in order.
    pub fn push_units(&mut self, units: &[RawUnit]) {
        self.input.extend(units.iter().copied());
    }

    /// Queue each character of `s` as one raw unit.
    pub fn push_chars(&mut self, s: &str) {
        self.input.extend(s.chars().map(|c| c as RawUnit));
    }

    /// Shared handle to the paint record; stays valid after the backend is
    /// boxed into a console.
    pub fn record(&self) -> Rc<RefCell<ScreenRecord>> {
        self.record.clone()
    }
}

impl TerminalBackend for HeadlessBackend {
    fn scheme(&self) -> DecodeScheme {
        self.scheme
    }

    fn read_unit(&mut self) -> Result<RawUnit> {
        self.input.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "scripted input exhausted").into()
        })
    }

    fn size(&self) -> Option<Viewport> {
        self.viewport
    }

    fn paint(&mut self, text: &str) -> Result<()> {
        let mut record = self.record.borrow_mut();
        record.text = text.to_string();
        record.paints += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_units_come_back_in_order() {
        let mut b = HeadlessBackend::new(DecodeScheme::ExtendedCode, None);
        b.push_chars("ab");
        b.push_unit(259);
        assert_eq!(b.read_unit().unwrap(), 'a' as RawUnit);
        assert_eq!(b.read_unit().unwrap(), 'b' as RawUnit);
        assert_eq!(b.read_unit().unwrap(), 259);
    }

    #[test]
    fn test_exhausted_input_is_a_hard_error() {
        let mut b = HeadlessBackend::new(DecodeScheme::ExtendedCode, None);
        assert!(b.read_unit().is_err());
    }

    #[test]
    fn test_paints_are_recorded() {
        let mut b = HeadlessBackend::new(DecodeScheme::ExtendedCode, Some(Viewport::new(4, 2)));
        let record = b.record();
        b.paint("hi").unwrap();
        b.paint("there").unwrap();
        assert_eq!(record.borrow().text, "there");
        assert_eq!(record.borrow().paints, 2);
    }
}
