//! Symbolic keys and the raw-unit decoder
//!
//! Raw terminal input arrives in one of two encodings (see
//! [`DecodeScheme`]): the prefix-escape form, where special keys are a
//! sentinel lead unit followed by a discriminating second unit, and the
//! extended-code form, where special keys are single units above the
//! character range. [`read_key`] folds both into one platform-independent
//! [`Key`] value. Decoding is total: every raw input maps to exactly one
//! `Key` or fails with an explicit error.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::backend::{DecodeScheme, RawUnit, TerminalBackend};
use crate::error::{Error, Result};

/// Sentinel lead unit announcing a two-unit sequence (prefix-escape scheme)
pub const PREFIX_SENTINEL: RawUnit = 224;

/// Raw units above this value are special-key codes (extended-code scheme)
pub const EXTENDED_THRESHOLD: RawUnit = 256;

/// One logical keypress, independent of the raw encoding that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable (or control) character
    Char(char),

    // Cursor keys
    Up,
    Down,
    Left,
    Right,

    // Navigation
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,

    // Editing
    Enter,
    Tab,
    Escape,
    Backspace,

    /// Function keys F1..=F12
    F(u8),
}

/// Decode one keypress from the backend, blocking until a unit arrives.
///
/// Reads one raw unit. If it is the scheme's special-key marker, resolves
/// the key through the fixed lookup table for that scheme (reading the
/// second unit first in the prefix-escape case); an unrecognized sequence
/// fails with [`Error::UnknownKeySequence`]. Any other unit decodes as a
/// character, with [`Error::Decode`] on values that are not valid scalars.
pub fn read_key(backend: &mut dyn TerminalBackend) -> Result<Key> {
    let unit = backend.read_unit()?;
    match backend.scheme() {
        DecodeScheme::PrefixEscape if unit == PREFIX_SENTINEL => {
            let second = backend.read_unit()?;
            prefix_escape_key(second).ok_or(Error::UnknownKeySequence {
                first: unit,
                second: Some(second),
            })
        }
        DecodeScheme::ExtendedCode if unit > EXTENDED_THRESHOLD => {
            extended_code_key(unit).ok_or(Error::UnknownKeySequence {
                first: unit,
                second: None,
            })
        }
        _ => char_key(unit),
    }
}

/// Decode a single unit as a character key.
///
/// Control bytes with a named equivalent normalize to the named key so the
/// symbolic form is identical across schemes (the extended-code wire sends
/// Enter as 0x0a, the prefix-escape wire as 0x0d).
fn char_key(unit: RawUnit) -> Result<Key> {
    match unit {
        0x0a | 0x0d => Ok(Key::Enter),
        0x09 => Ok(Key::Tab),
        0x1b => Ok(Key::Escape),
        0x08 | 0x7f => Ok(Key::Backspace),
        _ => char::from_u32(unit)
            .map(Key::Char)
            .ok_or(Error::Decode { unit }),
    }
}

/// Second-unit lookup for the prefix-escape scheme (lead unit 224)
fn prefix_escape_key(second: RawUnit) -> Option<Key> {
    let key = match u8::try_from(second).ok()? {
        b'H' => Key::Up,
        b'P' => Key::Down,
        b'M' => Key::Right,
        b'K' => Key::Left,
        b'G' => Key::Home,
        b'O' => Key::End,
        b'I' => Key::PageUp,
        b'Q' => Key::PageDown,
        b'R' => Key::Insert,
        b'S' => Key::Delete,
        // Function keys F1-F10, then the separate F11/F12 pair
        n @ 59..=68 => Key::F(n - 58),
        133 => Key::F(11),
        134 => Key::F(12),
        _ => return None,
    };
    Some(key)
}

/// Single-unit lookup for the extended-code scheme (keypad codes > 256)
fn extended_code_key(code: RawUnit) -> Option<Key> {
    let key = match code {
        259 => Key::Up,
        258 => Key::Down,
        260 => Key::Left,
        261 => Key::Right,
        262 => Key::Home,
        360 => Key::End,
        339 => Key::PageUp,
        338 => Key::PageDown,
        331 => Key::Insert,
        330 => Key::Delete,
        263 => Key::Backspace,
        // KEY_F(n) block
        265..=276 => Key::F((code - 264) as u8),
        _ => return None,
    };
    Some(key)
}

impl fmt::Display for Key {
    /// The stable cross-platform name of the key (`"up"`, `"f1"`, `"q"`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{c}"),
            Key::Up => f.write_str("up"),
            Key::Down => f.write_str("down"),
            Key::Left => f.write_str("left"),
            Key::Right => f.write_str("right"),
            Key::Home => f.write_str("home"),
            Key::End => f.write_str("end"),
            Key::PageUp => f.write_str("pageup"),
            Key::PageDown => f.write_str("pagedown"),
            Key::Insert => f.write_str("insert"),
            Key::Delete => f.write_str("delete"),
            Key::Enter => f.write_str("enter"),
            Key::Tab => f.write_str("tab"),
            Key::Escape => f.write_str("escape"),
            Key::Backspace => f.write_str("backspace"),
            Key::F(n) => write!(f, "f{n}"),
        }
    }
}

/// Failed to parse a key from its stable name
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unrecognized key name: {0:?}")]
pub struct ParseKeyError(String);

impl FromStr for Key {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = match s {
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" => Key::PageUp,
            "pagedown" => Key::PageDown,
            "insert" => Key::Insert,
            "delete" => Key::Delete,
            "enter" => Key::Enter,
            "tab" => Key::Tab,
            "escape" => Key::Escape,
            "backspace" => Key::Backspace,
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    (Some('f'), Some(_)) => s[1..]
                        .parse::<u8>()
                        .ok()
                        .filter(|n| (1..=12).contains(n))
                        .map(Key::F)
                        .ok_or_else(|| ParseKeyError(s.to_string()))?,
                    _ => return Err(ParseKeyError(s.to_string())),
                }
            }
        };
        Ok(key)
    }
}

// Keys serialize as their stable names so key bindings stored by a host
// mean the same thing on every platform.
impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;

    fn prefix_backend(units: &[RawUnit]) -> HeadlessBackend {
        let mut b = HeadlessBackend::new(DecodeScheme::PrefixEscape, None);
        b.push_units(units);
        b
    }

    fn extended_backend(units: &[RawUnit]) -> HeadlessBackend {
        let mut b = HeadlessBackend::new(DecodeScheme::ExtendedCode, None);
        b.push_units(units);
        b
    }

    #[test]
    fn test_plain_characters_decode_to_themselves() {
        for c in ['a', 'Z', '5', ' ', '!', 'é'] {
            let mut b = extended_backend(&[c as RawUnit]);
            assert_eq!(read_key(&mut b).unwrap(), Key::Char(c));
            let mut b = prefix_backend(&[c as RawUnit]);
            assert_eq!(read_key(&mut b).unwrap(), Key::Char(c));
        }
    }

    #[test]
    fn test_prefix_escape_arrows() {
        let cases = [
            (b'H', Key::Up),
            (b'P', Key::Down),
            (b'M', Key::Right),
            (b'K', Key::Left),
        ];
        for (second, expected) in cases {
            let mut b = prefix_backend(&[PREFIX_SENTINEL, u32::from(second)]);
            assert_eq!(read_key(&mut b).unwrap(), expected);
        }
    }

    #[test]
    fn test_prefix_escape_function_keys() {
        let mut b = prefix_backend(&[PREFIX_SENTINEL, 59, PREFIX_SENTINEL, 68, PREFIX_SENTINEL, 134]);
        assert_eq!(read_key(&mut b).unwrap(), Key::F(1));
        assert_eq!(read_key(&mut b).unwrap(), Key::F(10));
        assert_eq!(read_key(&mut b).unwrap(), Key::F(12));
    }

    #[test]
    fn test_extended_codes() {
        let cases = [
            (259, Key::Up),
            (258, Key::Down),
            (261, Key::Right),
            (260, Key::Left),
            (263, Key::Backspace),
            (265, Key::F(1)),
            (266, Key::F(2)),
            (276, Key::F(12)),
            (330, Key::Delete),
            (360, Key::End),
        ];
        for (code, expected) in cases {
            let mut b = extended_backend(&[code]);
            assert_eq!(read_key(&mut b).unwrap(), expected);
        }
    }

    #[test]
    fn test_unknown_prefix_sequence_is_an_error() {
        let mut b = prefix_backend(&[PREFIX_SENTINEL, u32::from(b'Z')]);
        match read_key(&mut b) {
            Err(Error::UnknownKeySequence { first, second }) => {
                assert_eq!(first, PREFIX_SENTINEL);
                assert_eq!(second, Some(u32::from(b'Z')));
            }
            other => panic!("expected UnknownKeySequence, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_extended_code_is_an_error() {
        let mut b = extended_backend(&[999]);
        assert!(matches!(
            read_key(&mut b),
            Err(Error::UnknownKeySequence { first: 999, second: None })
        ));
    }

    #[test]
    fn test_invalid_scalar_is_a_decode_error() {
        // 0xD800 is a surrogate, not a scalar value. In the prefix-escape
        // scheme there is no code range, so it reaches the char path.
        let mut b = prefix_backend(&[0xD800]);
        assert!(matches!(read_key(&mut b), Err(Error::Decode { unit: 0xD800 })));
    }

    #[test]
    fn test_control_bytes_normalize_across_schemes() {
        let mut b = prefix_backend(&[0x0d, 0x08]);
        assert_eq!(read_key(&mut b).unwrap(), Key::Enter);
        assert_eq!(read_key(&mut b).unwrap(), Key::Backspace);

        let mut b = extended_backend(&[0x0a, 0x7f, 263]);
        assert_eq!(read_key(&mut b).unwrap(), Key::Enter);
        assert_eq!(read_key(&mut b).unwrap(), Key::Backspace);
        assert_eq!(read_key(&mut b).unwrap(), Key::Backspace);
    }

    #[test]
    fn test_sentinel_is_a_plain_character_in_the_extended_scheme() {
        // 224 is 'à' when the backend speaks extended codes.
        let mut b = extended_backend(&[224]);
        assert_eq!(read_key(&mut b).unwrap(), Key::Char('à'));
    }

    #[test]
    fn test_stable_names_round_trip() {
        let keys = [
            Key::Up,
            Key::Down,
            Key::Left,
            Key::Right,
            Key::Home,
            Key::End,
            Key::PageUp,
            Key::PageDown,
            Key::Insert,
            Key::Delete,
            Key::Enter,
            Key::Tab,
            Key::Escape,
            Key::Backspace,
            Key::F(1),
            Key::F(12),
            Key::Char('q'),
            Key::Char('ä'),
        ];
        for key in keys {
            let name = key.to_string();
            assert_eq!(name.parse::<Key>().unwrap(), key, "name {name:?}");
        }
    }

    #[test]
    fn test_bad_names_fail_to_parse() {
        for name in ["", "f0", "f13", "upp", "ctrl-c"] {
            assert!(name.parse::<Key>().is_err(), "name {name:?}");
        }
    }
}
