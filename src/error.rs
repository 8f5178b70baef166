//! Error types for console operations

use std::io;

use thiserror::Error;

use crate::backend::RawUnit;

/// Console error type
#[derive(Error, Debug)]
pub enum Error {
    /// A raw input unit could not be decoded as a character
    #[error("cannot decode raw unit {unit:#x} as a character")]
    Decode { unit: RawUnit },

    /// A special-key sequence was not found in the lookup table
    #[error("unknown key sequence: first unit {first:#x}, second unit {second:?}")]
    UnknownKeySequence {
        first: RawUnit,
        second: Option<RawUnit>,
    },

    /// A patch targeted a row beyond the current display state
    #[error("row {row} out of range: display has {rows} line(s)")]
    OutOfRange { row: usize, rows: usize },

    /// Content could not be normalized to display text
    #[error("unsupported content shape: {0}")]
    UnsupportedContentShape(&'static str),

    /// Byte content was not valid UTF-8
    #[error("content is not valid UTF-8: {0}")]
    ContentEncoding(#[from] std::string::FromUtf8Error),

    /// I/O error from the terminal driver
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// System call error from the terminal driver
    #[cfg(unix)]
    #[error("system error: {0}")]
    Sys(#[from] nix::Error),
}

/// Result type for console operations
pub type Result<T> = std::result::Result<T, Error>;
