//! Display content normalization
//!
//! Everything shown on the console goes through [`Content`], a closed set of
//! input shapes with one explicit conversion rule each. Normalization is a
//! pure function: no terminal access, no state. Shapes that cannot be
//! expressed as lines of text (a ragged grid, bytes that are not UTF-8) are
//! rejected rather than coerced.

use crate::error::{Error, Result};

/// A value convertible to display text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// A single string; embedded `\n` splits it into lines
    Line(String),
    /// A list of lines; embedded `\n` in an element splits it further
    Lines(Vec<String>),
    /// A rectangular grid of characters, one row per line
    Grid(Vec<Vec<char>>),
    /// UTF-8 encoded bytes
    Bytes(Vec<u8>),
    /// A formatted scalar (number, bool, char); always a single line
    Scalar(String),
}

impl Content {
    /// Normalize to the canonical line form.
    ///
    /// Empty input normalizes to one empty line, mirroring how a terminal
    /// shows an empty string.
    pub fn into_lines(self) -> Result<Vec<String>> {
        match self {
            Content::Line(s) => Ok(split_lines(&s)),
            Content::Lines(lines) => {
                let lines: Vec<String> = lines.iter().flat_map(|l| split_lines(l)).collect();
                if lines.is_empty() {
                    return Ok(vec![String::new()]);
                }
                Ok(lines)
            }
            Content::Grid(rows) => {
                let width = rows.first().map_or(0, Vec::len);
                if rows.iter().any(|row| row.len() != width) {
                    return Err(Error::UnsupportedContentShape(
                        "grid rows have differing lengths",
                    ));
                }
                if rows.is_empty() {
                    return Ok(vec![String::new()]);
                }
                Ok(rows.into_iter().map(|row| row.into_iter().collect()).collect())
            }
            Content::Bytes(bytes) => Ok(split_lines(&String::from_utf8(bytes)?)),
            Content::Scalar(s) => Ok(vec![s]),
        }
    }

    /// Normalize to exactly one line; multi-line content is rejected.
    ///
    /// This is the shape a patch requires: one logical replacement span.
    pub fn into_single_line(self) -> Result<String> {
        let mut lines = self.into_lines()?;
        if lines.len() != 1 {
            return Err(Error::UnsupportedContentShape(
                "patch content must be a single line",
            ));
        }
        Ok(lines.remove(0))
    }
}

fn split_lines(s: &str) -> Vec<String> {
    s.split('\n').map(str::to_string).collect()
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Line(s.to_string())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Line(s)
    }
}

impl From<Vec<String>> for Content {
    fn from(lines: Vec<String>) -> Self {
        Content::Lines(lines)
    }
}

impl From<Vec<&str>> for Content {
    fn from(lines: Vec<&str>) -> Self {
        Content::Lines(lines.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<Vec<char>>> for Content {
    fn from(rows: Vec<Vec<char>>) -> Self {
        Content::Grid(rows)
    }
}

impl From<&[u8]> for Content {
    fn from(bytes: &[u8]) -> Self {
        Content::Bytes(bytes.to_vec())
    }
}

impl From<char> for Content {
    fn from(c: char) -> Self {
        Content::Scalar(c.to_string())
    }
}

impl From<i64> for Content {
    fn from(n: i64) -> Self {
        Content::Scalar(n.to_string())
    }
}

impl From<u64> for Content {
    fn from(n: u64) -> Self {
        Content::Scalar(n.to_string())
    }
}

impl From<f64> for Content {
    fn from(n: f64) -> Self {
        Content::Scalar(n.to_string())
    }
}

impl From<bool> for Content {
    fn from(b: bool) -> Self {
        Content::Scalar(b.to_string())
    }
}
