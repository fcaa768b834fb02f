//! Clues printed on a board before solving, and the shapes they can be written in.

use itertools::Itertools;
use ndarray::Array2;

use crate::error::{Error, Result};

/// A clue printed in a cell before solving starts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Given {
    /// A numeric clue.
    Number(i64),
    /// Any other marking, kept as the character it was written with.
    Symbol(char),
}

impl Given {
    /// Read one character of a givens string: digits are numbers, a space is no clue, anything else is a symbol.
    pub fn from_char(c: char) -> Option<Given> {
        match c {
            ' ' => None,
            c => Some(match c.to_digit(10) {
                Some(digit) => Given::Number(digit.into()),
                None => Given::Symbol(c),
            }),
        }
    }

    /// The character this clue prints as; numbers past 9 print as `#`.
    pub fn as_char(&self) -> char {
        match self {
            Given::Number(n) => u32::try_from(*n).ok()
                .and_then(|digit| char::from_digit(digit, 10))
                .unwrap_or('#'),
            Given::Symbol(c) => *c,
        }
    }
}

impl From<i64> for Given {
    fn from(value: i64) -> Self {
        Given::Number(value)
    }
}

impl From<char> for Given {
    fn from(value: char) -> Self {
        Given::Symbol(value)
    }
}

/// The shapes in which clues for a whole board can be written down.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Givens {
    /// One character per cell, row-major.
    Flat(String),
    /// One string per row.
    Rows(Vec<String>),
    /// One optional clue per cell, row-major.
    Values(Vec<Option<Given>>),
    /// One list of optional clues per row.
    Nested(Vec<Vec<Option<Given>>>),
}

impl From<&str> for Givens {
    fn from(value: &str) -> Self {
        Givens::Flat(value.to_string())
    }
}

impl From<String> for Givens {
    fn from(value: String) -> Self {
        Givens::Flat(value)
    }
}

impl From<Vec<&str>> for Givens {
    fn from(value: Vec<&str>) -> Self {
        Givens::Rows(value.into_iter().map(str::to_string).collect_vec())
    }
}

impl From<Vec<String>> for Givens {
    fn from(value: Vec<String>) -> Self {
        Givens::Rows(value)
    }
}

impl From<Vec<Option<Given>>> for Givens {
    fn from(value: Vec<Option<Given>>) -> Self {
        Givens::Values(value)
    }
}

impl From<Vec<Vec<Option<Given>>>> for Givens {
    fn from(value: Vec<Vec<Option<Given>>>) -> Self {
        Givens::Nested(value)
    }
}

/// Reshape `givens` into a `height` x `width` array indexed `[y, x]`.
///
/// Fails with [`Error::ShapeMismatch`] when the input cannot be laid out on the board exactly.
pub fn parse_givens(width: usize, height: usize, givens: impl Into<Givens>) -> Result<Array2<Option<Given>>> {
    let mismatch = |reason: String| Error::ShapeMismatch { width, height, reason };

    let flat = match givens.into() {
        Givens::Flat(s) => {
            let chars = s.chars().collect_vec();
            if chars.len() != width * height {
                return Err(mismatch(format!("expected {} characters, got {}", width * height, chars.len())));
            }
            chars.into_iter().map(Given::from_char).collect_vec()
        }
        Givens::Values(values) => {
            if values.len() != width * height {
                return Err(mismatch(format!("expected {} values, got {}", width * height, values.len())));
            }
            values
        }
        Givens::Rows(rows) => {
            let rows = rows.iter().map(|row| row.chars().collect_vec()).collect_vec();
            check_rows(width, height, rows.iter().map(Vec::len)).map_err(mismatch)?;
            rows.into_iter().flatten().map(Given::from_char).collect_vec()
        }
        Givens::Nested(rows) => {
            check_rows(width, height, rows.iter().map(Vec::len)).map_err(mismatch)?;
            rows.into_iter().flatten().collect_vec()
        }
    };

    Array2::from_shape_vec((height, width), flat).map_err(|err| mismatch(err.to_string()))
}

fn check_rows(width: usize, height: usize, lengths: impl ExactSizeIterator<Item = usize>) -> std::result::Result<(), String> {
    if lengths.len() != height {
        return Err(format!("expected {height} rows, got {}", lengths.len()));
    }
    for (y, len) in lengths.enumerate() {
        if len != width {
            return Err(format!("row {y} has {len} entries, expected {width}"));
        }
    }

    Ok(())
}
