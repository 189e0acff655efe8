use std::{convert::TryFrom, fmt, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::board::CoordinateError;

/// Number of rows that can be labelled with a single letter.
pub const MAX_BOARD_SIZE: usize = 26;

/// Matches `[A-Z][1-9][0-9]*`. Lower-case rows are accepted so that typed input does
/// not have to be shouted.
static LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z])([1-9][0-9]*)$").unwrap());

/// The coordinates of a cell in a board. Both fields are 0-indexed.
///
/// On the wire and in front of the player a coordinate is written as its label: a row
/// letter followed by the 1-indexed column, so `row: 0, col: 0` is `"A1"`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinate {
    /// Vertical position of the cell, shown as a letter.
    pub row: usize,
    /// Horizontal position of the cell, shown as a number.
    pub col: usize,
}

impl Coordinate {
    /// Construct a [`Coordinate`] from the given `row` and `col`.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Get the coordinate `rows` below and `cols` to the right of this one. Saturates at
    /// `usize::MAX`, which is outside every board.
    pub fn offset(self, rows: usize, cols: usize) -> Self {
        Self::new(self.row.saturating_add(rows), self.col.saturating_add(cols))
    }

    /// The row letter of this coordinate, if the row can be written with one.
    pub fn row_letter(&self) -> Result<char, CoordinateError> {
        if self.row < MAX_BOARD_SIZE {
            Ok((b'A' + self.row as u8) as char)
        } else {
            Err(CoordinateError::RowOutOfBounds {
                row: self.row,
                size: MAX_BOARD_SIZE,
            })
        }
    }

    /// The 1-indexed column number of this coordinate.
    pub fn column_number(&self) -> usize {
        self.col + 1
    }

    /// Format the label of this coordinate without checking it against any particular
    /// board. Only fails if the row has no letter.
    pub fn label(&self) -> Result<String, CoordinateError> {
        Ok(format!("{}{}", self.row_letter()?, self.column_number()))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.row_letter() {
            Ok(letter) => write!(f, "{}{}", letter, self.column_number()),
            Err(_) => write!(f, "({}, {})", self.row, self.col),
        }
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    /// Parse a label such as `"B12"`. Only checks the format; see
    /// [`BoardSize::parse`][crate::board::BoardSize::parse] for bounds.
    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let captures = LABEL
            .captures(label.trim())
            .ok_or_else(|| CoordinateError::Malformed(label.to_owned()))?;
        let row = captures[1].as_bytes()[0].to_ascii_uppercase() - b'A';
        let col = captures[2]
            .parse::<usize>()
            .map_err(|_| CoordinateError::Malformed(label.to_owned()))?;
        Ok(Self::new(row as usize, col - 1))
    }
}

impl TryFrom<String> for Coordinate {
    type Error = CoordinateError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        label.parse()
    }
}

impl From<Coordinate> for String {
    fn from(coord: Coordinate) -> Self {
        coord.to_string()
    }
}

impl From<(usize, usize)> for Coordinate {
    /// Construct a [`Coordinate`] from the given `(row, col)` pair.
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl From<Coordinate> for (usize, usize) {
    /// Convert the [`Coordinate`] into a `(row, col)` pair.
    fn from(coord: Coordinate) -> Self {
        (coord.row, coord.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_origin_as_a1() {
        assert_eq!(Coordinate::new(0, 0).label().unwrap(), "A1");
        assert_eq!(Coordinate::new(9, 9).label().unwrap(), "J10");
        assert_eq!(Coordinate::new(25, 0).label().unwrap(), "Z1");
    }

    #[test]
    fn parses_labels() {
        assert_eq!("B3".parse::<Coordinate>().unwrap(), Coordinate::new(1, 2));
        assert_eq!(" c10 ".parse::<Coordinate>().unwrap(), Coordinate::new(2, 9));
    }

    #[test]
    fn rejects_malformed_labels() {
        for label in &["", "A", "1A", "A0", "AA1", "A-1", "A01", "Ä1"] {
            assert_eq!(
                label.parse::<Coordinate>(),
                Err(CoordinateError::Malformed(label.to_string())),
                "{:?}",
                label
            );
        }
    }

    #[test]
    fn rows_past_z_have_no_label() {
        assert!(Coordinate::new(26, 0).label().is_err());
        assert_eq!(Coordinate::new(26, 0).to_string(), "(26, 0)");
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&Coordinate::new(3, 4)).unwrap();
        assert_eq!(json, "\"D5\"");
        let back: Coordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Coordinate::new(3, 4));
        assert!(serde_json::from_str::<Coordinate>("\"\"").is_err());
    }
}
