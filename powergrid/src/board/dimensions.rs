//! Square board dimensions.
use crate::board::{Coordinate, CoordinateError, MAX_BOARD_SIZE};

/// Side length of a square board. Between 1 and [`MAX_BOARD_SIZE`] so that every row
/// has a letter.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BoardSize(usize);

impl BoardSize {
    /// Create a new [`BoardSize`] with the given side length.
    /// Panics if `size` is 0 or larger than [`MAX_BOARD_SIZE`].
    pub fn new(size: usize) -> Self {
        match Self::try_new(size) {
            Some(dim) => dim,
            None => panic!(
                "BoardSize must be in range [1, {}], got {}",
                MAX_BOARD_SIZE, size
            ),
        }
    }

    /// Create a new [`BoardSize`] with the given side length.
    /// Returns `None` if `size` is 0 or larger than [`MAX_BOARD_SIZE`].
    pub fn try_new(size: usize) -> Option<Self> {
        if size == 0 || size > MAX_BOARD_SIZE {
            None
        } else {
            Some(Self(size))
        }
    }

    /// Get the side length.
    pub fn get(&self) -> usize {
        self.0
    }

    /// Total number of cells on the board.
    pub fn total_size(&self) -> usize {
        self.0 * self.0
    }

    /// Check if the given [`Coordinate`] lies on the board.
    pub fn contains(&self, coord: &Coordinate) -> bool {
        coord.row < self.0 && coord.col < self.0
    }

    /// Return the coordinate if it lies on the board, otherwise report which axis is
    /// out of range.
    pub fn check_bounds(&self, coord: Coordinate) -> Result<Coordinate, CoordinateError> {
        if coord.row >= self.0 {
            Err(CoordinateError::RowOutOfBounds {
                row: coord.row,
                size: self.0,
            })
        } else if coord.col >= self.0 {
            Err(CoordinateError::ColumnOutOfBounds {
                col: coord.col,
                size: self.0,
            })
        } else {
            Ok(coord)
        }
    }

    /// Format the label of an on-board coordinate, e.g. `(1, 2)` as `"B3"`.
    pub fn label(&self, coord: Coordinate) -> Result<String, CoordinateError> {
        self.check_bounds(coord)?.label()
    }

    /// Parse a label and check that it lies on this board.
    pub fn parse(&self, label: &str) -> Result<Coordinate, CoordinateError> {
        self.check_bounds(label.parse()?)
    }

    /// Get an iterator over rows of this grid. Each row is an iterator over the
    /// coordinates of that row.
    pub fn iter_coordinates(&self) -> impl Iterator<Item = impl Iterator<Item = Coordinate>> {
        let size = self.0;
        (0..size).map(move |row| (0..size).map(move |col| Coordinate { row, col }))
    }
}

impl Default for BoardSize {
    /// The standard 10x10 board.
    fn default() -> Self {
        Self(10)
    }
}
