//! Errors used by the board model and the placement validator.

use std::fmt::{self, Debug};

use thiserror::Error;

use crate::{board::Coordinate, plants::PlantType};

/// Error produced when converting between coordinates and labels.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum CoordinateError {
    /// The label did not look like a row letter followed by a column number.
    #[error("malformed coordinate label {0:?}")]
    Malformed(String),
    /// The row is not on the board.
    #[error("row {row} is out of bounds for a board of size {size}")]
    RowOutOfBounds { row: usize, size: usize },
    /// The column is not on the board.
    #[error("column {col} is out of bounds for a board of size {size}")]
    ColumnOutOfBounds { col: usize, size: usize },
}

/// Reason why a plant could not be placed at the requested anchor.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum CannotPlaceReason {
    /// Part of the footprint falls off the board.
    #[error("the plant does not fit on the board")]
    OutOfBounds,
    /// One or more of the cells in the footprint already hold a plant.
    #[error("the requested position was already occupied")]
    AlreadyOccupied,
}

/// Error caused when attempting to place a plant in an invalid position.
#[derive(Error, Clone, Eq, PartialEq)]
#[error("could not place {plant} at {anchor}: {reason}")]
pub struct PlaceError {
    #[source]
    reason: CannotPlaceReason,
    plant: PlantType,
    anchor: Coordinate,
}

impl Debug for PlaceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl PlaceError {
    /// Construct a placement error from a reason and the attempted placement.
    pub(super) fn new(reason: CannotPlaceReason, plant: PlantType, anchor: Coordinate) -> Self {
        Self {
            reason,
            plant,
            anchor,
        }
    }

    /// Get the reason placement was aborted.
    pub fn reason(&self) -> CannotPlaceReason {
        self.reason
    }

    /// The plant type that was being placed.
    pub fn plant(&self) -> PlantType {
        self.plant
    }

    /// The anchor the placement was attempted from.
    pub fn anchor(&self) -> Coordinate {
        self.anchor
    }
}

/// Reason why a board's capacity does not allow the player to go ready.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum CapacityError {
    /// Not enough plants placed yet.
    #[error("capacity {total} is below the required {required}")]
    TooLow { total: i64, required: i64 },
    /// More plants than the budget allows.
    #[error("capacity {total} exceeds the allowed maximum of {max}")]
    TooHigh { total: i64, max: i64 },
}
