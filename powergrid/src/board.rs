//! Types that make up a player's board as the client sees it.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::plants::{Plant, PlantType};

pub use self::{
    coordinate::{Coordinate, MAX_BOARD_SIZE},
    dimensions::BoardSize,
    errors::{CannotPlaceReason, CapacityError, CoordinateError, PlaceError},
    setup::{capacity_window, check_ready, validate_placement, Placement},
};

mod coordinate;
mod dimensions;
mod errors;
pub mod setup;

/// Board data exactly as the server sends it.
///
/// Lists the server leaves `null` come out empty. Plant coordinates are kept as raw
/// strings because the redacted projection of an opponent's board lists its plants with
/// blank coordinates.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub plants: Vec<SnapshotPlant>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub hits: Vec<Coordinate>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub misses: Vec<Coordinate>,
    #[serde(default)]
    pub total_capacity: i64,
    #[serde(default)]
    pub capacity: i64,
}

/// A plant as listed in a [`BoardSnapshot`].
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPlant {
    #[serde(rename = "type")]
    pub plant_type: PlantType,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub coordinates: Vec<String>,
}

impl SnapshotPlant {
    /// Parse the coordinates of this plant. Fails on the first unreadable label.
    fn parse(&self) -> Result<Plant, CoordinateError> {
        Ok(Plant {
            plant_type: self.plant_type,
            coordinates: self
                .coordinates
                .iter()
                .map(|label| label.parse())
                .collect::<Result<_, _>>()?,
        })
    }
}

impl From<&Plant> for SnapshotPlant {
    fn from(plant: &Plant) -> Self {
        Self {
            plant_type: plant.plant_type,
            coordinates: plant.coordinates.iter().map(ToString::to_string).collect(),
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Everything the client knows about one board.
///
/// Created empty when a board view is mounted, replaced wholesale on every successful
/// fetch, and mutated optimistically when the local player places a plant. While such
/// edits have not been saved, `pending_local_edits` is set and callers must not
/// overwrite the model with a server snapshot.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct BoardModel {
    /// Plants on the board. Always empty for opponents.
    plants: Vec<Plant>,
    /// Cells that were struck and held a plant.
    hits: BTreeSet<Coordinate>,
    /// Cells that were struck and were empty.
    misses: BTreeSet<Coordinate>,
    /// Remaining capacity.
    capacity: i64,
    /// Capacity before any strikes.
    total_capacity: i64,
    /// Set while locally placed plants have not been saved to the server.
    pending_local_edits: bool,
}

impl BoardModel {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole model with the server's copy of the player's own board. Plants
    /// with unreadable coordinates are dropped. Clears `pending_local_edits`.
    pub fn apply_server_snapshot(&mut self, snapshot: BoardSnapshot) {
        let plants = snapshot
            .plants
            .iter()
            .filter_map(|plant| match plant.parse() {
                Ok(plant) => Some(plant),
                Err(err) => {
                    warn!(plant = %plant.plant_type, %err, "dropping plant from snapshot");
                    None
                }
            })
            .collect();
        self.replace(plants, snapshot);
    }

    /// Replace the whole model with the redacted projection of an opponent's board.
    /// Plants are never stored.
    pub fn apply_opponent_snapshot(&mut self, snapshot: BoardSnapshot) {
        self.replace(Vec::new(), snapshot);
    }

    fn replace(&mut self, plants: Vec<Plant>, snapshot: BoardSnapshot) {
        *self = Self {
            plants,
            hits: snapshot.hits.into_iter().collect(),
            misses: snapshot.misses.into_iter().collect(),
            capacity: snapshot.capacity,
            total_capacity: snapshot.total_capacity,
            pending_local_edits: false,
        };
    }

    /// Add a placement approved by [`validate_placement`]. Plant and capacity counters
    /// change together.
    pub fn place_plant_locally(&mut self, placement: Placement) {
        let capacity = i64::from(placement.capacity());
        self.plants.push(placement.into_plant());
        self.capacity += capacity;
        self.total_capacity += capacity;
        self.pending_local_edits = true;
    }

    /// Validate a placement against this board and apply it if it is legal. On error the
    /// board is left untouched.
    pub fn try_place(
        &mut self,
        size: BoardSize,
        plant: PlantType,
        anchor: Coordinate,
        orientation: crate::plants::Orientation,
    ) -> Result<&Plant, PlaceError> {
        let placement = validate_placement(self, size, plant, anchor, orientation)?;
        let index = self.plants.len();
        self.place_plant_locally(placement);
        Ok(&self.plants[index])
    }

    /// Clear every field.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Plants on this board.
    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    /// Cells struck with a hit.
    pub fn hits(&self) -> &BTreeSet<Coordinate> {
        &self.hits
    }

    /// Cells struck with a miss.
    pub fn misses(&self) -> &BTreeSet<Coordinate> {
        &self.misses
    }

    /// Remaining capacity.
    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    /// Capacity of all plants before any strikes.
    pub fn total_capacity(&self) -> i64 {
        self.total_capacity
    }

    /// Whether plants were placed locally and not yet saved.
    pub fn pending_local_edits(&self) -> bool {
        self.pending_local_edits
    }

    /// Get the plant covering the given cell, if any.
    pub fn plant_at(&self, coord: &Coordinate) -> Option<&Plant> {
        self.plants.iter().find(|plant| plant.covers(coord))
    }

    /// Returns true if any plant covers the given cell.
    pub fn is_occupied(&self, coord: &Coordinate) -> bool {
        self.plant_at(coord).is_some()
    }

    /// Returns true if the cell was hit.
    pub fn is_hit(&self, coord: &Coordinate) -> bool {
        self.hits.contains(coord)
    }

    /// Returns true if the cell was missed.
    pub fn is_miss(&self, coord: &Coordinate) -> bool {
        self.misses.contains(coord)
    }

    /// Header text shown above the board.
    pub fn capacity_label(&self) -> String {
        format!("Capacity: {} / {}", self.capacity, self.total_capacity)
    }

    /// Plants in the form the server accepts when saving a board.
    pub fn to_submission(&self) -> Vec<SnapshotPlant> {
        self.plants.iter().map(SnapshotPlant::from).collect()
    }
}
