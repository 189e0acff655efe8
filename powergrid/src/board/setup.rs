//! Implements the setup phase of the board: checking where plants may go and whether
//! the board's capacity allows the player to go ready.
use std::ops::RangeInclusive;

use crate::{
    board::{BoardModel, BoardSize, CannotPlaceReason, CapacityError, Coordinate, PlaceError},
    plants::{Orientation, Plant, PlantType},
};

/// A placement approved by [`validate_placement`]. Can only be built by the validator,
/// so a [`BoardModel`] never receives an unchecked plant.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Placement {
    plant_type: PlantType,
    coordinates: Vec<Coordinate>,
    capacity: u32,
}

impl Placement {
    /// Type of plant being placed.
    pub fn plant_type(&self) -> PlantType {
        self.plant_type
    }

    /// Cells the plant will cover, row-major from the anchor.
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Capacity the plant adds to the board.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Turn the placement into the plant it describes.
    pub fn into_plant(self) -> Plant {
        Plant {
            plant_type: self.plant_type,
            coordinates: self.coordinates,
        }
    }
}

/// Check whether a plant of the given type can be placed with its top-left cell at
/// `anchor`. Does not modify the board.
///
/// Bounds are checked before overlap, so a placement that falls off the board is
/// reported as [`CannotPlaceReason::OutOfBounds`] even if it also overlaps. The
/// footprint is only compared against plants already on the board, never against
/// itself.
pub fn validate_placement(
    board: &BoardModel,
    size: BoardSize,
    plant: PlantType,
    anchor: Coordinate,
    orientation: Orientation,
) -> Result<Placement, PlaceError> {
    if !size.contains(&anchor) {
        return Err(PlaceError::new(CannotPlaceReason::OutOfBounds, plant, anchor));
    }
    let coordinates: Vec<_> = plant.footprint(orientation).project(anchor).collect();
    if !coordinates.iter().all(|coord| size.contains(coord)) {
        return Err(PlaceError::new(CannotPlaceReason::OutOfBounds, plant, anchor));
    }
    if coordinates.iter().any(|coord| board.is_occupied(coord)) {
        return Err(PlaceError::new(
            CannotPlaceReason::AlreadyOccupied,
            plant,
            anchor,
        ));
    }
    Ok(Placement {
        plant_type: plant,
        coordinates,
        capacity: plant.capacity(),
    })
}

/// Range of total capacity that lets a player go ready: at least the required capacity
/// and at most 10% above it.
pub fn capacity_window(required: i64) -> RangeInclusive<i64> {
    required..=required * 11 / 10
}

/// Check a board's total capacity against the game's requirement.
pub fn check_ready(total: i64, required: i64) -> Result<(), CapacityError> {
    let window = capacity_window(required);
    if total < *window.start() {
        Err(CapacityError::TooLow { total, required })
    } else if total > *window.end() {
        Err(CapacityError::TooHigh {
            total,
            max: *window.end(),
        })
    } else {
        Ok(())
    }
}

/// Fill the board with randomly placed plants until its total capacity is inside the
/// ready window. Existing plants are kept. Returns the result of [`check_ready`] for the
/// final board, which is an error only if the board ran out of room.
#[cfg(feature = "rng_gen")]
pub fn random_layout<R: rand::Rng + ?Sized>(
    rng: &mut R,
    board: &mut BoardModel,
    size: BoardSize,
    required: i64,
) -> Result<(), CapacityError> {
    use rand::seq::SliceRandom;

    /// Attempts per plant before giving up on the board having room for it.
    const MAX_ATTEMPTS: usize = 256;

    let max = *capacity_window(required).end();
    while board.total_capacity() < required {
        let remaining = max - board.total_capacity();
        let candidates: Vec<_> = PlantType::ALL
            .iter()
            .copied()
            .filter(|plant| i64::from(plant.capacity()) <= remaining)
            .collect();
        let plant = match candidates.choose(rng) {
            Some(plant) => *plant,
            None => break,
        };
        let placed = (0..MAX_ATTEMPTS).any(|_| {
            let anchor = Coordinate::new(rng.gen_range(0, size.get()), rng.gen_range(0, size.get()));
            let orientation = if rng.gen() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            board.try_place(size, plant, anchor, orientation).is_ok()
        });
        if !placed && plant == PlantType::Solar {
            break;
        }
    }
    check_ready(board.total_capacity(), required)
}
