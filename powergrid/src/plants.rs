//! Types used for defining power plants, their shapes and their capacities.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::Coordinate;

pub use self::footprint::{Footprint, Orientation};

mod footprint;

/// The kinds of power plant a player can build.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlantType {
    /// Nuclear: 3x3, 1000 capacity.
    Nuclear,
    /// Gas: 2x2, 300 capacity.
    Gas,
    /// Wind: 2x1 or 1x2, 100 capacity.
    Wind,
    /// Solar: 1x1, 25 capacity.
    Solar,
}

/// Static properties of a plant type. There is exactly one entry per [`PlantType`] and
/// everything that depends on the type of a plant reads it from here.
#[derive(Debug)]
pub struct PlantSpec {
    /// The plant this entry describes.
    pub plant: PlantType,
    /// Width of the footprint when placed horizontally.
    pub width: usize,
    /// Height of the footprint when placed horizontally.
    pub height: usize,
    /// Whether the orientation chosen by the player changes the footprint.
    pub oriented: bool,
    /// Capacity contributed by one plant of this type.
    pub capacity: u32,
    /// Name of the icon drawn in the plant's cells.
    pub icon: &'static str,
}

impl PlantSpec {
    /// Get the footprint of this plant in the given orientation.
    pub fn footprint(&self, orientation: Orientation) -> Footprint {
        match orientation {
            Orientation::Vertical if self.oriented => Footprint::new(self.height, self.width),
            _ => Footprint::new(self.width, self.height),
        }
    }
}

/// Indexed by `PlantType as usize`.
static PLANTS: [PlantSpec; 4] = [
    PlantSpec {
        plant: PlantType::Nuclear,
        width: 3,
        height: 3,
        oriented: false,
        capacity: 1000,
        icon: "nuclear",
    },
    PlantSpec {
        plant: PlantType::Gas,
        width: 2,
        height: 2,
        oriented: false,
        capacity: 300,
        icon: "gas",
    },
    PlantSpec {
        plant: PlantType::Wind,
        width: 2,
        height: 1,
        oriented: true,
        capacity: 100,
        icon: "wind",
    },
    PlantSpec {
        plant: PlantType::Solar,
        width: 1,
        height: 1,
        oriented: false,
        capacity: 25,
        icon: "solar",
    },
];

impl PlantType {
    /// All plant types, largest first.
    pub const ALL: &'static [PlantType] = &[
        PlantType::Nuclear,
        PlantType::Gas,
        PlantType::Wind,
        PlantType::Solar,
    ];

    /// Get the table entry for this plant type.
    pub fn spec(self) -> &'static PlantSpec {
        &PLANTS[self as usize]
    }

    /// Capacity contributed by one plant of this type.
    pub fn capacity(self) -> u32 {
        self.spec().capacity
    }

    /// Footprint of this plant type in the given orientation.
    pub fn footprint(self, orientation: Orientation) -> Footprint {
        self.spec().footprint(orientation)
    }

    /// Icon name for this plant type.
    pub fn icon(self) -> &'static str {
        self.spec().icon
    }

    /// Upper-case name used by the server.
    pub fn name(self) -> &'static str {
        match self {
            PlantType::Nuclear => "NUCLEAR",
            PlantType::Gas => "GAS",
            PlantType::Wind => "WIND",
            PlantType::Solar => "SOLAR",
        }
    }
}

impl fmt::Display for PlantType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Error returned when parsing an unknown plant name.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("unknown plant type {0:?}")]
pub struct UnknownPlant(String);

impl FromStr for PlantType {
    type Err = UnknownPlant;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        PlantType::ALL
            .iter()
            .copied()
            .find(|plant| plant.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| UnknownPlant(name.to_owned()))
    }
}

/// A plant placed on a board.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    /// What kind of plant this is.
    #[serde(rename = "type")]
    pub plant_type: PlantType,
    /// Cells covered by the plant, row-major from the top-left cell.
    pub coordinates: Vec<Coordinate>,
}

impl Plant {
    /// Returns true if the plant covers the given cell.
    pub fn covers(&self, coord: &Coordinate) -> bool {
        self.coordinates.contains(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_type() {
        for plant in PlantType::ALL {
            assert_eq!(plant.spec().plant, *plant);
        }
    }

    #[test]
    fn footprint_areas() {
        let areas: Vec<_> = PlantType::ALL
            .iter()
            .map(|p| p.footprint(Orientation::Horizontal).area())
            .collect();
        assert_eq!(areas, vec![9, 4, 2, 1]);
    }

    #[test]
    fn only_wind_turns() {
        assert_eq!(
            PlantType::Wind.footprint(Orientation::Vertical),
            Footprint::new(1, 2)
        );
        assert_eq!(
            PlantType::Wind.footprint(Orientation::Horizontal),
            Footprint::new(2, 1)
        );
        assert_eq!(
            PlantType::Gas.footprint(Orientation::Vertical),
            PlantType::Gas.footprint(Orientation::Horizontal)
        );
    }

    #[test]
    fn parses_names() {
        assert_eq!("nuclear".parse::<PlantType>(), Ok(PlantType::Nuclear));
        assert_eq!("SOLAR".parse::<PlantType>(), Ok(PlantType::Solar));
        assert!("coal".parse::<PlantType>().is_err());
    }

    #[test]
    fn plant_wire_format() {
        let plant = Plant {
            plant_type: PlantType::Wind,
            coordinates: vec![Coordinate::new(1, 1), Coordinate::new(1, 2)],
        };
        assert_eq!(
            serde_json::to_value(&plant).unwrap(),
            serde_json::json!({"type": "WIND", "coordinates": ["B2", "B3"]})
        );
    }
}
