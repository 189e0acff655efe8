//! What a single cell looks like.
use enumflags2::BitFlags;

use crate::plants::PlantType;

/// Style tags a cell can carry. Compared as a set, so the order in which a surface
/// lists them never matters.
#[derive(BitFlags, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum CellTag {
    /// A strike hit a plant in this cell.
    Hit = 0b00_0001,
    /// A strike found nothing in this cell.
    Miss = 0b00_0010,
    /// The cell holds part of a plant.
    PlantContainer = 0b00_0100,
    /// The plant is drawn at its normal size.
    Normal = 0b00_1000,
    /// The plant in this cell has not been struck.
    PlantWorking = 0b01_0000,
    /// The plant in this cell has been struck.
    PlantDamaged = 0b10_0000,
}

impl CellTag {
    /// Every tag, in the order surfaces list them.
    pub const ALL: &'static [CellTag] = &[
        CellTag::Hit,
        CellTag::Miss,
        CellTag::PlantContainer,
        CellTag::Normal,
        CellTag::PlantWorking,
        CellTag::PlantDamaged,
    ];

    /// Style class name of this tag.
    pub fn class_name(self) -> &'static str {
        match self {
            CellTag::Hit => "hit",
            CellTag::Miss => "miss",
            CellTag::PlantContainer => "plant-container",
            CellTag::Normal => "normal",
            CellTag::PlantWorking => "plant-working",
            CellTag::PlantDamaged => "plant-damaged",
        }
    }
}

/// The visual states a cell can be in.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VisualState {
    Empty,
    Hit,
    Miss,
    PlantWorking(PlantType),
    PlantDamaged(PlantType),
}

/// Rendered state of one cell: its tags plus the plant icon drawn in it, if any.
///
/// Only the constructors below build values, so an icon always comes with the plant
/// tags and a cell is never both hit and missed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CellVisual {
    tags: BitFlags<CellTag>,
    icon: Option<PlantType>,
}

impl CellVisual {
    /// A cell with nothing in it.
    pub fn empty() -> Self {
        Self {
            tags: BitFlags::empty(),
            icon: None,
        }
    }

    /// A struck cell without a visible plant.
    pub fn hit() -> Self {
        Self {
            tags: CellTag::Hit.into(),
            icon: None,
        }
    }

    /// A cell struck without finding anything.
    pub fn miss() -> Self {
        Self {
            tags: CellTag::Miss.into(),
            icon: None,
        }
    }

    /// A cell showing part of a plant.
    pub fn plant(plant: PlantType, damaged: bool) -> Self {
        let status = if damaged {
            CellTag::PlantDamaged
        } else {
            CellTag::PlantWorking
        };
        Self {
            tags: CellTag::PlantContainer | CellTag::Normal | status,
            icon: Some(plant),
        }
    }

    /// Build the visual for a state.
    pub fn from_state(state: VisualState) -> Self {
        match state {
            VisualState::Empty => Self::empty(),
            VisualState::Hit => Self::hit(),
            VisualState::Miss => Self::miss(),
            VisualState::PlantWorking(plant) => Self::plant(plant, false),
            VisualState::PlantDamaged(plant) => Self::plant(plant, true),
        }
    }

    /// The tag set.
    pub fn tags(&self) -> BitFlags<CellTag> {
        self.tags
    }

    /// The plant drawn in the cell.
    pub fn icon(&self) -> Option<PlantType> {
        self.icon
    }

    /// Icon name as found in the plant table.
    pub fn icon_name(&self) -> Option<&'static str> {
        self.icon.map(PlantType::icon)
    }

    /// Returns true for a cell with no tags and no icon.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.icon.is_none()
    }

    /// Classify the visual.
    pub fn state(&self) -> VisualState {
        match self.icon {
            Some(plant) if self.tags.contains(CellTag::PlantDamaged) => {
                VisualState::PlantDamaged(plant)
            }
            Some(plant) => VisualState::PlantWorking(plant),
            None if self.tags.contains(CellTag::Hit) => VisualState::Hit,
            None if self.tags.contains(CellTag::Miss) => VisualState::Miss,
            None => VisualState::Empty,
        }
    }

    /// Class names for the tags carried by this cell, in [`CellTag::ALL`] order.
    pub fn class_names(&self) -> Vec<&'static str> {
        CellTag::ALL
            .iter()
            .filter(|tag| self.tags.contains(**tag))
            .map(|tag| tag.class_name())
            .collect()
    }
}

impl Default for CellVisual {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_round_trip() {
        for state in &[
            VisualState::Empty,
            VisualState::Hit,
            VisualState::Miss,
            VisualState::PlantWorking(PlantType::Gas),
            VisualState::PlantDamaged(PlantType::Nuclear),
        ] {
            assert_eq!(CellVisual::from_state(*state).state(), *state);
        }
    }

    #[test]
    fn plant_class_names() {
        assert_eq!(
            CellVisual::plant(PlantType::Wind, true).class_names(),
            vec!["plant-container", "normal", "plant-damaged"]
        );
        assert_eq!(
            CellVisual::plant(PlantType::Wind, true).icon_name(),
            Some("wind")
        );
        assert!(CellVisual::empty().class_names().is_empty());
    }
}
