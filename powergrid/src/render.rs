//! Board reconciliation: turns a board model into the smallest list of cell updates
//! needed to bring a display surface from what it showed last time to what it should
//! show now.
//!
//! The engine is a pure function from data to mutations. It knows nothing about the
//! surface beyond "give this cell these tags and this icon", and keeps one
//! [`RenderSnapshot`] per board so that unchanged cells are left alone.
use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::board::{BoardModel, Coordinate};

pub use self::visual::{CellTag, CellVisual, VisualState};

mod visual;

/// Identifies one rendered board within a game view.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum BoardId {
    /// The local player's board.
    Own,
    /// The board of the named opponent.
    Opponent(String),
}

/// One change to apply to a surface.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Mutation {
    /// Replace a cell's tags and icon.
    Cell { coord: Coordinate, visual: CellVisual },
    /// Replace the capacity header shown with the board.
    Header(String),
}

impl Mutation {
    /// Apply this mutation to a surface.
    pub fn apply_to<S: Surface + ?Sized>(&self, surface: &mut S) {
        match self {
            Mutation::Cell { coord, visual } => surface.set_cell(*coord, *visual),
            Mutation::Header(text) => surface.set_header(text),
        }
    }
}

/// Something that can display one board.
pub trait Surface {
    /// Show the given visual in the cell at `coord`.
    fn set_cell(&mut self, coord: Coordinate, visual: CellVisual);

    /// Show the given header text.
    fn set_header(&mut self, text: &str);
}

/// What was last rendered for one board. Only non-empty cells are stored.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct RenderSnapshot {
    cells: BTreeMap<Coordinate, CellVisual>,
    header: Option<String>,
}

impl RenderSnapshot {
    /// The visual of the given cell. Cells that were never rendered are empty.
    pub fn cell(&self, coord: &Coordinate) -> CellVisual {
        self.cells.get(coord).copied().unwrap_or_default()
    }

    /// Non-empty cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (&Coordinate, &CellVisual)> {
        self.cells.iter()
    }

    /// The header text, if one was rendered.
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }
}

/// Compute the visual of every non-empty cell of a board.
///
/// Layers are applied in a fixed order: plants (only if `show_plants`), then hits, then
/// misses. A hit on a plant cell marks it damaged; a hit elsewhere marks a plain hit. A
/// miss never changes a plant cell and replaces a plain hit, so no cell is both.
pub fn layer(board: &BoardModel, show_plants: bool) -> BTreeMap<Coordinate, CellVisual> {
    let mut cells = BTreeMap::new();
    if show_plants {
        for plant in board.plants() {
            for coord in &plant.coordinates {
                cells.insert(*coord, CellVisual::plant(plant.plant_type, false));
            }
        }
    }
    for coord in board.hits() {
        let visual = match cells.get(coord).map(CellVisual::icon) {
            Some(Some(plant)) => CellVisual::plant(plant, true),
            _ => CellVisual::hit(),
        };
        cells.insert(*coord, visual);
    }
    for coord in board.misses() {
        let is_plant = cells
            .get(coord)
            .map_or(false, |visual| visual.icon().is_some());
        if !is_plant {
            cells.insert(*coord, CellVisual::miss());
        }
    }
    cells
}

/// Diff a board against what was rendered before.
///
/// Returns the mutations to apply, in row-major order followed by the header, and the
/// snapshot to pass as `previous` next time. Reconciling an unchanged board against
/// the returned snapshot yields no mutations.
pub fn reconcile(
    previous: &RenderSnapshot,
    board: &BoardModel,
    show_plants: bool,
) -> (Vec<Mutation>, RenderSnapshot) {
    let next = RenderSnapshot {
        cells: layer(board, show_plants),
        header: Some(board.capacity_label()),
    };

    let mut mutations = Vec::new();
    for (coord, visual) in &next.cells {
        if previous.cell(coord) != *visual {
            mutations.push(Mutation::Cell {
                coord: *coord,
                visual: *visual,
            });
        }
    }
    for (coord, visual) in &previous.cells {
        if !next.cells.contains_key(coord) && !visual.is_empty() {
            mutations.push(Mutation::Cell {
                coord: *coord,
                visual: CellVisual::empty(),
            });
        }
    }
    // Resets were appended after the updates; keep the list row-major.
    mutations.sort_by_key(|mutation| match mutation {
        Mutation::Cell { coord, .. } => Some(*coord),
        Mutation::Header(_) => None,
    });
    if previous.header != next.header {
        mutations.push(Mutation::Header(board.capacity_label()));
    }
    (mutations, next)
}

/// Holds the last rendered snapshot of every board in a game view.
#[derive(Debug, Default)]
pub struct Reconciler {
    snapshots: HashMap<BoardId, RenderSnapshot>,
}

impl Reconciler {
    /// Create a reconciler that has rendered nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile one board and remember the result for next time.
    pub fn reconcile(&mut self, id: &BoardId, board: &BoardModel, show_plants: bool) -> Vec<Mutation> {
        let previous = self.snapshots.remove(id).unwrap_or_default();
        let (mutations, next) = reconcile(&previous, board, show_plants);
        debug!(board = ?id, mutations = mutations.len(), "reconciled board");
        self.snapshots.insert(id.clone(), next);
        mutations
    }

    /// Drop the snapshot of a board whose surface was torn down. The next reconcile of
    /// that board renders every non-empty cell again.
    pub fn forget(&mut self, id: &BoardId) {
        self.snapshots.remove(id);
    }

    /// The last snapshot rendered for a board.
    pub fn snapshot(&self, id: &BoardId) -> Option<&RenderSnapshot> {
        self.snapshots.get(id)
    }
}
