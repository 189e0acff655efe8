//! Text rendering of a game view.
use std::{collections::BTreeMap, fmt};

use powergrid::{
    api::GameApi,
    board::{BoardSize, Coordinate},
    game::Scheduler,
    plants::PlantType,
    render::{BoardId, CellVisual, Surface, VisualState},
    view::{GameView, Notice, NoticeKind},
};

/// A board drawn as text. Only ever changed through [`Surface`].
pub struct TextSurface {
    size: BoardSize,
    cells: Vec<CellVisual>,
    header: String,
}

impl TextSurface {
    pub fn new(size: BoardSize) -> Self {
        Self {
            size,
            cells: vec![CellVisual::empty(); size.total_size()],
            header: String::new(),
        }
    }

    fn index(&self, coord: Coordinate) -> Option<usize> {
        if self.size.contains(&coord) {
            Some(coord.row * self.size.get() + coord.col)
        } else {
            None
        }
    }

    fn show(&self, title: &str) {
        println!("{}  [{}]", title, self.header);
        show_board(
            self.size,
            self.size
                .iter_coordinates()
                .map(|row| row.map(|coord| self.index(coord).map(|i| Glyph(self.cells[i])))),
        );
    }
}

impl Surface for TextSurface {
    fn set_cell(&mut self, coord: Coordinate, visual: CellVisual) {
        if let Some(index) = self.index(coord) {
            self.cells[index] = visual;
        }
    }

    fn set_header(&mut self, text: &str) {
        self.header = text.to_owned();
    }
}

/// Display helper that prints a cell.
struct Glyph(CellVisual);

fn abbrev(plant: PlantType) -> &'static str {
    match plant {
        PlantType::Nuclear => "N",
        PlantType::Gas => "G",
        PlantType::Wind => "W",
        PlantType::Solar => "S",
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0.state() {
            VisualState::Empty => f.pad("~~"),
            VisualState::Hit => f.pad("x"),
            VisualState::Miss => f.pad("o"),
            VisualState::PlantWorking(plant) => f.pad(abbrev(plant)),
            VisualState::PlantDamaged(plant) => f.pad(&format!("x{}", abbrev(plant))),
        }
    }
}

/// Print the grid with column numbers across the top and row letters down the side.
fn show_board(
    size: BoardSize,
    rows: impl Iterator<Item = impl Iterator<Item = Option<impl fmt::Display>>>,
) {
    print!("   ");
    for i in 1..=size.get() {
        print!("{:^4}", i);
    }
    println!();
    for (i, row) in rows.enumerate() {
        let letter = Coordinate::new(i, 0).row_letter().unwrap_or('?');
        print!("{:>2} ", letter);
        for cell in row {
            match cell {
                Some(cell) => print!("{:^4}", cell),
                None => print!("{:^4}", ""),
            }
        }
        println!();
    }
}

fn show_notice(notice: &Notice) {
    let marker = match notice.kind() {
        NoticeKind::Success => "*",
        NoticeKind::Waiting => "...",
        NoticeKind::Error => "!",
    };
    println!("{} {}", marker, notice);
}

/// Keeps one surface per board and reprints the view when something changed.
#[derive(Default)]
pub struct Screen {
    surfaces: BTreeMap<BoardId, TextSurface>,
    last_status: Vec<String>,
    last_notice: Option<Notice>,
    last_phase_notice: Option<Notice>,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply pending board updates and print the view if anything changed, or always
    /// when `force` is set.
    pub fn update<A: GameApi, S: Scheduler>(&mut self, view: &mut GameView<A, S>, force: bool) {
        let updates = view.drain_updates();
        let mut changed = force || !updates.is_empty();
        for update in updates {
            let size = view.board_size();
            let surface = self
                .surfaces
                .entry(update.board)
                .or_insert_with(|| TextSurface::new(size));
            for mutation in &update.mutations {
                mutation.apply_to(surface);
            }
        }

        let status = view.status_lines();
        let notice = view.notice().cloned();
        let phase_notice = view.phase_notice();
        changed |= status != self.last_status
            || notice != self.last_notice
            || phase_notice != self.last_phase_notice;
        self.last_status = status;
        self.last_notice = notice;
        self.last_phase_notice = phase_notice;
        if changed {
            self.show(view);
        }
    }

    fn show<A: GameApi, S: Scheduler>(&self, view: &GameView<A, S>) {
        let controls = view.controls();
        println!();
        for line in &self.last_status {
            println!("{}", line);
        }
        if controls.boards {
            if let Some(surface) = self.surfaces.get(&BoardId::Own) {
                println!();
                surface.show(&format!("Your board ({})", view.player()));
            }
        }
        if controls.opponents {
            for name in view.opponent_names() {
                if let Some(surface) = self.surfaces.get(&BoardId::Opponent(name.to_owned())) {
                    println!();
                    surface.show(&format!("Opponent: {}", name));
                }
            }
        }
        println!();
        if controls.setup {
            let selected = view
                .selected_plant()
                .map_or_else(|| "none".to_owned(), |plant| plant.to_string());
            println!(
                "Placing: {} ({:?})  {}",
                selected,
                view.orientation(),
                view.capacity_summary()
            );
        }
        if let Some(notice) = &self.last_phase_notice {
            show_notice(notice);
        }
        if let Some(notice) = &self.last_notice {
            show_notice(notice);
        }
        if controls.home_link {
            println!("Use quit to leave and check the game id.");
        }
    }
}
