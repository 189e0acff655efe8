use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    time::Duration,
};

use powergrid::{
    api::{ApiError, GameApi},
    board::{BoardSnapshot, Coordinate, SnapshotPlant},
    game::{
        GameState, GameStatus, ManualScheduler, Phase, PollIntervals, StrikeOutcome,
        StrikeRequest, TimerEvent,
    },
    plants::{Orientation, PlantType},
    render::{BoardId, CellVisual, Mutation},
    view::{GameView, NoticeKind},
};

/// In-memory server for one game, recording every request it receives.
#[derive(Default)]
struct FakeServer {
    game: RefCell<Option<GameState>>,
    own: RefCell<Option<BoardSnapshot>>,
    opponents: RefCell<BTreeMap<String, BoardSnapshot>>,
    strike_outcome: Cell<Option<StrikeOutcome>>,
    reject_ready: RefCell<Option<String>>,
    unavailable: Cell<bool>,
    calls: RefCell<Vec<String>>,
}

impl FakeServer {
    fn with_game(state: GameState) -> Self {
        let server = Self::default();
        *server.game.borrow_mut() = Some(state);
        server
    }

    fn set_status(&self, status: GameStatus, turn: Option<&str>) {
        if let Some(state) = self.game.borrow_mut().as_mut() {
            state.status = status;
            state.turn = turn.map(str::to_owned);
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }
}

impl GameApi for FakeServer {
    async fn game(&self) -> Result<GameState, ApiError> {
        self.record("game");
        if self.unavailable.get() {
            return Err(ApiError::Status {
                code: 503,
                detail: "unavailable".to_owned(),
            });
        }
        self.game
            .borrow()
            .clone()
            .ok_or_else(|| ApiError::NotFound("GAME_NOT_FOUND".to_owned()))
    }

    async fn player_board(&self) -> Result<BoardSnapshot, ApiError> {
        self.record("own");
        Ok(self.own.borrow().clone().unwrap_or_default())
    }

    async fn opponent_board(&self, opponent: &str) -> Result<BoardSnapshot, ApiError> {
        self.record(format!("opponent:{}", opponent));
        Ok(self
            .opponents
            .borrow()
            .get(opponent)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_board(&self, plants: &[SnapshotPlant]) -> Result<BoardSnapshot, ApiError> {
        self.record("save");
        let total: i64 = plants
            .iter()
            .map(|plant| i64::from(plant.plant_type.capacity()))
            .sum();
        let snapshot = BoardSnapshot {
            plants: plants.to_vec(),
            total_capacity: total,
            capacity: total,
            ..BoardSnapshot::default()
        };
        *self.own.borrow_mut() = Some(snapshot.clone());
        Ok(snapshot)
    }

    async fn ready(&self) -> Result<(), ApiError> {
        self.record("ready");
        if let Some(detail) = self.reject_ready.borrow().clone() {
            return Err(ApiError::Status { code: 400, detail });
        }
        if let Some(state) = self.game.borrow_mut().as_mut() {
            if let Some(me) = state.players.get_mut("me") {
                me.ready = true;
            }
        }
        Ok(())
    }

    async fn strike(&self, request: &StrikeRequest) -> Result<StrikeOutcome, ApiError> {
        self.record(format!("strike:{}:{}", request.target(), request.coordinate()));
        Ok(self.strike_outcome.get().unwrap_or(StrikeOutcome::Miss))
    }
}

fn view(server: FakeServer) -> GameView<FakeServer, ManualScheduler> {
    GameView::new(server, "me", PollIntervals::default(), ManualScheduler::new())
}

fn pending_two_player() -> GameState {
    GameState::pending(vec!["me", "them"])
}

fn notice_text(view: &GameView<FakeServer, ManualScheduler>) -> Option<&str> {
    view.notice().map(|notice| notice.text())
}

#[tokio::test]
async fn cadence_switch_rearms_exactly_once() {
    let mut view = view(FakeServer::with_game(pending_two_player()));
    view.start();
    view.refresh().await;
    view.refresh().await;

    view.api().set_status(GameStatus::InProgress, Some("them"));
    view.refresh().await;
    view.refresh().await;

    assert_eq!(view.phase(), Phase::InProgress);
    assert_eq!(
        view.machine().scheduler().history(),
        &[
            TimerEvent::Armed(0, Duration::from_secs(3)),
            TimerEvent::Cancelled(0),
            TimerEvent::Armed(1, Duration::from_secs(1)),
        ]
    );
    assert_eq!(view.machine().scheduler().live().len(), 1);
}

#[tokio::test]
async fn missing_game_stops_polling_for_good() {
    let mut view = view(FakeServer::default());
    view.start();
    view.refresh().await;

    assert_eq!(view.phase(), Phase::NotFound);
    assert!(view.machine().scheduler().live().is_empty());
    assert_eq!(
        notice_text(&view),
        Some("Game not found. Please check the game ID and try again.")
    );
    assert!(view.controls().home_link);
    assert_eq!(view.api().take_calls(), vec!["game"]);

    // A tick that was already queued when the timer was cancelled.
    view.refresh().await;
    view.start();
    assert!(view.api().take_calls().is_empty());
    assert!(view.machine().scheduler().live().is_empty());
}

#[tokio::test]
async fn fetch_error_clears_once_polling_recovers() {
    let mut view = view(FakeServer::with_game(pending_two_player()));
    view.start();
    view.refresh().await;
    assert_eq!(notice_text(&view), None);

    view.api().unavailable.set(true);
    view.refresh().await;
    assert_eq!(
        notice_text(&view),
        Some("Error fetching game data. Please try again.")
    );
    assert_eq!(view.phase(), Phase::Pending);
    assert_eq!(view.machine().scheduler().live().len(), 1);

    view.api().unavailable.set(false);
    view.refresh().await;
    assert_eq!(notice_text(&view), None);
    assert_eq!(view.phase(), Phase::Pending);
}

#[tokio::test]
async fn lone_player_fetches_no_opponents() {
    let mut view = view(FakeServer::with_game(GameState::pending(vec!["me"])));
    view.refresh().await;

    assert_eq!(view.api().take_calls(), vec!["game", "own"]);
    assert!(view.controls().waiting_for_opponents);
    assert_eq!(view.opponent_names().count(), 0);
}

#[tokio::test]
async fn placing_wind_at_b2_renders_two_cells() {
    let mut view = view(FakeServer::with_game(pending_two_player()));
    view.refresh().await;
    view.drain_updates();

    view.select_plant(PlantType::Wind);
    view.set_orientation(Orientation::Horizontal);
    view.place("B2");

    assert_eq!(view.notice(), None);
    let plant = &view.own_board().plants()[0];
    assert_eq!(
        plant.coordinates,
        vec![Coordinate::new(1, 1), Coordinate::new(1, 2)]
    );
    assert_eq!(view.own_board().capacity_label(), "Capacity: 100 / 100");

    let updates = view.drain_updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].board, BoardId::Own);
    assert_eq!(
        updates[0].mutations,
        vec![
            Mutation::Cell {
                coord: Coordinate::new(1, 1),
                visual: CellVisual::plant(PlantType::Wind, false),
            },
            Mutation::Cell {
                coord: Coordinate::new(1, 2),
                visual: CellVisual::plant(PlantType::Wind, false),
            },
            Mutation::Header("Capacity: 100 / 100".to_owned()),
        ]
    );
}

#[tokio::test]
async fn unsaved_placements_suppress_own_board_fetch() {
    let mut view = view(FakeServer::with_game(pending_two_player()));
    view.refresh().await;
    view.select_plant(PlantType::Gas);
    view.place("C3");
    view.api().take_calls();

    view.refresh().await;

    let calls = view.api().take_calls();
    assert!(!calls.contains(&"own".to_owned()), "{:?}", calls);
    assert!(calls.contains(&"opponent:them".to_owned()), "{:?}", calls);
    assert_eq!(view.own_board().plants().len(), 1);
    assert!(view.own_board().pending_local_edits());
}

#[tokio::test]
async fn placement_errors_become_notices() {
    let mut view = view(FakeServer::with_game(pending_two_player()));
    view.refresh().await;

    view.place("A1");
    assert_eq!(
        notice_text(&view),
        Some("Please select a power plant type first!")
    );

    view.select_plant(PlantType::Nuclear);
    view.place("J9");
    assert_eq!(notice_text(&view), Some("Plant does not fit on the board!"));

    view.place("A1");
    view.select_plant(PlantType::Solar);
    view.place("C3");
    assert_eq!(
        notice_text(&view),
        Some("Cannot place plant here. Space already occupied!")
    );
    assert_eq!(view.own_board().plants().len(), 1);
    assert_eq!(view.own_board().total_capacity(), 1000);
}

#[tokio::test]
async fn ready_saves_then_marks_ready() {
    let mut view = view(FakeServer::with_game(pending_two_player()));
    view.refresh().await;
    view.select_plant(PlantType::Nuclear);
    view.place("A1");
    view.api().take_calls();

    assert!(view.capacity_summary().can_ready());
    view.ready().await;

    let calls = view.api().take_calls();
    assert_eq!(&calls[..3], &["save", "ready", "game"]);
    assert!(calls.contains(&"own".to_owned()));
    assert!(!view.own_board().pending_local_edits());
    assert_eq!(view.notice().map(|n| n.kind()), Some(NoticeKind::Success));
    let controls = view.controls();
    assert!(!controls.setup);
    assert!(controls.waiting_for_ready);

    view.select_plant(PlantType::Solar);
    view.place("J10");
    assert_eq!(view.own_board().plants().len(), 1);
}

#[tokio::test]
async fn ready_refused_below_required_capacity() {
    let mut view = view(FakeServer::with_game(pending_two_player()));
    view.refresh().await;
    view.select_plant(PlantType::Wind);
    view.place("A1");
    view.api().take_calls();

    view.ready().await;

    assert!(view.api().take_calls().is_empty());
    assert_eq!(
        notice_text(&view),
        Some("Your board does not meet the capacity requirements!")
    );
    assert!(view.controls().setup);
}

#[tokio::test]
async fn ready_rejection_shows_server_detail() {
    let server = FakeServer::with_game(pending_two_player());
    *server.reject_ready.borrow_mut() = Some("BOARD_NOT_SET".to_owned());
    let mut view = view(server);
    view.refresh().await;
    view.select_plant(PlantType::Nuclear);
    view.place("A1");

    view.ready().await;

    assert_eq!(
        notice_text(&view),
        Some("Error marking player as ready: BOARD_NOT_SET")
    );
    assert!(view.controls().setup);
}

#[tokio::test]
async fn strike_out_of_turn_never_reaches_server() {
    let server = FakeServer::with_game(pending_two_player());
    server.set_status(GameStatus::InProgress, Some("them"));
    let mut view = view(server);
    view.refresh().await;
    view.api().take_calls();

    view.strike("them", "A1").await;

    assert!(view.api().take_calls().is_empty());
    assert_eq!(notice_text(&view), Some("It's not your turn to strike!"));
    assert_eq!(
        view.phase_notice().map(|n| n.kind()),
        Some(NoticeKind::Waiting)
    );
}

#[tokio::test]
async fn strike_on_turn_refreshes_afterwards() {
    let server = FakeServer::with_game(pending_two_player());
    server.set_status(GameStatus::InProgress, Some("me"));
    server.strike_outcome.set(Some(StrikeOutcome::Hit));
    let mut view = view(server);
    view.refresh().await;
    assert!(view.controls().strike);
    assert!(view.controls().your_turn);
    view.api().take_calls();

    view.strike("them", "B3").await;

    let calls = view.api().take_calls();
    assert_eq!(&calls[..2], &["strike:them:B3", "game"]);
    assert_eq!(
        notice_text(&view),
        Some("HIT! You struck them's power plant!")
    );
}

#[tokio::test]
async fn opponent_boards_hide_plants() {
    let server = FakeServer::with_game(pending_two_player());
    server.set_status(GameStatus::InProgress, Some("me"));
    server.opponents.borrow_mut().insert(
        "them".to_owned(),
        serde_json::from_value(serde_json::json!({
            "plants": [{"type": "GAS", "coordinates": ["", "", "", ""]}],
            "hits": ["A1"],
            "misses": ["C4"],
            "total_capacity": 300,
            "capacity": 150,
        }))
        .unwrap(),
    );
    let mut view = view(server);
    view.refresh().await;
    view.refresh().await;

    let board = view.opponent_board("them").unwrap();
    assert!(board.plants().is_empty());
    assert!(board.is_hit(&Coordinate::new(0, 0)));

    let updates = view.drain_updates();
    let theirs: Vec<_> = updates
        .iter()
        .filter(|update| update.board == BoardId::Opponent("them".to_owned()))
        .collect();
    assert_eq!(theirs.len(), 1, "second poll changes nothing");
    assert_eq!(
        theirs[0].mutations,
        vec![
            Mutation::Cell {
                coord: Coordinate::new(0, 0),
                visual: CellVisual::hit(),
            },
            Mutation::Cell {
                coord: Coordinate::new(2, 3),
                visual: CellVisual::miss(),
            },
            Mutation::Header("Capacity: 150 / 300".to_owned()),
        ]
    );
}

#[tokio::test]
async fn end_of_game_messages() {
    let server = FakeServer::with_game(pending_two_player());
    server.set_status(GameStatus::End, None);
    if let Some(state) = server.game.borrow_mut().as_mut() {
        state.winner = Some("me".to_owned());
    }
    let mut view = view(server);
    view.refresh().await;

    let controls = view.controls();
    assert!(!controls.strike && !controls.setup);
    assert_eq!(
        view.phase_notice().map(|n| n.text().to_owned()),
        Some("Congratulations! You won the game!".to_owned())
    );
    assert_eq!(view.status_lines()[2], "Winner: me");
}
