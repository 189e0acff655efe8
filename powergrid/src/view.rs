//! One player's view of one game.
//!
//! [`GameView`] owns everything a game page needs: the player's board and one board per
//! opponent, the reconciler snapshots for those boards, the polling machine, the plant
//! the player is about to place and the notice currently shown. Operations that talk to
//! the server are async and take `&mut self`, so a view is driven from one task at a
//! time.
//!
//! Nothing here draws anything. Rendering happens by draining [`BoardUpdate`]s and
//! applying their mutations to whatever [`Surface`][crate::render::Surface] shows each
//! board.
use std::{collections::BTreeMap, fmt, ops::RangeInclusive};

use futures_util::future::{join, join_all};
use tracing::{debug, info, instrument, warn};

use crate::{
    api::{ApiError, GameApi},
    board::{
        capacity_window, check_ready, BoardModel, BoardSize, BoardSnapshot, CannotPlaceReason,
    },
    game::{
        state::DEFAULT_REQUIRED_CAPACITY, strike, Controls, EndState, FetchError, Phase,
        PollIntervals, PollPlan, PollingMachine, Scheduler, SubmissionError, SubmitAction,
    },
    plants::{Orientation, PlantType},
    render::{BoardId, Mutation, Reconciler},
};

/// How a notice should be presented.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum NoticeKind {
    Success,
    /// Something is expected to happen without the player doing anything.
    Waiting,
    Error,
}

/// A message for the player.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Notice {
    kind: NoticeKind,
    text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, text)
    }

    pub fn waiting(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Waiting, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, text)
    }

    fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// How to present the notice.
    pub fn kind(&self) -> NoticeKind {
        self.kind
    }

    /// The message.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Mutations to apply to one board's surface.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BoardUpdate {
    pub board: BoardId,
    pub mutations: Vec<Mutation>,
}

/// The player's capacity against what the game requires.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CapacitySummary {
    /// Total capacity of the plants on the player's board.
    pub current: i64,
    /// Capacity the game requires.
    pub required: i64,
}

impl CapacitySummary {
    /// Totals that allow the player to go ready.
    pub fn window(&self) -> RangeInclusive<i64> {
        capacity_window(self.required)
    }

    /// Whether the current total allows the player to go ready.
    pub fn can_ready(&self) -> bool {
        check_ready(self.current, self.required).is_ok()
    }
}

impl fmt::Display for CapacitySummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let window = self.window();
        write!(
            f,
            "Current Capacity: {} (Required: {} to {})",
            self.current,
            window.start(),
            window.end()
        )
    }
}

/// Context for one player following one game.
pub struct GameView<A: GameApi, S: Scheduler> {
    api: A,
    machine: PollingMachine<S>,
    own: BoardModel,
    /// Created the first time an opponent shows up and kept from then on.
    opponents: BTreeMap<String, BoardModel>,
    reconciler: Reconciler,
    updates: Vec<BoardUpdate>,
    selected: Option<PlantType>,
    orientation: Orientation,
    notice: Option<Notice>,
    /// Error from the last poll. Cleared by the next successful one.
    poll_error: Option<Notice>,
}

impl<A: GameApi, S: Scheduler> GameView<A, S> {
    /// Create a view that has not polled yet. Call [`start`][Self::start] to arm the
    /// polling timer and [`refresh`][Self::refresh] on every tick.
    pub fn new(api: A, player: impl Into<String>, intervals: PollIntervals, scheduler: S) -> Self {
        Self {
            api,
            machine: PollingMachine::new(player, intervals, scheduler),
            own: BoardModel::new(),
            opponents: BTreeMap::new(),
            reconciler: Reconciler::new(),
            updates: Vec::new(),
            selected: None,
            orientation: Orientation::default(),
            notice: None,
            poll_error: None,
        }
    }

    /// Arm the polling timer.
    pub fn start(&mut self) {
        self.machine.start();
    }

    /// Run one poll: fetch the game, then the boards it calls for, then re-arm the timer
    /// if the cadence changed. Does nothing once the game is gone.
    #[instrument(skip(self), fields(player = self.machine.player()))]
    pub async fn refresh(&mut self) {
        if self.machine.is_stopped() {
            return;
        }
        match self.api.game().await {
            Ok(state) => {
                self.poll_error = None;
                let plan = self
                    .machine
                    .on_game_state(state, self.own.pending_local_edits());
                self.fetch_boards(&plan).await;
            }
            Err(err) => {
                let err = FetchError::from(err);
                self.machine.on_poll_failed(&err);
                self.poll_error = Some(Notice::error(err.to_string()));
            }
        }
        self.machine.finish_poll();
    }

    async fn fetch_boards(&mut self, plan: &PollPlan) {
        let api = &self.api;
        let own = async {
            if plan.fetch_own {
                Some(api.player_board().await)
            } else {
                None
            }
        };
        let opponents = join_all(
            plan.opponents
                .iter()
                .map(|name| async move { (name, api.opponent_board(name).await) }),
        );
        let (own, opponents) = join(own, opponents).await;

        if let Some(result) = own {
            self.apply_own(result);
        }
        for (name, result) in opponents {
            self.apply_opponent(name, result);
        }
    }

    fn apply_own(&mut self, result: Result<BoardSnapshot, ApiError>) {
        match result {
            Ok(snapshot) if !self.own.pending_local_edits() => {
                self.own.apply_server_snapshot(snapshot)
            }
            Ok(_) => debug!("own board has unsaved placements, server copy ignored"),
            Err(ApiError::NotFound(_)) => debug!("own board not set yet"),
            Err(err) => warn!(%err, "failed to fetch own board"),
        }
        self.render(BoardId::Own);
    }

    fn apply_opponent(&mut self, name: &str, result: Result<BoardSnapshot, ApiError>) {
        let board = self.opponents.entry(name.to_owned()).or_default();
        match result {
            Ok(snapshot) => board.apply_opponent_snapshot(snapshot),
            Err(err) => warn!(opponent = name, %err, "failed to fetch opponent board"),
        }
        self.render(BoardId::Opponent(name.to_owned()));
    }

    fn render(&mut self, id: BoardId) {
        let (board, show_plants) = match &id {
            BoardId::Own => (&self.own, true),
            BoardId::Opponent(name) => match self.opponents.get(name) {
                Some(board) => (board, false),
                None => return,
            },
        };
        let mutations = self.reconciler.reconcile(&id, board, show_plants);
        if !mutations.is_empty() {
            self.updates.push(BoardUpdate {
                board: id,
                mutations,
            });
        }
    }

    /// Choose the plant type the next [`place`][Self::place] puts down.
    pub fn select_plant(&mut self, plant: PlantType) {
        self.selected = Some(plant);
    }

    /// Choose the orientation the next [`place`][Self::place] uses.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    fn can_edit(&mut self) -> bool {
        if self.machine.phase().allows_setup() && !self.machine.is_ready() {
            true
        } else {
            self.notice = Some(Notice::error("Your board can no longer be changed."));
            false
        }
    }

    /// Place the selected plant with its top-left cell at `label`. Only allowed while
    /// the game is pending and the player is not ready. The placement is local until
    /// [`ready`][Self::ready] saves it.
    pub fn place(&mut self, label: &str) {
        if !self.can_edit() {
            return;
        }
        let plant = match self.selected {
            Some(plant) => plant,
            None => {
                self.notice = Some(Notice::error("Please select a power plant type first!"));
                return;
            }
        };
        let size = self.board_size();
        let anchor = match size.parse(label) {
            Ok(anchor) => anchor,
            Err(err) => {
                self.notice = Some(Notice::error(err.to_string()));
                return;
            }
        };
        match self.own.try_place(size, plant, anchor, self.orientation) {
            Ok(placed) => {
                debug!(plant = %placed.plant_type, %anchor, "placed plant locally");
                self.notice = None;
                self.render(BoardId::Own);
            }
            Err(err) => {
                let text = match err.reason() {
                    CannotPlaceReason::OutOfBounds => "Plant does not fit on the board!",
                    CannotPlaceReason::AlreadyOccupied => {
                        "Cannot place plant here. Space already occupied!"
                    }
                };
                debug!(%err, "placement rejected");
                self.notice = Some(Notice::error(text));
            }
        }
    }

    /// Fill the player's board with random plants until its capacity allows going
    /// ready. Plants already placed are kept.
    #[cfg(feature = "rng_gen")]
    pub fn place_random<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        if !self.can_edit() {
            return;
        }
        let size = self.board_size();
        let required = self.required_capacity();
        let result = crate::board::setup::random_layout(rng, &mut self.own, size, required);
        self.render(BoardId::Own);
        self.notice = match result {
            Ok(()) => None,
            Err(err) => Some(Notice::error(format!("Could not fill the board: {}", err))),
        };
    }

    /// Remove every plant from the player's board.
    pub fn reset_board(&mut self) {
        if !self.can_edit() {
            return;
        }
        self.own.reset();
        self.notice = None;
        self.render(BoardId::Own);
    }

    /// Save the board and mark the player ready, then refresh.
    ///
    /// Refused locally when the board's capacity is outside the ready window. Server
    /// rejections are shown as error notices and leave the player not ready.
    #[instrument(skip(self), fields(player = self.machine.player()))]
    pub async fn ready(&mut self) {
        if !self.can_edit() {
            return;
        }
        if let Err(err) = check_ready(self.own.total_capacity(), self.required_capacity()) {
            debug!(%err, "ready refused");
            self.notice = Some(Notice::error(
                "Your board does not meet the capacity requirements!",
            ));
            return;
        }

        match self.api.save_board(&self.own.to_submission()).await {
            Ok(snapshot) => {
                info!(plants = snapshot.plants.len(), "board saved");
                self.own.apply_server_snapshot(snapshot);
                self.render(BoardId::Own);
            }
            Err(err) => {
                let err = SubmissionError::new(SubmitAction::SaveBoard, err.detail());
                warn!(%err, "save rejected");
                self.notice = Some(Notice::error(err.to_string()));
                return;
            }
        }

        if let Err(err) = self.api.ready().await {
            let err = SubmissionError::new(SubmitAction::Ready, err.detail());
            warn!(%err, "ready rejected");
            self.notice = Some(Notice::error(err.to_string()));
            return;
        }
        info!("player ready");
        self.machine.note_ready();
        self.notice = Some(Notice::success(
            "You are ready! Waiting for other players to be ready...",
        ));
        self.refresh().await;
    }

    /// Strike `target` at `label`. Refused locally unless the game is in progress and
    /// it is the player's turn. A strike that was sent is always followed by a refresh.
    #[instrument(skip(self), fields(player = self.machine.player()))]
    pub async fn strike(&mut self, target: &str, label: &str) {
        let coordinate = match self.board_size().parse(label) {
            Ok(coordinate) => coordinate,
            Err(err) => {
                self.notice = Some(Notice::error(err.to_string()));
                return;
            }
        };
        let request = match strike::authorize(
            self.machine.state(),
            self.machine.player(),
            target,
            coordinate,
        ) {
            Ok(request) => request,
            Err(err) => {
                debug!(%err, "strike refused");
                self.notice = Some(Notice::error(err.to_string()));
                return;
            }
        };

        self.notice = Some(match self.api.strike(&request).await {
            Ok(outcome) => {
                info!(opponent = target, %coordinate, ?outcome, "strike landed");
                Notice::success(outcome.message(target))
            }
            Err(err) => {
                let err = SubmissionError::new(SubmitAction::Strike, err.detail());
                warn!(%err, "strike rejected");
                Notice::error(err.to_string())
            }
        });
        self.refresh().await;
    }

    /// Take the board mutations produced since the last call, oldest first.
    pub fn drain_updates(&mut self) -> Vec<BoardUpdate> {
        std::mem::take(&mut self.updates)
    }

    /// Which parts of the view should be visible.
    pub fn controls(&self) -> Controls {
        self.machine.controls()
    }

    /// The message to show: an error from the last poll, otherwise the message left by
    /// the last operation.
    pub fn notice(&self) -> Option<&Notice> {
        self.poll_error.as_ref().or(self.notice.as_ref())
    }

    /// Standing message for the current phase and turn.
    pub fn phase_notice(&self) -> Option<Notice> {
        let controls = self.controls();
        if controls.home_link {
            return Some(Notice::error(FetchError::NotFound.to_string()));
        }
        match controls.end {
            Some(EndState::Won) => {
                return Some(Notice::success("Congratulations! You won the game!"))
            }
            Some(EndState::Lost) => return Some(Notice::error("Game over. You lost the game.")),
            None => {}
        }
        if controls.strike {
            Some(if controls.your_turn {
                Notice::success("It's your turn! Click on the opponent's board to strike.")
            } else {
                Notice::waiting("Waiting for opponent's move...")
            })
        } else if controls.waiting_for_ready {
            Some(Notice::success(
                "You are ready! Waiting for other players to be ready...",
            ))
        } else if controls.waiting_for_opponents {
            Some(Notice::waiting("No opponents have joined yet."))
        } else {
            None
        }
    }

    /// Status, turn, winner and one line per player.
    pub fn status_lines(&self) -> Vec<String> {
        let state = match self.machine.state() {
            Some(state) => state,
            None => return vec!["Status: LOADING".to_owned()],
        };
        let mut lines = vec![
            format!("Status: {}", state.status),
            format!("Turn: {}", state.turn.as_deref().unwrap_or("N/A")),
            format!("Winner: {}", state.winner.as_deref().unwrap_or("None")),
        ];
        for (name, info) in &state.players {
            let you = if name == self.machine.player() {
                " (You)"
            } else {
                ""
            };
            let ready = if info.ready { "Ready" } else { "Not Ready" };
            lines.push(format!(
                "{}{} - {} (Capacity: {}/{})",
                name, you, ready, info.capacity, info.total_capacity
            ));
        }
        lines
    }

    /// The player's capacity against the requirement.
    pub fn capacity_summary(&self) -> CapacitySummary {
        CapacitySummary {
            current: self.own.total_capacity(),
            required: self.required_capacity(),
        }
    }

    fn required_capacity(&self) -> i64 {
        self.machine
            .state()
            .map_or(DEFAULT_REQUIRED_CAPACITY, |state| state.required_capacity())
    }

    /// Size of the boards in this game.
    pub fn board_size(&self) -> BoardSize {
        self.machine
            .state()
            .map(|state| state.board_size())
            .unwrap_or_default()
    }

    /// The local player's name.
    pub fn player(&self) -> &str {
        self.machine.player()
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn machine(&self) -> &PollingMachine<S> {
        &self.machine
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// The player's own board.
    pub fn own_board(&self) -> &BoardModel {
        &self.own
    }

    /// The board of the named opponent, once it has been fetched.
    pub fn opponent_board(&self, name: &str) -> Option<&BoardModel> {
        self.opponents.get(name)
    }

    /// Opponents with a board, in a stable order.
    pub fn opponent_names(&self) -> impl Iterator<Item = &str> {
        self.opponents.keys().map(String::as_str)
    }

    /// The plant type that the next placement uses.
    pub fn selected_plant(&self) -> Option<PlantType> {
        self.selected
    }

    /// The orientation that the next placement uses.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}
