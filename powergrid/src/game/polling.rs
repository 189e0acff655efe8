//! The state machine that follows a game by polling the server.
//!
//! Every poll hands the machine a fresh [`GameState`] (or a failure). The machine
//! replaces its state wholesale, works out which boards the poll should fetch, and at the
//! end of the poll makes sure exactly one timer is armed at the cadence the phase calls
//! for. A missing game stops the machine for good.
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::game::{FetchError, GameState, GameStatus, Scheduler};

/// Phase of the game as seen by the client.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Phase {
    /// No poll has succeeded yet.
    Loading,
    Pending,
    InProgress,
    End,
    /// The server does not know the game. Terminal.
    NotFound,
}

impl Phase {
    fn from_status(status: GameStatus) -> Self {
        match status {
            GameStatus::Pending => Phase::Pending,
            GameStatus::InProgress => Phase::InProgress,
            GameStatus::End => Phase::End,
        }
    }

    /// Whether the player can still change their board in this phase.
    pub fn allows_setup(self) -> bool {
        matches!(self, Phase::Loading | Phase::Pending)
    }
}

/// How often to poll.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Cadence {
    /// While players are still joining and placing plants.
    Slow,
    /// Once the game is running.
    Fast,
}

/// Durations of the two cadences.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PollIntervals {
    pub pending: Duration,
    pub active: Duration,
}

impl PollIntervals {
    /// Duration between polls at the given cadence.
    pub fn interval(&self, cadence: Cadence) -> Duration {
        match cadence {
            Cadence::Slow => self.pending,
            Cadence::Fast => self.active,
        }
    }
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            pending: Duration::from_millis(3000),
            active: Duration::from_millis(1000),
        }
    }
}

/// How a finished game ended for the local player.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EndState {
    Won,
    Lost,
}

/// Which parts of the game view should be visible.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Controls {
    /// Plant selection, orientation, reset and ready.
    pub setup: bool,
    /// Striking opponents.
    pub strike: bool,
    /// The player's own board and the opponent boards.
    pub boards: bool,
    /// Opponent boards specifically.
    pub opponents: bool,
    /// Fewer than two players have joined.
    pub waiting_for_opponents: bool,
    /// The player is ready and the game has not started.
    pub waiting_for_ready: bool,
    /// The game is running and it is the player's turn.
    pub your_turn: bool,
    /// End-of-game messaging.
    pub end: Option<EndState>,
    /// Link back to the game list, shown when the game is gone.
    pub home_link: bool,
}

/// What a successful poll should fetch next.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct PollPlan {
    /// Fetch the player's own board.
    pub fetch_own: bool,
    /// Opponents whose redacted boards should be fetched, in a stable order.
    pub opponents: Vec<String>,
    /// Fewer than two players are in the game.
    pub waiting_for_opponents: bool,
}

/// Polling state machine for one player in one game.
#[derive(Debug)]
pub struct PollingMachine<S: Scheduler> {
    player: String,
    phase: Phase,
    state: Option<GameState>,
    intervals: PollIntervals,
    scheduler: S,
    timer: Option<(Cadence, S::Handle)>,
    /// Set as soon as the ready request succeeds, before the next poll confirms it.
    ready: bool,
}

impl<S: Scheduler> PollingMachine<S> {
    /// Create a machine for `player` that has not polled yet and has no timer.
    pub fn new(player: impl Into<String>, intervals: PollIntervals, scheduler: S) -> Self {
        Self {
            player: player.into(),
            phase: Phase::Loading,
            state: None,
            intervals,
            scheduler,
            timer: None,
            ready: false,
        }
    }

    /// Arm the polling timer if none is armed. Does nothing once the game is gone.
    pub fn start(&mut self) {
        self.reschedule();
    }

    /// Take in the game state from a successful poll and plan the board fetches.
    ///
    /// `own_pending_edits` is whether the player's board has unsaved local placements;
    /// the own board is not fetched while it does.
    pub fn on_game_state(&mut self, state: GameState, own_pending_edits: bool) -> PollPlan {
        if self.is_stopped() {
            return PollPlan::default();
        }
        let phase = Phase::from_status(state.status);
        if phase != self.phase {
            info!(from = ?self.phase, to = ?phase, "game phase changed");
            self.phase = phase;
        }
        self.ready = state.is_ready(&self.player);

        let waiting_for_opponents = state.players.len() < 2;
        let opponents = if waiting_for_opponents {
            Vec::new()
        } else {
            state.opponents(&self.player).map(str::to_owned).collect()
        };
        let plan = PollPlan {
            fetch_own: !own_pending_edits,
            opponents,
            waiting_for_opponents,
        };
        debug!(?plan, "planned board fetches");
        self.state = Some(state);
        plan
    }

    /// Record a failed poll. A missing game stops polling for good; anything else keeps
    /// the previous state.
    pub fn on_poll_failed(&mut self, err: &FetchError) {
        match err {
            FetchError::NotFound => {
                error!(player = %self.player, "game not found, polling stopped");
                self.phase = Phase::NotFound;
                if let Some((_, handle)) = self.timer.take() {
                    self.scheduler.cancel(handle);
                }
            }
            FetchError::Transient(detail) => {
                warn!(%detail, "failed to fetch game");
            }
        }
    }

    /// Called at the end of every poll. Re-arms the timer when the cadence changed.
    pub fn finish_poll(&mut self) {
        self.reschedule();
    }

    fn reschedule(&mut self) {
        let wanted = match self.cadence() {
            Some(cadence) => cadence,
            None => return,
        };
        if let Some((armed, _)) = &self.timer {
            if *armed == wanted {
                return;
            }
        }
        if let Some((_, handle)) = self.timer.take() {
            self.scheduler.cancel(handle);
        }
        let every = self.intervals.interval(wanted);
        info!(cadence = ?wanted, ?every, "polling cadence set");
        self.timer = Some((wanted, self.scheduler.arm(every)));
    }

    /// The cadence the current phase calls for. `None` once the game is gone.
    pub fn cadence(&self) -> Option<Cadence> {
        match self.phase {
            Phase::Loading | Phase::Pending => Some(Cadence::Slow),
            Phase::InProgress | Phase::End => Some(Cadence::Fast),
            Phase::NotFound => None,
        }
    }

    /// Mark the player ready after the server accepted it, ahead of the next poll.
    pub fn note_ready(&mut self) {
        self.ready = true;
    }

    /// Whether the player is ready.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Visibility of the view's parts for the current phase, turn and readiness.
    pub fn controls(&self) -> Controls {
        let waiting_for_opponents = self
            .state
            .as_ref()
            .map_or(false, |state| state.players.len() < 2);
        match self.phase {
            Phase::Loading => Controls {
                setup: true,
                boards: true,
                ..Controls::default()
            },
            Phase::Pending if !self.ready => Controls {
                setup: true,
                boards: true,
                waiting_for_opponents,
                ..Controls::default()
            },
            Phase::Pending => Controls {
                boards: true,
                waiting_for_opponents,
                waiting_for_ready: true,
                ..Controls::default()
            },
            Phase::InProgress => Controls {
                strike: true,
                boards: true,
                opponents: true,
                your_turn: self.is_turn_of_player(),
                ..Controls::default()
            },
            Phase::End => {
                let won = self
                    .state
                    .as_ref()
                    .and_then(|state| state.winner.as_deref())
                    == Some(self.player.as_str());
                Controls {
                    boards: true,
                    opponents: true,
                    end: Some(if won { EndState::Won } else { EndState::Lost }),
                    ..Controls::default()
                }
            }
            Phase::NotFound => Controls {
                home_link: true,
                ..Controls::default()
            },
        }
    }

    fn is_turn_of_player(&self) -> bool {
        self.state
            .as_ref()
            .map_or(false, |state| state.is_turn_of(&self.player))
    }

    /// The local player's name.
    pub fn player(&self) -> &str {
        &self.player
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Game state from the last successful poll.
    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// The scheduler timers are armed on.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Whether polling has stopped for good.
    pub fn is_stopped(&self) -> bool {
        self.phase == Phase::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ManualScheduler, TimerEvent};

    fn machine() -> PollingMachine<ManualScheduler> {
        PollingMachine::new("me", PollIntervals::default(), ManualScheduler::new())
    }

    fn with_status(status: GameStatus, players: &[&str]) -> GameState {
        let mut state = GameState::pending(players.iter().copied());
        state.status = status;
        state
    }

    #[test]
    fn starts_slow() {
        let mut machine = machine();
        machine.start();
        machine.start();
        assert_eq!(machine.phase(), Phase::Loading);
        assert_eq!(
            machine.scheduler().history(),
            &[TimerEvent::Armed(0, Duration::from_secs(3))]
        );
    }

    #[test]
    fn lone_player_waits_for_opponents() {
        let mut machine = machine();
        let plan = machine.on_game_state(with_status(GameStatus::Pending, &["me"]), false);
        assert!(plan.waiting_for_opponents);
        assert!(plan.opponents.is_empty());
        assert!(plan.fetch_own);
        assert!(machine.controls().waiting_for_opponents);
    }

    #[test]
    fn pending_edits_skip_own_board() {
        let mut machine = machine();
        let plan = machine.on_game_state(with_status(GameStatus::Pending, &["me", "b", "a"]), true);
        assert!(!plan.fetch_own);
        assert_eq!(plan.opponents, vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn cadence_switches_once() {
        let mut machine = machine();
        machine.start();
        machine.on_game_state(with_status(GameStatus::Pending, &["me", "them"]), false);
        machine.finish_poll();
        machine.on_game_state(with_status(GameStatus::InProgress, &["me", "them"]), false);
        machine.finish_poll();
        machine.on_game_state(with_status(GameStatus::InProgress, &["me", "them"]), false);
        machine.finish_poll();
        assert_eq!(
            machine.scheduler().history(),
            &[
                TimerEvent::Armed(0, Duration::from_secs(3)),
                TimerEvent::Cancelled(0),
                TimerEvent::Armed(1, Duration::from_secs(1)),
            ]
        );
        assert_eq!(machine.scheduler().live().len(), 1);
    }

    #[test]
    fn not_found_is_terminal() {
        let mut machine = machine();
        machine.start();
        machine.on_poll_failed(&FetchError::NotFound);
        machine.finish_poll();
        machine.start();
        assert!(machine.is_stopped());
        assert!(machine.scheduler().live().is_empty());
        assert_eq!(
            machine.on_game_state(with_status(GameStatus::Pending, &["me"]), false),
            PollPlan::default()
        );
        assert_eq!(machine.phase(), Phase::NotFound);
        let controls = machine.controls();
        assert!(controls.home_link);
        assert!(!controls.setup && !controls.boards);
    }

    #[test]
    fn transient_failure_keeps_state() {
        let mut machine = machine();
        machine.on_game_state(with_status(GameStatus::InProgress, &["me", "them"]), false);
        machine.on_poll_failed(&FetchError::Transient("timeout".into()));
        assert_eq!(machine.phase(), Phase::InProgress);
        assert!(machine.state().is_some());
    }

    #[test]
    fn controls_follow_phase_and_turn() {
        let mut machine = machine();
        assert!(machine.controls().setup);

        let mut state = with_status(GameStatus::Pending, &["me", "them"]);
        machine.on_game_state(state.clone(), false);
        let controls = machine.controls();
        assert!(controls.setup && !controls.strike && !controls.opponents);

        state.players.get_mut("me").unwrap().ready = true;
        machine.on_game_state(state.clone(), false);
        let controls = machine.controls();
        assert!(!controls.setup && controls.waiting_for_ready);

        state.status = GameStatus::InProgress;
        state.turn = Some("me".into());
        machine.on_game_state(state.clone(), false);
        let controls = machine.controls();
        assert!(controls.strike && controls.your_turn && !controls.setup);

        state.turn = Some("them".into());
        machine.on_game_state(state.clone(), false);
        assert!(!machine.controls().your_turn);

        state.status = GameStatus::End;
        state.winner = Some("them".into());
        machine.on_game_state(state.clone(), false);
        let controls = machine.controls();
        assert_eq!(controls.end, Some(EndState::Lost));
        assert!(!controls.strike && !controls.setup);

        state.winner = Some("me".into());
        machine.on_game_state(state, false);
        assert_eq!(machine.controls().end, Some(EndState::Won));
    }

    #[test]
    fn ready_hides_setup_before_next_poll() {
        let mut machine = machine();
        machine.on_game_state(with_status(GameStatus::Pending, &["me", "them"]), false);
        machine.note_ready();
        assert!(!machine.controls().setup);
        assert!(machine.controls().waiting_for_ready);
    }
}
