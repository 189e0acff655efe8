//! The game as the client follows it. This is split into different modules by concern.
//!
//! [`state`] holds the game data the server reports on every poll.
//!
//! [`polling`] provides the state machine that consumes those polls: it tracks the
//! phase of the game, decides which boards to fetch and which controls to show, and
//! keeps exactly one refresh timer armed at the cadence the phase calls for.
//!
//! [`scheduler`] is the seam between that machine and whatever provides timers.
//!
//! [`strike`] gates and builds strikes against opponents.

pub use self::{
    errors::{FetchError, StrikeRejected, SubmissionError, SubmitAction},
    polling::{Cadence, Controls, EndState, Phase, PollIntervals, PollPlan, PollingMachine},
    scheduler::{ManualScheduler, Scheduler, Tick, TimerEvent, TimerHandle, TokioScheduler},
    state::{GameState, GameStatus, PlayerInfo},
    strike::{StrikeOutcome, StrikeRequest},
};

mod errors;
pub mod polling;
pub mod scheduler;
pub mod state;
pub mod strike;
