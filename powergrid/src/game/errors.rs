//! Errors raised while following a game.

use std::fmt::{self, Debug};

use thiserror::Error;

/// How a failed poll is treated by the polling machine.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum FetchError {
    /// The game does not exist. Polling stops for good.
    #[error("Game not found. Please check the game ID and try again.")]
    NotFound,
    /// Anything else. The previous state is kept and polling carries on.
    #[error("Error fetching game data. Please try again.")]
    Transient(String),
}

/// The server request that a [`SubmissionError`] came from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SubmitAction {
    SaveBoard,
    Ready,
    Strike,
}

impl SubmitAction {
    /// Text shown in front of the server's detail.
    fn prefix(self) -> &'static str {
        match self {
            SubmitAction::SaveBoard => "Error saving board",
            SubmitAction::Ready => "Error marking player as ready",
            SubmitAction::Strike => "Error striking opponent",
        }
    }
}

/// The server rejected something the player submitted.
#[derive(Error, Clone, Eq, PartialEq)]
#[error("{}: {detail}", action.prefix())]
pub struct SubmissionError {
    action: SubmitAction,
    detail: String,
}

impl Debug for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl SubmissionError {
    /// Wrap the detail reported for a failed request.
    pub fn new(action: SubmitAction, detail: impl Into<String>) -> Self {
        Self {
            action,
            detail: detail.into(),
        }
    }

    /// The request that failed.
    pub fn action(&self) -> SubmitAction {
        self.action
    }

    /// What the server said.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// A strike refused before anything was sent.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum StrikeRejected {
    /// The game is not in progress or another player has the turn.
    #[error("It's not your turn to strike!")]
    NotYourTurn,
    /// The target is not an opponent in this game.
    #[error("{0} is not an opponent in this game")]
    UnknownTarget(String),
}
