//! The slice of the game server's HTTP API that the client consumes.
use thiserror::Error;

use crate::{
    board::{BoardSnapshot, SnapshotPlant},
    game::{FetchError, GameState, StrikeOutcome, StrikeRequest},
};

pub use self::http::HttpApi;

mod http;

/// Error from a request to the game server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 404.
    #[error("not found: {0}")]
    NotFound(String),
    /// The server answered with another error status.
    #[error("server answered {code}: {detail}")]
    Status { code: u16, detail: String },
    /// The request did not complete.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body was not what the server should send.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// The server address cannot have API paths appended to it.
    #[error("invalid server address {0:?}")]
    InvalidBase(String),
}

impl ApiError {
    /// Text to show the player: the server's own error detail where there is one.
    pub fn detail(&self) -> String {
        match self {
            ApiError::NotFound(detail) | ApiError::Status { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

impl From<ApiError> for FetchError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(_) => FetchError::NotFound,
            other => FetchError::Transient(other.to_string()),
        }
    }
}

/// Requests one player can make in one game.
///
/// Implementations are bound to a game and a player when they are created. Futures
/// returned by these methods only need to run on the current thread.
#[allow(async_fn_in_trait)]
pub trait GameApi {
    /// Fetch the game.
    async fn game(&self) -> Result<GameState, ApiError>;

    /// Fetch the player's own board. A board that was never set comes back empty.
    async fn player_board(&self) -> Result<BoardSnapshot, ApiError>;

    /// Fetch the redacted view of an opponent's board.
    async fn opponent_board(&self, opponent: &str) -> Result<BoardSnapshot, ApiError>;

    /// Save the player's plants. Returns the board as the server stored it.
    async fn save_board(&self, plants: &[SnapshotPlant]) -> Result<BoardSnapshot, ApiError>;

    /// Mark the player ready.
    async fn ready(&self) -> Result<(), ApiError>;

    /// Strike an opponent.
    async fn strike(&self, request: &StrikeRequest) -> Result<StrikeOutcome, ApiError>;
}
