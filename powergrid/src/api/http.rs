use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::{
    api::{ApiError, GameApi},
    board::{BoardSnapshot, SnapshotPlant},
    game::{GameState, StrikeOutcome, StrikeRequest},
};

/// [`GameApi`] over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
    game: String,
    player: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct SaveBoard<'a> {
    plants: &'a [SnapshotPlant],
}

#[derive(Deserialize)]
struct StrikeResult {
    result: StrikeOutcome,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
}

impl HttpApi {
    /// Create a client for `player` in `game` on the server at `base`. The token is sent
    /// with the player's own board fetch and with every request that changes the player's
    /// state.
    pub fn new(
        base: Url,
        game: impl Into<String>,
        player: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self, ApiError> {
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBase(base.to_string()));
        }
        Ok(Self {
            client: Client::new(),
            base,
            game: game.into(),
            player: player.into(),
            token,
        })
    }

    fn endpoint(&self, parts: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in `new`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(&["api", "games", self.game.as_str()])
                .extend(parts);
        }
        url
    }

    fn player_endpoint(&self, action: &str) -> Url {
        self.endpoint(&["players", self.player.as_str(), action])
    }

    /// Attach the player's token. The server checks it on every request that reads or
    /// changes the player's own state.
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.query(&[("token", token)]),
            None => request,
        }
    }

    fn game_request(&self) -> RequestBuilder {
        self.client.get(self.endpoint(&[]))
    }

    fn player_board_request(&self) -> RequestBuilder {
        self.authorized(self.client.get(self.player_endpoint("board")))
    }

    fn opponent_board_request(&self, opponent: &str) -> RequestBuilder {
        self.client.get(self.endpoint(&["opponent", opponent, "board"]))
    }

    fn save_board_request(&self, plants: &[SnapshotPlant]) -> RequestBuilder {
        self.authorized(
            self.client
                .post(self.player_endpoint("board"))
                .json(&SaveBoard { plants }),
        )
    }

    fn ready_request(&self) -> RequestBuilder {
        self.authorized(self.client.post(self.player_endpoint("ready")))
    }

    fn strike_request(&self, request: &StrikeRequest) -> Result<RequestBuilder, ApiError> {
        let pairs = request.query_pairs().map_err(|err| ApiError::Status {
            code: StatusCode::BAD_REQUEST.as_u16(),
            detail: err.to_string(),
        })?;
        Ok(self.authorized(self.client.post(self.player_endpoint("strike")).query(&pairs)))
    }
}

/// Read the body of a response, mapping error statuses to [`ApiError`].
async fn read_body(response: Response) -> Result<Vec<u8>, ApiError> {
    let status = response.status();
    let body = response.bytes().await?.to_vec();
    if status.is_success() {
        return Ok(body);
    }
    let detail = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .map(|body| body.error)
        .filter(|error| !error.is_empty())
        .unwrap_or_else(|| String::from_utf8_lossy(&body).trim().to_owned());
    if status == StatusCode::NOT_FOUND {
        Err(ApiError::NotFound(detail))
    } else {
        Err(ApiError::Status {
            code: status.as_u16(),
            detail,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = read_body(response).await?;
    Ok(serde_json::from_slice(&body)?)
}

impl GameApi for HttpApi {
    #[instrument(skip(self), fields(game = %self.game))]
    async fn game(&self) -> Result<GameState, ApiError> {
        let response = self.game_request().send().await?;
        decode(response).await
    }

    #[instrument(skip(self), fields(player = %self.player))]
    async fn player_board(&self) -> Result<BoardSnapshot, ApiError> {
        let response = self.player_board_request().send().await?;
        Ok(decode::<Option<BoardSnapshot>>(response)
            .await?
            .unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn opponent_board(&self, opponent: &str) -> Result<BoardSnapshot, ApiError> {
        let response = self.opponent_board_request(opponent).send().await?;
        Ok(decode::<Option<BoardSnapshot>>(response)
            .await?
            .unwrap_or_default())
    }

    #[instrument(skip(self, plants), fields(plants = plants.len()))]
    async fn save_board(&self, plants: &[SnapshotPlant]) -> Result<BoardSnapshot, ApiError> {
        let response = self.save_board_request(plants).send().await?;
        Ok(decode::<Option<BoardSnapshot>>(response)
            .await?
            .unwrap_or_default())
    }

    #[instrument(skip(self), fields(player = %self.player))]
    async fn ready(&self) -> Result<(), ApiError> {
        let response = self.ready_request().send().await?;
        read_body(response).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(target = request.target()))]
    async fn strike(&self, request: &StrikeRequest) -> Result<StrikeOutcome, ApiError> {
        let response = self.strike_request(request)?.send().await?;
        let StrikeResult { result } = decode(response).await?;
        debug!(?result, "strike answered");
        Ok(result)
    }
}
