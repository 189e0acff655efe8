//! Game data reported by the server.
use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Deserializer, Serialize};

use crate::board::BoardSize;

/// Capacity required when the server does not say.
pub const DEFAULT_REQUIRED_CAPACITY: i64 = 1000;

/// Overall status of a game.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// Players are joining and placing plants.
    Pending,
    /// Players are taking turns striking.
    InProgress,
    /// A winner has been decided. No more turns.
    End,
}

impl GameStatus {
    /// Name of the status as the server spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Pending => "PENDING",
            GameStatus::InProgress => "IN_PROGRESS",
            GameStatus::End => "END",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What every player can see about another player.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub total_capacity: i64,
    #[serde(default)]
    pub capacity: i64,
}

/// One poll's worth of game data. Replaced wholesale on every poll.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default)]
    pub id: String,
    pub status: GameStatus,
    /// Player whose turn it is. The server reports "no one" as an empty string.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub turn: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub winner: Option<String>,
    /// Players by name. Ordered so that opponents keep their positions between polls.
    #[serde(default, deserialize_with = "null_as_default")]
    pub players: BTreeMap<String, PlayerInfo>,
    /// Side length of every board. 0 when the server leaves it out.
    #[serde(default)]
    pub size: usize,
    /// Capacity each player must reach. 0 when the server leaves it out.
    #[serde(default)]
    pub capacity: i64,
    #[serde(default)]
    pub public: bool,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|name| !name.is_empty()))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl GameState {
    /// A pending game with the given players, none of them ready.
    pub fn pending<'a>(players: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            id: String::new(),
            status: GameStatus::Pending,
            turn: None,
            winner: None,
            players: players
                .into_iter()
                .map(|name| (name.to_owned(), PlayerInfo::default()))
                .collect(),
            size: 0,
            capacity: 0,
            public: false,
        }
    }

    /// Size of the boards in this game, falling back to 10x10.
    pub fn board_size(&self) -> BoardSize {
        BoardSize::try_new(self.size).unwrap_or_default()
    }

    /// Capacity each player must reach before going ready.
    pub fn required_capacity(&self) -> i64 {
        if self.capacity > 0 {
            self.capacity
        } else {
            DEFAULT_REQUIRED_CAPACITY
        }
    }

    /// Get the info of the named player.
    pub fn player(&self, name: &str) -> Option<&PlayerInfo> {
        self.players.get(name)
    }

    /// Whether the named player has gone ready.
    pub fn is_ready(&self, name: &str) -> bool {
        self.player(name).map_or(false, |info| info.ready)
    }

    /// Names of every player other than `me`, in a stable order.
    pub fn opponents<'a>(&'a self, me: &'a str) -> impl Iterator<Item = &'a str> {
        self.players
            .keys()
            .map(String::as_str)
            .filter(move |name| *name != me)
    }

    /// Whether it is the named player's turn to strike.
    pub fn is_turn_of(&self, name: &str) -> bool {
        self.status == GameStatus::InProgress && self.turn.as_deref() == Some(name)
    }
}
