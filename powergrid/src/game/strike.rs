//! Strikes against opponents.
use serde::{Deserialize, Serialize};

use crate::{
    board::{Coordinate, CoordinateError},
    game::{GameState, StrikeRejected},
};

/// What the server reports after a strike.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StrikeOutcome {
    Hit,
    Miss,
}

impl StrikeOutcome {
    /// Message shown to the striking player.
    pub fn message(self, target: &str) -> String {
        match self {
            StrikeOutcome::Hit => format!("HIT! You struck {}'s power plant!", target),
            StrikeOutcome::Miss => {
                format!("MISS! You didn't hit anything on {}'s board.", target)
            }
        }
    }
}

/// A strike that passed the local checks and can be sent.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct StrikeRequest {
    target: String,
    coordinate: Coordinate,
}

impl StrikeRequest {
    /// The opponent being struck.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The cell being struck.
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Query parameters of the strike request: the target, the row letter as `y` and
    /// the 1-based column as `x`.
    pub fn query_pairs(&self) -> Result<[(&'static str, String); 3], CoordinateError> {
        Ok([
            ("target", self.target.clone()),
            ("y", self.coordinate.row_letter()?.to_string()),
            ("x", self.coordinate.column_number().to_string()),
        ])
    }
}

/// Check that `player` may strike `target` at `coordinate` right now.
///
/// Only allowed while the game is in progress and it is `player`'s turn. Nothing is
/// sent for a rejected strike.
pub fn authorize(
    state: Option<&GameState>,
    player: &str,
    target: &str,
    coordinate: Coordinate,
) -> Result<StrikeRequest, StrikeRejected> {
    let state = match state {
        Some(state) if state.is_turn_of(player) => state,
        _ => return Err(StrikeRejected::NotYourTurn),
    };
    if target == player || state.player(target).is_none() {
        return Err(StrikeRejected::UnknownTarget(target.to_owned()));
    }
    Ok(StrikeRequest {
        target: target.to_owned(),
        coordinate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameStatus;

    fn in_progress(turn: &str) -> GameState {
        let mut state = GameState::pending(vec!["me", "them"]);
        state.status = GameStatus::InProgress;
        state.turn = Some(turn.to_owned());
        state
    }

    #[test]
    fn strike_on_own_turn() {
        let state = in_progress("me");
        let request = authorize(Some(&state), "me", "them", Coordinate::new(1, 2)).unwrap();
        let pairs = request.query_pairs().unwrap();
        assert_eq!(pairs[0], ("target", "them".to_owned()));
        assert_eq!(pairs[1], ("y", "B".to_owned()));
        assert_eq!(pairs[2], ("x", "3".to_owned()));
    }

    #[test]
    fn strike_rejected_off_turn() {
        let state = in_progress("them");
        assert_eq!(
            authorize(Some(&state), "me", "them", Coordinate::new(0, 0)),
            Err(StrikeRejected::NotYourTurn)
        );
        assert_eq!(
            authorize(None, "me", "them", Coordinate::new(0, 0)),
            Err(StrikeRejected::NotYourTurn)
        );

        let mut pending = in_progress("me");
        pending.status = GameStatus::Pending;
        assert_eq!(
            authorize(Some(&pending), "me", "them", Coordinate::new(0, 0)),
            Err(StrikeRejected::NotYourTurn)
        );
    }

    #[test]
    fn strike_rejects_unknown_target() {
        let state = in_progress("me");
        assert_eq!(
            authorize(Some(&state), "me", "nobody", Coordinate::new(0, 0)),
            Err(StrikeRejected::UnknownTarget("nobody".to_owned()))
        );
        assert_eq!(
            authorize(Some(&state), "me", "me", Coordinate::new(0, 0)),
            Err(StrikeRejected::UnknownTarget("me".to_owned()))
        );
    }

    #[test]
    fn outcome_wording() {
        assert_eq!(
            StrikeOutcome::Hit.message("them"),
            "HIT! You struck them's power plant!"
        );
        let outcome: StrikeOutcome = serde_json::from_str("\"MISS\"").unwrap();
        assert_eq!(
            outcome.message("them"),
            "MISS! You didn't hit anything on them's board."
        );
    }
}
