//! Parsing of the commands typed at the prompt.
use once_cell::sync::Lazy;
use regex::Regex;

use powergrid::plants::{Orientation, PlantType};

/// A command typed by the player.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Command {
    Select(PlantType),
    Orient(Orientation),
    Place {
        at: String,
        plant: Option<PlantType>,
        orientation: Option<Orientation>,
    },
    Random,
    Reset,
    Ready,
    Strike {
        target: String,
        at: String,
    },
    Refresh,
    Help,
    Quit,
}

pub const HELP: &str = "Available Commands:
    select <plant>                      choose the plant to place next.
    orient <dir>                        choose \"horizontal\" or \"vertical\" for wind plants.
    place <cell> [<plant>] [<dir>]      place a plant with its top-left corner at the cell, e.g. B2.
    random                              fill the rest of the board with random plants.
    reset                               remove every plant from your board.
    ready                               save your board and mark yourself ready.
    strike <opponent> <cell>            strike the opponent's board at the cell.
    refresh                             poll the server now.
    quit                                leave the game.

Available Plants:
    \"nuclear\" (\"n\")  3x3, 1000 capacity
    \"gas\" (\"g\")      2x2, 300 capacity
    \"wind\" (\"w\")     2x1, 100 capacity
    \"solar\" (\"s\")    1x1, 25 capacity";

fn plant(name: &str) -> Option<PlantType> {
    match name.to_ascii_lowercase().as_str() {
        "n" => Some(PlantType::Nuclear),
        "g" => Some(PlantType::Gas),
        "w" => Some(PlantType::Wind),
        "s" => Some(PlantType::Solar),
        other => other.parse().ok(),
    }
}

fn orientation(name: &str) -> Option<Orientation> {
    match name.to_ascii_lowercase().as_str() {
        "h" | "horizontal" | "across" | "right" => Some(Orientation::Horizontal),
        "v" | "vertical" | "down" => Some(Orientation::Vertical),
        _ => None,
    }
}

/// Parse one line of input. Errors are messages for the player.
pub fn parse(line: &str) -> Result<Command, String> {
    /// Matchers for commands with args. Opponent names keep their case.
    static SELECT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(?i)(?:select|use)\s+(?P<plant>\w+)$").unwrap());
    static ORIENT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(?i)(?:orient|rotate)\s+(?P<dir>\w+)$").unwrap());
    static PLACE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^(?ix)(?:place|put)\s+
        (?:(?:at|on)\s+)?
        (?P<at>[a-z][0-9]+)
        (?P<rest>(?:\s+\w+){0,2})$",
        )
        .unwrap()
    });
    static STRIKE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^(?ix)(?:strike|fire|shoot)\s+
        (?P<target>\S+)\s+
        (?:(?:at|on)\s+)?
        (?P<at>[a-z][0-9]+)$",
        )
        .unwrap()
    });

    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "?" | "help" | "h" => return Ok(Command::Help),
        "random" | "rand" | "randomize" => return Ok(Command::Random),
        "reset" | "clear" => return Ok(Command::Reset),
        "ready" | "done" => return Ok(Command::Ready),
        "refresh" | "r" | "" => return Ok(Command::Refresh),
        "quit" | "exit" | "q" => return Ok(Command::Quit),
        _ => {}
    }

    if let Some(captures) = SELECT.captures(line) {
        let name = &captures["plant"];
        plant(name)
            .map(Command::Select)
            .ok_or_else(|| format!("invalid plant: {}, choose \"nuclear\", \"gas\", \"wind\", or \"solar\"", name))
    } else if let Some(captures) = ORIENT.captures(line) {
        let name = &captures["dir"];
        orientation(name)
            .map(Command::Orient)
            .ok_or_else(|| format!("invalid direction {}, choose \"horizontal\" or \"vertical\"", name))
    } else if let Some(captures) = PLACE.captures(line) {
        let mut plant_choice = None;
        let mut orientation_choice = None;
        for word in captures["rest"].split_whitespace() {
            if let Some(found) = plant(word) {
                plant_choice = Some(found);
            } else if let Some(found) = orientation(word) {
                orientation_choice = Some(found);
            } else {
                return Err(format!("invalid plant or direction: {}", word));
            }
        }
        Ok(Command::Place {
            at: captures["at"].to_owned(),
            plant: plant_choice,
            orientation: orientation_choice,
        })
    } else if let Some(captures) = STRIKE.captures(line) {
        Ok(Command::Strike {
            target: captures["target"].to_owned(),
            at: captures["at"].to_owned(),
        })
    } else {
        Err(format!("Invalid command \"{}\". Use '?' for help", line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_with_optional_words() {
        assert_eq!(
            parse("place B2 wind vertical"),
            Ok(Command::Place {
                at: "B2".to_owned(),
                plant: Some(PlantType::Wind),
                orientation: Some(Orientation::Vertical),
            })
        );
        assert_eq!(
            parse("PUT at c10"),
            Ok(Command::Place {
                at: "c10".to_owned(),
                plant: None,
                orientation: None,
            })
        );
        assert!(parse("place B2 sideways").is_err());
    }

    #[test]
    fn strike_keeps_opponent_case() {
        assert_eq!(
            parse("Strike Alice at J10"),
            Ok(Command::Strike {
                target: "Alice".to_owned(),
                at: "J10".to_owned(),
            })
        );
    }

    #[test]
    fn select_and_orient() {
        assert_eq!(parse("select N"), Ok(Command::Select(PlantType::Nuclear)));
        assert_eq!(parse("use solar"), Ok(Command::Select(PlantType::Solar)));
        assert_eq!(
            parse("orient v"),
            Ok(Command::Orient(Orientation::Vertical))
        );
        assert!(parse("select coal").is_err());
    }
}
