//! Parses the control lines the human player types.

use labyrinth_core::{Direction, ParseWeaponError, Turn, Use, Weapon};
use thiserror::Error;

/// Errors produced for malformed control lines.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum ParseTurnError {
    /// `move` appeared without a direction behind it.
    #[error("`move` needs a direction (up, right, down, left)")]
    MissingDirection,
    /// `use` appeared without a weapon behind it.
    #[error("`use` needs a weapon (gun, knife, grenade)")]
    MissingWeapon,
    /// A word in direction position was not a direction.
    #[error("\"{0}\" is not a direction")]
    UnknownDirection(String),
    /// A word in weapon position was not a weapon.
    #[error(transparent)]
    UnknownWeapon(#[from] ParseWeaponError),
    /// A word that fits nowhere in the grammar.
    #[error("\"{0}\" is not part of a turn")]
    UnexpectedWord(String),
}

/// Parses one line into a turn.
///
/// Grammar: any mix of `move <direction>` and `use <weapon> [direction]`,
/// or `pass`. An empty line passes too. Unknown weapon words are hard
/// errors; a missing aim for gun or grenade is fine — the resolver
/// substitutes one at random and says so.
pub(crate) fn parse_turn(line: &str) -> Result<Turn, ParseTurnError> {
    let mut words = line.split_whitespace().peekable();
    let mut movement = None;
    let mut action = None;

    while let Some(word) = words.next() {
        match word {
            "pass" | "wait" => {}
            "move" => {
                let direction = words.next().ok_or(ParseTurnError::MissingDirection)?;
                movement = Some(parse_direction(direction)?);
            }
            "use" => {
                let weapon: Weapon = words.next().ok_or(ParseTurnError::MissingWeapon)?.parse()?;
                let aim = match words.peek() {
                    Some(&word) if as_direction(word).is_some() => {
                        let consumed = words.next().expect("peeked word is present");
                        as_direction(consumed)
                    }
                    _ => None,
                };
                action = Some(Use::new(weapon, aim));
            }
            other => return Err(ParseTurnError::UnexpectedWord(other.to_owned())),
        }
    }

    Ok(Turn::new(movement, action))
}

fn parse_direction(word: &str) -> Result<Direction, ParseTurnError> {
    as_direction(word).ok_or_else(|| ParseTurnError::UnknownDirection(word.to_owned()))
}

fn as_direction(word: &str) -> Option<Direction> {
    match word {
        "up" => Some(Direction::Up),
        "right" => Some(Direction::Right),
        "down" => Some(Direction::Down),
        "left" => Some(Direction::Left),
        _ => None,
    }
}
