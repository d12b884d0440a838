#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the labyrinth engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The turn engine submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values that double
//! as the human-readable narration stream. Everything here is vocabulary;
//! behavior lives in the world and system crates.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when a game begins.
pub const WELCOME_BANNER: &str = "Welcome to the labyrinth.";

/// Cardinal movement directions through the maze.
///
/// The vertical axis grows downward, so [`Direction::Up`] decreases `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing `y`.
    Up,
    /// Movement toward increasing `x`.
    Right,
    /// Movement toward increasing `y`.
    Down,
    /// Movement toward decreasing `x`.
    Left,
}

impl Direction {
    /// Every direction in wall-slot order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Wall-slot index of the direction.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    /// The direction pointing back the way this one came.
    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Steps one cell in this direction, or `None` when that would leave the
    /// non-negative coordinate plane. Upper bounds are the grid's concern.
    #[must_use]
    pub fn offset(self, from: CellCoord) -> Option<CellCoord> {
        match self {
            Direction::Up => from.y().checked_sub(1).map(|y| CellCoord::new(from.x(), y)),
            Direction::Right => Some(CellCoord::new(from.x() + 1, from.y())),
            Direction::Down => Some(CellCoord::new(from.x(), from.y() + 1)),
            Direction::Left => from.x().checked_sub(1).map(|x| CellCoord::new(x, from.y())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        };
        f.write_str(word)
    }
}

/// Location of a single maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the cell, growing rightward.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the cell, growing downward.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// State of one side of a cell edge.
///
/// A shared edge always carries the same value on both adjacent cells; world
/// mutations keep the two sides synchronized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallKind {
    /// No wall; the edge can be traversed and shot through.
    Open,
    /// An ordinary wall. Blocks movement and shots, yields to grenades.
    Normal,
    /// A permanent border wall. Never destroyed, never opened.
    Monolith,
    /// A win-condition wall reserved for future use. Behaves like a monolith.
    Exit,
}

/// Unique identifier assigned to a player. Id 1 is reserved for the human.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PlayerId(u32);

impl PlayerId {
    /// The id reserved for the human-controlled player.
    pub const HUMAN: PlayerId = PlayerId(1);

    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier assigned to a wormhole within its circular chain.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct WormholeId(u32);

impl WormholeId {
    /// Creates a new wormhole identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Player vitality: two points of health, clamped at dead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Health(u8);

impl Health {
    const FULL_POINTS: u8 = 2;

    /// Full health, the state every player starts in.
    #[must_use]
    pub const fn full() -> Self {
        Self(Self::FULL_POINTS)
    }

    /// One wound worse, saturating at dead.
    #[must_use]
    pub const fn damaged(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// Whether the player has no health left.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.0 == 0
    }

    /// Whether the player is unhurt.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.0 == Self::FULL_POINTS
    }

    /// Status word used by roster displays.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self.0 {
            2 => "full",
            1 => "wounded",
            _ => "dead",
        }
    }
}

/// Weapons a turn may bring to bear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weapon {
    /// Ranged shot along an unobstructed line of cells.
    Gun,
    /// Melee strike against a cellmate.
    Knife,
    /// Wall-breaching charge thrown at an adjacent edge.
    Grenade,
}

impl Weapon {
    /// Whether using the weapon requires an aim direction.
    #[must_use]
    pub const fn requires_aim(self) -> bool {
        match self {
            Weapon::Gun | Weapon::Grenade => true,
            Weapon::Knife => false,
        }
    }
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Weapon::Gun => "gun",
            Weapon::Knife => "knife",
            Weapon::Grenade => "grenade",
        };
        f.write_str(word)
    }
}

/// Error produced when an unknown weapon word reaches the API boundary.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("\"{0}\" is not a weapon")]
pub struct ParseWeaponError(pub String);

impl FromStr for Weapon {
    type Err = ParseWeaponError;

    fn from_str(word: &str) -> Result<Self, Self::Err> {
        match word {
            "gun" => Ok(Weapon::Gun),
            "knife" => Ok(Weapon::Knife),
            "grenade" => Ok(Weapon::Grenade),
            other => Err(ParseWeaponError(other.to_owned())),
        }
    }
}

/// A weapon employment bundled into a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Use {
    weapon: Weapon,
    direction: Option<Direction>,
}

impl Use {
    /// Creates a new weapon use. A missing direction for a weapon that needs
    /// one is not an error here; the resolver substitutes at random.
    #[must_use]
    pub const fn new(weapon: Weapon, direction: Option<Direction>) -> Self {
        Self { weapon, direction }
    }

    /// The weapon being used.
    #[must_use]
    pub const fn weapon(&self) -> Weapon {
        self.weapon
    }

    /// The aim direction, if one was chosen.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        self.direction
    }
}

/// An immutable decision value: one optional move and one optional weapon use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Turn {
    movement: Option<Direction>,
    action: Option<Use>,
}

impl Turn {
    /// Creates a new turn from its optional parts.
    #[must_use]
    pub const fn new(movement: Option<Direction>, action: Option<Use>) -> Self {
        Self { movement, action }
    }

    /// A turn that does nothing at all.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            movement: None,
            action: None,
        }
    }

    /// The movement component, if any.
    #[must_use]
    pub const fn movement(&self) -> Option<Direction> {
        self.movement
    }

    /// The weapon component, if any.
    #[must_use]
    pub const fn action(&self) -> Option<Use> {
        self.action
    }

    /// Whether both components are absent.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.movement.is_none() && self.action.is_none()
    }
}

/// Maze generation options supplied by the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    size: u32,
    wormholes: bool,
    rivers: bool,
    traps: bool,
}

impl GenerationConfig {
    /// Validates and creates a generation configuration.
    pub fn new(size: u32, wormholes: bool, rivers: bool, traps: bool) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::InvalidSize(size));
        }
        Ok(Self {
            size,
            wormholes,
            rivers,
            traps,
        })
    }

    /// Side length of the square maze, in cells.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Whether wormholes should be scattered through the maze.
    #[must_use]
    pub const fn wormholes(&self) -> bool {
        self.wormholes
    }

    /// Whether rivers were requested. Accepted but not implemented.
    #[must_use]
    pub const fn rivers(&self) -> bool {
        self.rivers
    }

    /// Whether traps should be scattered through the maze.
    #[must_use]
    pub const fn traps(&self) -> bool {
        self.traps
    }
}

/// Errors raised for malformed configuration at the API boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The requested maze size cannot hold a maze.
    #[error("maze size must be at least 1, got {0}")]
    InvalidSize(u32),
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Applies one player's complete turn to the world.
    ResolveTurn {
        /// The player whose turn is being resolved.
        player: PlayerId,
        /// The decision produced by the player's decision source.
        turn: Turn,
    },
    /// Closes a round: fires every feature's per-round tick once.
    AdvanceRound,
}

/// Events broadcast by the world after processing commands.
///
/// The `Display` form of each event is the narration line shown to players;
/// code must dispatch on the variants, never on the rendered text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// A player walked into an adjacent cell.
    PlayerMoved {
        /// The player that moved.
        player: PlayerId,
        /// The direction of travel.
        direction: Direction,
        /// The cell the player left.
        from: CellCoord,
        /// The cell the player now occupies.
        to: CellCoord,
    },
    /// A wall stopped a player's movement attempt.
    MoveBlocked {
        /// The player whose movement failed.
        player: PlayerId,
        /// The direction of the attempt.
        direction: Direction,
    },
    /// A turn carried neither movement nor a weapon use.
    Idled {
        /// The player that did nothing.
        player: PlayerId,
    },
    /// A restrained player's turn passed without consulting their agent.
    TurnSkipped {
        /// The player that sat the round out.
        player: PlayerId,
    },
    /// A direction-requiring weapon had no aim, so one was drawn at random.
    DirectionSubstituted {
        /// The player whose aim was substituted.
        player: PlayerId,
        /// The weapon being aimed.
        weapon: Weapon,
        /// The direction drawn at random.
        direction: Direction,
    },
    /// A gunshot found a target.
    GunHitPlayer {
        /// The shooter.
        player: PlayerId,
        /// The player the bullet struck.
        victim: PlayerId,
        /// The direction of the shot.
        direction: Direction,
    },
    /// A gunshot was absorbed by a wall.
    GunHitWall {
        /// The shooter.
        player: PlayerId,
        /// The direction of the shot.
        direction: Direction,
    },
    /// A grenade destroyed a normal wall.
    GrenadeWallDestroyed {
        /// The thrower.
        player: PlayerId,
        /// The direction of the throw.
        direction: Direction,
    },
    /// A grenade burst against an indestructible wall.
    GrenadeFizzled {
        /// The thrower.
        player: PlayerId,
        /// The direction of the throw.
        direction: Direction,
    },
    /// A grenade sailed through an edge with no wall to destroy.
    GrenadeMissed {
        /// The thrower.
        player: PlayerId,
        /// The direction of the throw.
        direction: Direction,
    },
    /// A knife strike found a cellmate.
    KnifeHitPlayer {
        /// The attacker.
        player: PlayerId,
        /// The player that was stabbed.
        victim: PlayerId,
    },
    /// A knife strike found nobody to hit.
    KnifeMissed {
        /// The attacker.
        player: PlayerId,
    },
    /// A player at full health claimed the treasure.
    TreasurePickedUp {
        /// The new holder.
        player: PlayerId,
        /// The cell the treasure was lifted from.
        cell: CellCoord,
    },
    /// The treasure fell out of a dying holder's hands.
    TreasureDropped {
        /// The player that dropped it.
        player: PlayerId,
        /// The cell the treasure now rests in.
        cell: CellCoord,
    },
    /// A wormhole carried a player across the maze.
    WormholeTraversed {
        /// The player that was teleported.
        player: PlayerId,
        /// The wormhole cell that was entered.
        from: CellCoord,
        /// The destination wormhole's cell.
        to: CellCoord,
    },
    /// A pitfall trap caught a player.
    PitfallTriggered {
        /// The player that fell in.
        player: PlayerId,
        /// The trap's cell.
        cell: CellCoord,
    },
    /// A pitfall trap released a player whose countdown expired.
    PitfallReleased {
        /// The player that climbed out.
        player: PlayerId,
    },
    /// A crossbow trap spent its single bolt.
    CrossbowTriggered {
        /// The player the bolt struck.
        player: PlayerId,
        /// The trap's cell.
        cell: CellCoord,
    },
    /// A player ran out of health.
    PlayerDied {
        /// The player that died.
        player: PlayerId,
    },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::PlayerMoved {
                player, direction, ..
            } => write!(f, "Player {player} moved {direction}"),
            Event::MoveBlocked { player, .. } => {
                write!(f, "Player {player} bumped into a wall")
            }
            Event::Idled { player } => write!(f, "Player {player} did nothing"),
            Event::TurnSkipped { player } => {
                write!(f, "Player {player} is stuck in a pit and sits this round out")
            }
            Event::DirectionSubstituted {
                player,
                weapon,
                direction,
            } => write!(
                f,
                "Player {player} waves the {weapon} around and aims {direction} at random"
            ),
            Event::GunHitPlayer {
                player,
                victim,
                direction,
            } => write!(f, "Player {player} fired {direction} and shot player {victim}"),
            Event::GunHitWall { player, direction } => {
                write!(f, "Player {player} fired {direction} and hit a wall")
            }
            Event::GrenadeWallDestroyed { player, direction } => write!(
                f,
                "Player {player} threw a grenade {direction} and blew open the wall"
            ),
            Event::GrenadeFizzled { player, direction } => write!(
                f,
                "Player {player} threw a grenade {direction} but it didn't blow up"
            ),
            Event::GrenadeMissed { player, direction } => write!(
                f,
                "Player {player} threw a grenade {direction} into open space"
            ),
            Event::KnifeHitPlayer { player, victim } => {
                write!(f, "Player {player} stabbed player {victim}")
            }
            Event::KnifeMissed { player } => write!(f, "Player {player} slashed at the air"),
            Event::TreasurePickedUp { player, .. } => {
                write!(f, "Player {player} picked up the treasure")
            }
            Event::TreasureDropped { player, .. } => {
                write!(f, "Player {player} dropped the treasure")
            }
            Event::WormholeTraversed { player, .. } => {
                write!(f, "Player {player} went through a wormhole!")
            }
            Event::PitfallTriggered { player, .. } => {
                write!(f, "Player {player} fell into a pitfall trap")
            }
            Event::PitfallReleased { player } => {
                write!(f, "Player {player} climbed out of the pit")
            }
            Event::CrossbowTriggered { player, .. } => {
                write!(f, "A crossbow bolt hit player {player}")
            }
            Event::PlayerDied { player } => write!(f, "Player {player} died"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    #[test]
    fn direction_opposites_pair_up() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_ne!(direction.opposite(), direction);
        }
    }

    #[test]
    fn direction_offset_stops_at_the_origin_edges() {
        let origin = CellCoord::new(0, 0);
        assert_eq!(Direction::Up.offset(origin), None);
        assert_eq!(Direction::Left.offset(origin), None);
        assert_eq!(Direction::Right.offset(origin), Some(CellCoord::new(1, 0)));
        assert_eq!(Direction::Down.offset(origin), Some(CellCoord::new(0, 1)));
    }

    #[test]
    fn health_damage_clamps_at_dead() {
        let full = Health::full();
        assert_eq!(full.label(), "full");
        let wounded = full.damaged();
        assert_eq!(wounded.label(), "wounded");
        let dead = wounded.damaged();
        assert!(dead.is_dead());
        assert_eq!(dead.label(), "dead");
        assert_eq!(dead.damaged(), dead);
    }

    #[test]
    fn weapon_words_parse_at_the_boundary() {
        assert_eq!("gun".parse::<Weapon>(), Ok(Weapon::Gun));
        assert_eq!("knife".parse::<Weapon>(), Ok(Weapon::Knife));
        assert_eq!("grenade".parse::<Weapon>(), Ok(Weapon::Grenade));
        assert_eq!(
            "sword".parse::<Weapon>(),
            Err(ParseWeaponError("sword".to_owned()))
        );
    }

    #[test]
    fn only_ranged_weapons_require_aim() {
        assert!(Weapon::Gun.requires_aim());
        assert!(Weapon::Grenade.requires_aim());
        assert!(!Weapon::Knife.requires_aim());
    }

    #[test]
    fn empty_turn_is_idle() {
        assert!(Turn::idle().is_idle());
        assert!(!Turn::new(Some(Direction::Up), None).is_idle());
        assert!(!Turn::new(None, Some(Use::new(Weapon::Knife, None))).is_idle());
    }

    #[test]
    fn config_rejects_zero_size() {
        assert_eq!(
            GenerationConfig::new(0, false, false, false),
            Err(ConfigError::InvalidSize(0))
        );
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: serde::Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn generation_config_round_trips_through_bincode() {
        let config = GenerationConfig::new(10, true, false, true).expect("valid config");
        assert_round_trip(&config);
    }

    #[test]
    fn movement_narration_names_the_direction() {
        let event = Event::PlayerMoved {
            player: PlayerId::new(1),
            direction: Direction::Right,
            from: CellCoord::new(0, 0),
            to: CellCoord::new(1, 0),
        };
        assert_eq!(event.to_string(), "Player 1 moved right");
    }

    #[test]
    fn grenade_fizzle_narration_matches_the_classic_line() {
        let event = Event::GrenadeFizzled {
            player: PlayerId::new(2),
            direction: Direction::Up,
        };
        assert!(event.to_string().contains("didn't blow up"));
    }
}
