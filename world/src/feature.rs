//! Map features and the mutable state they carry.

use labyrinth_core::{PlayerId, WormholeId};

/// Number of rounds a pitfall keeps its victim restrained.
pub const PITFALL_RESTRAIN_ROUNDS: u8 = 3;

/// A feature resting on a maze cell.
///
/// Dispatch is a single match on the variant; nothing in the engine inspects
/// display text to learn what a feature is.
#[derive(Clone, Debug)]
pub enum Feature {
    /// The singleton treasure. Present in a cell only while nobody holds it.
    Treasure,
    /// A wormhole belonging to a circular chain.
    Wormhole {
        /// This wormhole's id.
        id: WormholeId,
        /// The chain successor whose cell is the teleport destination.
        next: WormholeId,
    },
    /// A pit that damages entering players and restrains them for
    /// [`PITFALL_RESTRAIN_ROUNDS`] rounds.
    Pitfall {
        /// Countdown entries for the players currently held by the pit.
        trapped: Vec<TrappedPlayer>,
    },
    /// A single-bolt crossbow rigged to fire at the first player entering.
    Crossbow {
        /// Whether the bolt has already been spent.
        spent: bool,
    },
}

impl Feature {
    /// A pitfall trap with nobody inside.
    #[must_use]
    pub const fn pitfall() -> Self {
        Feature::Pitfall {
            trapped: Vec::new(),
        }
    }

    /// A crossbow trap that has not fired yet.
    #[must_use]
    pub const fn crossbow() -> Self {
        Feature::Crossbow { spent: false }
    }

    /// Whether the feature is one of the trap variants.
    #[must_use]
    pub const fn is_trap(&self) -> bool {
        matches!(self, Feature::Pitfall { .. } | Feature::Crossbow { .. })
    }
}

/// Countdown entry for one player held by a pitfall.
///
/// Entries created during the current round carry the `fresh` mark so the
/// round tick that closes the same round does not count against the victim.
#[derive(Clone, Copy, Debug)]
pub struct TrappedPlayer {
    pub(crate) player: PlayerId,
    pub(crate) rounds_left: u8,
    pub(crate) fresh: bool,
}

impl TrappedPlayer {
    pub(crate) const fn caught(player: PlayerId) -> Self {
        Self {
            player,
            rounds_left: PITFALL_RESTRAIN_ROUNDS,
            fresh: true,
        }
    }
}
