#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round-robin turn engine driving the labyrinth simulation.
//!
//! Each round cycles the roster in ascending id order: await the current
//! agent's decision, apply it through the world, then advance to the next
//! seat; once every player has acted the round closes with a single feature
//! tick. The engine never ends a game on its own — callers check their own
//! termination condition between rounds.

use labyrinth_core::{Command, Event, PlayerId, Turn};
use labyrinth_world::{self as world, query, Grid, World};

/// Read-only view handed to a decision source when its turn comes up.
pub struct Observation<'a> {
    world: &'a World,
    player: PlayerId,
}

impl<'a> Observation<'a> {
    /// Captures the observable state for one player's decision.
    #[must_use]
    pub const fn new(world: &'a World, player: PlayerId) -> Self {
        Self { world, player }
    }
}

impl Observation<'_> {
    /// The player this decision is for.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// The maze as it currently stands.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        query::grid(self.world)
    }

    /// Snapshot of the whole roster in ascending id order.
    #[must_use]
    pub fn players(&self) -> query::PlayerView {
        query::player_view(self.world)
    }

    /// Snapshot of the deciding player.
    #[must_use]
    pub fn own_snapshot(&self) -> query::PlayerSnapshot {
        query::player(self.world, self.player)
            .expect("the engine only consults seated roster players")
    }
}

/// Produces one [`Turn`] per consultation, given observable world state.
///
/// This is the engine's only suspension point. A human-backed source blocks
/// until an externally-delivered decision arrives; automated sources are
/// expected to resolve promptly. Once consulted, a source must eventually
/// return — there is no cancellation mid-turn.
pub trait DecisionSource {
    /// Decides the player's next turn.
    fn decide(&mut self, observation: &Observation<'_>) -> Turn;
}

/// One roster slot: a player bound to its decision source.
pub struct Seat {
    player: PlayerId,
    source: Box<dyn DecisionSource>,
}

impl Seat {
    /// Binds a player to the source that will decide its turns.
    #[must_use]
    pub fn new(player: PlayerId, source: Box<dyn DecisionSource>) -> Self {
        Self { player, source }
    }

    /// The player occupying the seat.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }
}

/// Drives complete rounds over an authoritative world.
#[derive(Debug, Default)]
pub struct TurnEngine {
    rounds_played: u64,
}

impl TurnEngine {
    /// Creates an engine that has not played any rounds yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of full rounds the engine has driven to completion.
    #[must_use]
    pub const fn rounds_played(&self) -> u64 {
        self.rounds_played
    }

    /// Plays one full round: every living player acts once, in ascending id
    /// order, then every feature ticks exactly once.
    ///
    /// Dead players are skipped silently. A restrained player is skipped
    /// with a [`Event::TurnSkipped`] narration and no agent consultation —
    /// the pit keeps counting through the round tick regardless.
    pub fn play_round(
        &mut self,
        world: &mut World,
        seats: &mut [Seat],
        out_events: &mut Vec<Event>,
    ) {
        for id in query::player_ids(world) {
            let Some(snapshot) = query::player(world, id) else {
                continue;
            };
            if snapshot.health.is_dead() {
                continue;
            }
            if !snapshot.can_move {
                out_events.push(Event::TurnSkipped { player: id });
                continue;
            }

            let Some(seat) = seats.iter_mut().find(|seat| seat.player == id) else {
                debug_assert!(false, "no seat bound for player {id}");
                continue;
            };

            let turn = {
                let observation = Observation::new(world, id);
                seat.source.decide(&observation)
            };
            world::apply(world, Command::ResolveTurn { player: id, turn }, out_events);
        }

        world::apply(world, Command::AdvanceRound, out_events);
        self.rounds_played = self.rounds_played.saturating_add(1);
    }
}
