#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Decision sources for automated and human seats.
//!
//! The turn engine consults one [`DecisionSource`] per player. This crate
//! provides the stock implementations: a seeded random policy for automated
//! opponents, a scripted queue for replays, and a channel-backed source whose
//! decisions are delivered from outside the game loop — the human seat.

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};

use labyrinth_core::{Direction, Turn, Use, Weapon};
use labyrinth_system_turns::{DecisionSource, Observation};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded policy mirroring the classic random opponent: always wanders, and
/// one turn in ten also reaches for a weapon.
#[derive(Debug)]
pub struct RandomPolicy {
    rng: ChaCha8Rng,
}

impl RandomPolicy {
    /// Creates a policy whose whole behavior is determined by the seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl DecisionSource for RandomPolicy {
    fn decide(&mut self, _observation: &Observation<'_>) -> Turn {
        let action = if self.rng.gen_range(1..=10) == 1 {
            let weapon = match self.rng.gen_range(1..=3) {
                1 => Weapon::Gun,
                2 => Weapon::Knife,
                _ => Weapon::Grenade,
            };
            // The five-way aim roll leaves a one-in-five chance of no aim,
            // which exercises the resolver's substitution fallback.
            let aim = match self.rng.gen_range(1..=5) {
                1 => Some(Direction::Up),
                2 => Some(Direction::Right),
                3 => Some(Direction::Down),
                4 => Some(Direction::Left),
                _ => None,
            };
            Some(Use::new(weapon, aim))
        } else {
            None
        };

        let movement = Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];
        Turn::new(Some(movement), action)
    }
}

/// Replays a fixed queue of turns, idling once the queue runs dry.
#[derive(Debug)]
pub struct ScriptedPolicy {
    queue: VecDeque<Turn>,
}

impl ScriptedPolicy {
    /// Creates a policy that will play the given turns in order.
    #[must_use]
    pub fn new(turns: Vec<Turn>) -> Self {
        Self {
            queue: turns.into(),
        }
    }
}

impl DecisionSource for ScriptedPolicy {
    fn decide(&mut self, _observation: &Observation<'_>) -> Turn {
        self.queue.pop_front().unwrap_or_else(Turn::idle)
    }
}

/// The human seat: decisions arrive from outside through a channel.
///
/// `decide` blocks until the paired [`TurnHandle`] delivers a value — this is
/// the engine's suspension point for human input, with no timeout. A
/// disconnected handle yields idle turns so an abandoned game cannot wedge
/// the loop.
#[derive(Debug)]
pub struct ChannelSource {
    receiver: Receiver<Turn>,
}

impl ChannelSource {
    /// Creates the source together with the handle that feeds it.
    #[must_use]
    pub fn new() -> (Self, TurnHandle) {
        let (sender, receiver) = channel();
        (Self { receiver }, TurnHandle { sender })
    }
}

impl DecisionSource for ChannelSource {
    fn decide(&mut self, _observation: &Observation<'_>) -> Turn {
        self.receiver.recv().unwrap_or_else(|_| Turn::idle())
    }
}

/// Delivery handle paired with a [`ChannelSource`].
#[derive(Clone, Debug)]
pub struct TurnHandle {
    sender: Sender<Turn>,
}

impl TurnHandle {
    /// Delivers a decision. Returns `false` once the game side hung up.
    pub fn submit(&self, turn: Turn) -> bool {
        self.sender.send(turn).is_ok()
    }
}
