#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the labyrinth.
//!
//! The world owns the grid, the player roster, and every piece of live
//! feature state. All mutation after construction flows through [`apply`];
//! systems and adapters otherwise only read through the [`query`] module.

mod combat;
mod feature;
mod grid;

pub use feature::{Feature, TrappedPlayer, PITFALL_RESTRAIN_ROUNDS};
pub use grid::{Cell, Grid};

use std::collections::{BTreeMap, BTreeSet};

use labyrinth_core::{CellCoord, Command, Event, Health, PlayerId, WormholeId};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Represents the authoritative labyrinth world state.
#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    players: Vec<Player>,
    occupancy: Occupancy,
    treasure_holder: Option<PlayerId>,
    wormholes: BTreeMap<WormholeId, CellCoord>,
    round: u64,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a world from a generated grid and the chosen spawn cells.
    ///
    /// Players are numbered from 1 in spawn order, id 1 being the human
    /// seat. The seed feeds the world's combat randomness (victim picks and
    /// aim substitution); identical seeds over identical inputs replay
    /// identically.
    #[must_use]
    pub fn new(grid: Grid, spawns: &[CellCoord], seed: u64) -> Self {
        let mut occupancy = Occupancy::new(grid.size());
        let players: Vec<Player> = spawns
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                let id = PlayerId::new(index as u32 + 1);
                occupancy.occupy(id, *cell);
                Player {
                    id,
                    cell: *cell,
                    health: Health::full(),
                    can_move: true,
                }
            })
            .collect();

        let mut wormholes = BTreeMap::new();
        for coord in grid.coords() {
            for feature in grid.cell(coord).features() {
                if let Feature::Wormhole { id, .. } = feature {
                    let _ = wormholes.insert(*id, coord);
                }
            }
        }

        Self {
            grid,
            players,
            occupancy,
            treasure_holder: None,
            wormholes,
            round: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id == id)
    }

    pub(crate) fn player_cell(&self, id: PlayerId) -> CellCoord {
        self.player(id)
            .map(|player| player.cell)
            .expect("turns are only resolved for players on the roster")
    }

    pub(crate) fn player_at_full_health(&self, id: PlayerId) -> bool {
        self.player(id)
            .is_some_and(|player| player.health.is_full())
    }

    pub(crate) fn player_alive_and_mobile(&self, id: PlayerId) -> bool {
        self.player(id)
            .is_some_and(|player| !player.health.is_dead() && player.can_move)
    }

    /// Moves a player between cells, keeping the occupancy index in step.
    pub(crate) fn relocate(&mut self, id: PlayerId, to: CellCoord) {
        let Some(player) = self.players.iter_mut().find(|player| player.id == id) else {
            return;
        };
        let from = player.cell;
        player.cell = to;
        self.occupancy.vacate(id, from);
        self.occupancy.occupy(id, to);
    }

    pub(crate) fn restrain(&mut self, id: PlayerId) {
        if let Some(player) = self.player_mut(id) {
            player.can_move = false;
        }
    }

    /// Wounds a player, clamping at dead. A dying holder drops the treasure
    /// into the cell they die in.
    pub(crate) fn damage(&mut self, id: PlayerId, out_events: &mut Vec<Event>) {
        let Some(player) = self.players.iter_mut().find(|player| player.id == id) else {
            return;
        };
        let was_dead = player.health.is_dead();
        player.health = player.health.damaged();
        let cell = player.cell;
        let now_dead = player.health.is_dead();

        if was_dead || !now_dead {
            return;
        }

        out_events.push(Event::PlayerDied { player: id });
        if self.treasure_holder == Some(id) {
            self.treasure_holder = None;
            self.grid.place_feature(cell, Feature::Treasure);
            out_events.push(Event::TreasureDropped { player: id, cell });
        }
    }
}

/// Applies the provided command to the world, mutating state
/// deterministically and narrating the outcome into `out_events`.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ResolveTurn { player, turn } => {
            combat::resolve_turn(world, player, turn, out_events);
        }
        Command::AdvanceRound => advance_round(world, out_events),
    }
}

/// Fires every feature's per-round tick exactly once and advances the round
/// counter. Pitfall countdowns shrink here, releasing expired victims.
fn advance_round(world: &mut World, out_events: &mut Vec<Event>) {
    world.round = world.round.saturating_add(1);

    let mut released: Vec<PlayerId> = Vec::new();
    let coords: Vec<CellCoord> = world.grid.coords().collect();
    for coord in coords {
        for feature in world.grid.cell_mut(coord).features_mut() {
            let Feature::Pitfall { trapped } = feature else {
                continue;
            };
            for entry in trapped.iter_mut() {
                if entry.fresh {
                    entry.fresh = false;
                    continue;
                }
                entry.rounds_left = entry.rounds_left.saturating_sub(1);
                if entry.rounds_left == 0 {
                    released.push(entry.player);
                }
            }
            trapped.retain(|entry| entry.rounds_left > 0);
        }
    }

    for id in released {
        if let Some(player) = world.player_mut(id) {
            player.can_move = true;
        }
        out_events.push(Event::PitfallReleased { player: id });
    }
}

#[derive(Clone, Debug)]
struct Player {
    id: PlayerId,
    cell: CellCoord,
    health: Health,
    can_move: bool,
}

/// Cell-indexed player membership with ordered, identity-keyed sets.
#[derive(Clone, Debug)]
struct Occupancy {
    size: u32,
    cells: Vec<BTreeSet<PlayerId>>,
}

impl Occupancy {
    fn new(size: u32) -> Self {
        let capacity = (size as usize).saturating_mul(size as usize);
        Self {
            size,
            cells: vec![BTreeSet::new(); capacity],
        }
    }

    fn index(&self, cell: CellCoord) -> usize {
        (cell.y() as usize) * (self.size as usize) + cell.x() as usize
    }

    fn occupy(&mut self, player: PlayerId, cell: CellCoord) {
        let index = self.index(cell);
        let _ = self.cells[index].insert(player);
    }

    fn vacate(&mut self, player: PlayerId, cell: CellCoord) {
        let index = self.index(cell);
        let _ = self.cells[index].remove(&player);
    }

    fn players_at(&self, cell: CellCoord) -> impl Iterator<Item = PlayerId> + '_ {
        self.cells[self.index(cell)].iter().copied()
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use labyrinth_core::{CellCoord, Health, PlayerId};

    use super::{Feature, Grid, World};

    /// Provides read-only access to the maze grid for rendering and probing.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Number of completed rounds.
    #[must_use]
    pub fn round(world: &World) -> u64 {
        world.round
    }

    /// Player ids in ascending order, the order the turn engine cycles in.
    #[must_use]
    pub fn player_ids(world: &World) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = world.players.iter().map(|player| player.id).collect();
        ids.sort_unstable();
        ids
    }

    /// Captures a read-only view of the roster in deterministic order.
    #[must_use]
    pub fn player_view(world: &World) -> PlayerView {
        let mut snapshots: Vec<PlayerSnapshot> = world
            .players
            .iter()
            .map(|player| PlayerSnapshot {
                id: player.id,
                cell: player.cell,
                health: player.health,
                can_move: player.can_move,
                has_treasure: world.treasure_holder == Some(player.id),
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        PlayerView { snapshots }
    }

    /// Snapshot of a single player, if the id is on the roster.
    #[must_use]
    pub fn player(world: &World, id: PlayerId) -> Option<PlayerSnapshot> {
        player_view(world)
            .into_vec()
            .into_iter()
            .find(|snapshot| snapshot.id == id)
    }

    /// The players currently occupying a cell, dead or alive, ascending.
    #[must_use]
    pub fn players_at(world: &World, cell: CellCoord) -> Vec<PlayerId> {
        world.occupancy.players_at(cell).collect()
    }

    /// Where the treasure currently is, if the maze holds one.
    #[must_use]
    pub fn treasure(world: &World) -> Option<TreasureLocation> {
        if let Some(holder) = world.treasure_holder {
            return Some(TreasureLocation::Held(holder));
        }
        world.grid.coords().find_map(|coord| {
            world
                .grid
                .cell(coord)
                .features()
                .iter()
                .any(|feature| matches!(feature, Feature::Treasure))
                .then_some(TreasureLocation::OnGround(coord))
        })
    }

    /// Read-only snapshot describing the whole roster.
    #[derive(Clone, Debug)]
    pub struct PlayerView {
        snapshots: Vec<PlayerSnapshot>,
    }

    impl PlayerView {
        /// Iterator over the captured snapshots in ascending id order.
        pub fn iter(&self) -> impl Iterator<Item = &PlayerSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<PlayerSnapshot> {
            self.snapshots
        }

        /// Number of players still drawing breath.
        #[must_use]
        pub fn alive(&self) -> usize {
            self.snapshots
                .iter()
                .filter(|snapshot| !snapshot.health.is_dead())
                .count()
        }
    }

    /// Immutable representation of a single player's state used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PlayerSnapshot {
        /// Unique identifier assigned to the player.
        pub id: PlayerId,
        /// Grid cell currently occupied by the player.
        pub cell: CellCoord,
        /// Remaining vitality.
        pub health: Health,
        /// Whether the player may act this round.
        pub can_move: bool,
        /// Whether the player is carrying the treasure.
        pub has_treasure: bool,
    }

    /// Where the treasure currently rests.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum TreasureLocation {
        /// A player is carrying it.
        Held(PlayerId),
        /// It lies in a cell, waiting to be claimed.
        OnGround(CellCoord),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labyrinth_core::Direction;

    #[test]
    fn relocation_keeps_the_occupancy_index_in_step() {
        let grid = Grid::open(4);
        let start = CellCoord::new(0, 0);
        let mut world = World::new(grid, &[start], 1);
        let id = PlayerId::new(1);

        world.relocate(id, CellCoord::new(2, 1));

        assert!(query::players_at(&world, start).is_empty());
        assert_eq!(query::players_at(&world, CellCoord::new(2, 1)), vec![id]);
        assert_eq!(world.player_cell(id), CellCoord::new(2, 1));
    }

    #[test]
    fn roster_keeps_dead_players() {
        let grid = Grid::open(4);
        let mut world = World::new(grid, &[CellCoord::new(0, 0)], 1);
        let id = PlayerId::new(1);
        let mut events = Vec::new();

        world.damage(id, &mut events);
        world.damage(id, &mut events);
        world.damage(id, &mut events);

        let snapshot = query::player(&world, id).expect("dead players stay on the roster");
        assert!(snapshot.health.is_dead());
        assert_eq!(query::players_at(&world, CellCoord::new(0, 0)), vec![id]);
        assert_eq!(
            events,
            vec![Event::PlayerDied { player: id }],
            "clamped damage must not re-announce the death",
        );
    }

    #[test]
    fn worlds_index_wormholes_found_in_the_grid() {
        let mut grid = Grid::open(5);
        grid.place_feature(
            CellCoord::new(1, 1),
            Feature::Wormhole {
                id: WormholeId::new(1),
                next: WormholeId::new(2),
            },
        );
        grid.place_feature(
            CellCoord::new(4, 3),
            Feature::Wormhole {
                id: WormholeId::new(2),
                next: WormholeId::new(1),
            },
        );
        let world = World::new(grid, &[CellCoord::new(0, 0)], 1);

        assert_eq!(
            world.wormholes.get(&WormholeId::new(1)),
            Some(&CellCoord::new(1, 1))
        );
        assert_eq!(
            world.wormholes.get(&WormholeId::new(2)),
            Some(&CellCoord::new(4, 3))
        );
    }

    #[test]
    fn treasure_query_tracks_ground_and_holder() {
        let mut grid = Grid::open(4);
        grid.place_feature(CellCoord::new(2, 2), Feature::Treasure);
        let mut world = World::new(grid, &[CellCoord::new(0, 0)], 1);

        assert_eq!(
            query::treasure(&world),
            Some(query::TreasureLocation::OnGround(CellCoord::new(2, 2)))
        );

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ResolveTurn {
                player: PlayerId::new(1),
                turn: labyrinth_core::Turn::new(Some(Direction::Right), None),
            },
            &mut events,
        );
        assert_eq!(
            query::treasure(&world),
            Some(query::TreasureLocation::OnGround(CellCoord::new(2, 2))),
            "walking elsewhere must not disturb the treasure",
        );
    }

    #[test]
    fn round_tick_advances_the_counter() {
        let grid = Grid::open(4);
        let mut world = World::new(grid, &[CellCoord::new(0, 0)], 1);
        let mut events = Vec::new();

        apply(&mut world, Command::AdvanceRound, &mut events);
        apply(&mut world, Command::AdvanceRound, &mut events);

        assert_eq!(query::round(&world), 2);
        assert!(events.is_empty());
    }
}
