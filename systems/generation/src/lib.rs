#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic maze generation: walls, features, and player spawns.
//!
//! Every entry point draws from a caller-supplied random source, so a fixed
//! seed replays the same maze and the seed-stream helpers keep the wall,
//! feature, spawn, and agent streams independent of each other.

use labyrinth_core::{
    CellCoord, ConfigError, Direction, GenerationConfig, PlayerId, WallKind, WormholeId,
};
use labyrinth_world::{Feature, Grid};
use rand::{seq::SliceRandom, Rng};
use sha2::{Digest, Sha256};

/// How many loop-injection edges are opened per unit of maze size.
const LOOP_EDGES_PER_SIZE: u32 = 2;

const RNG_STREAM_AGENT_PREFIX: &str = "agent";

/// Derives an independent RNG stream seed from the global seed and a label.
#[must_use]
pub fn stream_seed(global_seed: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(label.as_bytes());
    finalize_seed(hasher)
}

/// Derives the RNG stream seed for one agent's decision policy.
#[must_use]
pub fn agent_seed(global_seed: u64, player: PlayerId) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(RNG_STREAM_AGENT_PREFIX.as_bytes());
    hasher.update(player.get().to_le_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}

/// Generates a connected maze of the given size.
///
/// The grid starts with every internal wall normal and a monolith ring, gets
/// carved by a random spanning walk that visits every cell, and finally
/// receives a handful of extra openings so the maze has shortcuts. Bounded
/// work throughout; the only failure mode is a size of zero.
pub fn generate<R: Rng>(size: u32, rng: &mut R) -> Result<Grid, ConfigError> {
    if size == 0 {
        return Err(ConfigError::InvalidSize(size));
    }

    let mut grid = Grid::sealed(size);
    carve_spanning_walk(&mut grid, rng);
    inject_loops(&mut grid, rng);
    Ok(grid)
}

/// Random spanning walk over the sealed grid, one new cell per iteration.
///
/// A visited dead end links itself back into the maze and forces the next
/// iteration to jump to the frontier: a uniformly random visited cell that
/// still borders unvisited ground. Jumping via the frontier instead of
/// rejection sampling keeps every iteration a bounded amount of work.
fn carve_spanning_walk<R: Rng>(grid: &mut Grid, rng: &mut R) {
    let size = grid.size();
    let cell_count = (size as usize) * (size as usize);
    let mut visited = Visited::new(size);

    let mut current = random_cell(size, rng);
    for _ in 0..cell_count {
        if visited.contains(current) {
            current = advance_from_frontier(grid, &visited, rng);
        }
        visited.mark(current);

        let openings = unvisited_neighbors(grid, &visited, current);
        if let Some(direction) = openings.choose(rng).copied() {
            let next = grid
                .neighbor(current, direction)
                .expect("unvisited neighbors lie inside the grid");
            let _ = grid.open_wall(current, direction);
            current = next;
        } else if let Some(direction) = interior_directions(grid, current).choose(rng).copied() {
            // Every neighbor is already visited; link back into the maze and
            // leave `current` in place so the next iteration jumps.
            let _ = grid.open_wall(current, direction);
        }
    }
}

/// Picks a random frontier cell, opens a wall to one of its unvisited
/// neighbors, and returns that neighbor as the new walk position.
fn advance_from_frontier<R: Rng>(grid: &mut Grid, visited: &Visited, rng: &mut R) -> CellCoord {
    let frontier: Vec<CellCoord> = grid
        .coords()
        .filter(|coord| {
            visited.contains(*coord) && !unvisited_neighbors(grid, visited, *coord).is_empty()
        })
        .collect();
    debug_assert!(
        !frontier.is_empty(),
        "unvisited cells remain, so some visited cell must border them",
    );

    let cell = frontier[rng.gen_range(0..frontier.len())];
    let openings = unvisited_neighbors(grid, visited, cell);
    let direction = openings[rng.gen_range(0..openings.len())];
    let next = grid
        .neighbor(cell, direction)
        .expect("unvisited neighbors lie inside the grid");
    let _ = grid.open_wall(cell, direction);
    next
}

/// Opens a fixed number of still-normal internal walls, creating shortcuts.
///
/// Shuffle-and-take over the surviving edges keeps this bounded even when
/// fewer walls remain than the quota asks for.
fn inject_loops<R: Rng>(grid: &mut Grid, rng: &mut R) {
    let quota = (grid.size() * LOOP_EDGES_PER_SIZE) as usize;
    let mut closed: Vec<(CellCoord, Direction)> = grid
        .coords()
        .flat_map(|coord| [(coord, Direction::Right), (coord, Direction::Down)])
        .filter(|(coord, direction)| {
            grid.neighbor(*coord, *direction).is_some()
                && grid.wall(*coord, *direction) == WallKind::Normal
        })
        .collect();
    closed.shuffle(rng);

    for (cell, direction) in closed.into_iter().take(quota) {
        let _ = grid.open_wall(cell, direction);
    }
}

/// Scatters the treasure, wormholes, and traps over a generated grid.
///
/// Placement constraints: wormholes sit on distinct cells away from the
/// treasure; traps avoid the treasure and each other. Requested counts clamp
/// to the cells actually available.
pub fn place_features<R: Rng>(
    grid: &mut Grid,
    config: &GenerationConfig,
    rng: &mut R,
) -> FeatureCensus {
    let size = grid.size();

    let treasure = random_cell(size, rng);
    grid.place_feature(treasure, Feature::Treasure);

    let mut wormholes: Vec<CellCoord> = Vec::new();
    if config.wormholes() {
        let requested = rng.gen_range(2..=2 + feature_budget(size)) as usize;
        let mut candidates: Vec<CellCoord> =
            grid.coords().filter(|coord| *coord != treasure).collect();
        candidates.shuffle(rng);
        wormholes = candidates.into_iter().take(requested).collect();

        let count = wormholes.len() as u32;
        for (index, cell) in wormholes.iter().enumerate() {
            let id = index as u32 + 1;
            grid.place_feature(
                *cell,
                Feature::Wormhole {
                    id: WormholeId::new(id),
                    next: WormholeId::new(id % count + 1),
                },
            );
        }
    }

    if config.rivers() {
        // TODO: river carving never made it past the drawing board; the flag
        // is accepted and ignored.
    }

    let mut crossbow_traps = 0;
    let mut pitfall_traps = 0;
    if config.traps() {
        crossbow_traps = scatter_traps(grid, treasure, Feature::crossbow, rng);
        pitfall_traps = scatter_traps(grid, treasure, Feature::pitfall, rng);
    }

    FeatureCensus {
        treasure,
        wormholes,
        crossbow_traps,
        pitfall_traps,
    }
}

fn scatter_traps<R: Rng>(
    grid: &mut Grid,
    treasure: CellCoord,
    make: fn() -> Feature,
    rng: &mut R,
) -> u32 {
    let requested = rng.gen_range(0..=feature_budget(grid.size())) as usize;
    let mut candidates: Vec<CellCoord> = grid
        .coords()
        .filter(|coord| {
            *coord != treasure && !grid.cell(*coord).features().iter().any(Feature::is_trap)
        })
        .collect();
    candidates.shuffle(rng);

    let placed = requested.min(candidates.len());
    for cell in candidates.into_iter().take(placed) {
        grid.place_feature(cell, make());
    }
    placed as u32
}

/// Picks spawn cells for the roster: feature-free ground, preferring cells
/// farther than half the maze from the treasure, relaxing only when the
/// board is too small to satisfy the preference.
#[must_use]
pub fn place_players<R: Rng>(
    grid: &Grid,
    treasure: CellCoord,
    count: usize,
    rng: &mut R,
) -> Vec<CellCoord> {
    let min_distance = f64::from(grid.size()) / 2.0;
    let empty: Vec<CellCoord> = grid
        .coords()
        .filter(|coord| grid.cell(*coord).features().is_empty())
        .collect();

    let mut preferred: Vec<CellCoord> = empty
        .iter()
        .copied()
        .filter(|coord| distance(*coord, treasure) > min_distance)
        .collect();
    preferred.shuffle(rng);
    let mut nearby: Vec<CellCoord> = empty
        .iter()
        .copied()
        .filter(|coord| distance(*coord, treasure) <= min_distance)
        .collect();
    nearby.shuffle(rng);

    let mut spawns: Vec<CellCoord> = preferred.into_iter().take(count).collect();
    if spawns.len() < count {
        spawns.extend(nearby.into_iter().take(count - spawns.len()));
    }
    while spawns.len() < count {
        // Degenerate boards without enough empty ground: stack the rest.
        spawns.push(random_cell(grid.size(), rng));
    }
    spawns
}

/// What the placer put where, for adapters and tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureCensus {
    treasure: CellCoord,
    wormholes: Vec<CellCoord>,
    crossbow_traps: u32,
    pitfall_traps: u32,
}

impl FeatureCensus {
    /// The cell the treasure starts in.
    #[must_use]
    pub const fn treasure(&self) -> CellCoord {
        self.treasure
    }

    /// Cells that received a wormhole, in chain order.
    #[must_use]
    pub fn wormholes(&self) -> &[CellCoord] {
        &self.wormholes
    }

    /// Number of crossbow traps placed.
    #[must_use]
    pub const fn crossbow_traps(&self) -> u32 {
        self.crossbow_traps
    }

    /// Number of pitfall traps placed.
    #[must_use]
    pub const fn pitfall_traps(&self) -> u32 {
        self.pitfall_traps
    }
}

/// Feature counts scale with maze size at one per five cells of side length,
/// rounded half up.
fn feature_budget(size: u32) -> u32 {
    (size + 2) / 5
}

fn distance(a: CellCoord, b: CellCoord) -> f64 {
    let dx = f64::from(a.x()) - f64::from(b.x());
    let dy = f64::from(a.y()) - f64::from(b.y());
    (dx * dx + dy * dy).sqrt()
}

fn random_cell<R: Rng>(size: u32, rng: &mut R) -> CellCoord {
    CellCoord::new(rng.gen_range(0..size), rng.gen_range(0..size))
}

fn unvisited_neighbors(grid: &Grid, visited: &Visited, at: CellCoord) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|direction| {
            grid.neighbor(at, *direction)
                .is_some_and(|neighbor| !visited.contains(neighbor))
        })
        .collect()
}

fn interior_directions(grid: &Grid, at: CellCoord) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|direction| grid.neighbor(at, *direction).is_some())
        .collect()
}

struct Visited {
    size: u32,
    cells: Vec<bool>,
}

impl Visited {
    fn new(size: u32) -> Self {
        Self {
            size,
            cells: vec![false; (size as usize) * (size as usize)],
        }
    }

    fn contains(&self, at: CellCoord) -> bool {
        self.cells[(at.y() as usize) * (self.size as usize) + at.x() as usize]
    }

    fn mark(&mut self, at: CellCoord) {
        self.cells[(at.y() as usize) * (self.size as usize) + at.x() as usize] = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_budget_rounds_half_up() {
        assert_eq!(feature_budget(10), 2);
        assert_eq!(feature_budget(12), 2);
        assert_eq!(feature_budget(13), 3);
        assert_eq!(feature_budget(18), 4);
        assert_eq!(feature_budget(4), 1);
    }

    #[test]
    fn stream_seeds_diverge_by_label() {
        assert_eq!(stream_seed(1, "maze-walls"), stream_seed(1, "maze-walls"));
        assert_ne!(stream_seed(1, "maze-walls"), stream_seed(1, "features"));
        assert_ne!(stream_seed(1, "maze-walls"), stream_seed(2, "maze-walls"));
    }

    #[test]
    fn agent_seeds_diverge_by_player() {
        let first = agent_seed(1, PlayerId::new(1));
        assert_eq!(first, agent_seed(1, PlayerId::new(1)));
        assert_ne!(first, agent_seed(1, PlayerId::new(2)));
    }

    #[test]
    fn euclidean_distance_is_symmetric() {
        let a = CellCoord::new(0, 0);
        let b = CellCoord::new(3, 4);
        assert!((distance(a, b) - 5.0).abs() < f64::EPSILON);
        assert!((distance(b, a) - 5.0).abs() < f64::EPSILON);
    }
}
