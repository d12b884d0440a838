use std::collections::VecDeque;

use labyrinth_core::{CellCoord, ConfigError, Direction, GenerationConfig, WallKind, WormholeId};
use labyrinth_system_generation::{generate, place_features, place_players, stream_seed};
use labyrinth_world::{Feature, Grid};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SIZES: [u32; 3] = [4, 7, 10];
const SEEDS: [u64; 3] = [1, 99, 0xdead_beef];

fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

fn generated(size: u32, seed: u64) -> Grid {
    generate(size, &mut rng(seed)).expect("positive sizes generate")
}

fn reachable_cells(grid: &Grid) -> usize {
    let start = CellCoord::new(0, 0);
    let mut seen = vec![start];
    let mut queue = VecDeque::from([start]);
    while let Some(cell) = queue.pop_front() {
        for direction in Direction::ALL {
            if grid.wall(cell, direction) != WallKind::Open {
                continue;
            }
            let next = grid.neighbor(cell, direction).expect("open wall has a neighbor");
            if !seen.contains(&next) {
                seen.push(next);
                queue.push_back(next);
            }
        }
    }
    seen.len()
}

fn open_internal_edges(grid: &Grid) -> usize {
    grid.coords()
        .flat_map(|coord| [(coord, Direction::Right), (coord, Direction::Down)])
        .filter(|(coord, direction)| grid.wall(*coord, *direction) == WallKind::Open)
        .count()
}

#[test]
fn every_generated_maze_is_fully_connected() {
    for size in SIZES {
        for seed in SEEDS {
            let grid = generated(size, seed);
            assert_eq!(
                reachable_cells(&grid),
                (size * size) as usize,
                "size {size}, seed {seed}",
            );
        }
    }
}

#[test]
fn boundaries_stay_monolithic() {
    for size in SIZES {
        let grid = generated(size, 5);
        for coord in grid.coords() {
            for direction in Direction::ALL {
                if grid.neighbor(coord, direction).is_none() {
                    assert_eq!(grid.wall(coord, direction), WallKind::Monolith);
                }
            }
        }
    }
}

#[test]
fn every_edge_agrees_on_both_sides() {
    let grid = generated(10, 77);
    for coord in grid.coords() {
        for direction in Direction::ALL {
            if let Some(next) = grid.neighbor(coord, direction) {
                assert_eq!(
                    grid.wall(coord, direction),
                    grid.wall(next, direction.opposite()),
                    "wall mismatch between {coord} and {next}",
                );
            }
        }
    }
}

#[test]
fn loop_injection_leaves_more_than_a_spanning_tree() {
    for size in SIZES {
        let grid = generated(size, 13);
        let tree_edges = (size * size - 1) as usize;
        assert!(
            open_internal_edges(&grid) > tree_edges,
            "size {size}: a maze without shortcuts",
        );
    }
}

#[test]
fn generation_is_deterministic_for_equal_seeds() {
    let walls = |grid: &Grid| -> Vec<WallKind> {
        grid.coords()
            .flat_map(|coord| Direction::ALL.map(|direction| grid.wall(coord, direction)))
            .collect()
    };
    assert_eq!(walls(&generated(10, 21)), walls(&generated(10, 21)));
}

#[test]
fn zero_sized_mazes_are_rejected() {
    assert!(matches!(
        generate(0, &mut rng(1)),
        Err(ConfigError::InvalidSize(0))
    ));
}

#[test]
fn wormholes_sit_on_distinct_cells_away_from_the_treasure() {
    let config = GenerationConfig::new(10, true, false, false).expect("valid config");
    for seed in SEEDS {
        let mut grid = generated(10, seed);
        let census = place_features(&mut grid, &config, &mut rng(stream_seed(seed, "features")));

        assert!(census.wormholes().len() >= 2);
        for (index, cell) in census.wormholes().iter().enumerate() {
            assert_ne!(*cell, census.treasure(), "seed {seed}");
            assert!(
                !census.wormholes()[index + 1..].contains(cell),
                "seed {seed}: two wormholes share {cell}",
            );
        }
    }
}

#[test]
fn the_wormhole_chain_is_one_circle_in_placement_order() {
    let config = GenerationConfig::new(10, true, false, false).expect("valid config");
    let mut grid = generated(10, 3);
    let census = place_features(&mut grid, &config, &mut rng(4));

    let count = census.wormholes().len() as u32;
    for (index, cell) in census.wormholes().iter().enumerate() {
        let id = index as u32 + 1;
        let found = grid.cell(*cell).features().iter().find_map(|feature| {
            if let Feature::Wormhole { id, next } = feature {
                Some((*id, *next))
            } else {
                None
            }
        });
        assert_eq!(
            found,
            Some((WormholeId::new(id), WormholeId::new(id % count + 1))),
            "wormhole {id} of {count}",
        );
    }
}

#[test]
fn traps_avoid_the_treasure_and_each_other() {
    let config = GenerationConfig::new(10, false, false, true).expect("valid config");
    for seed in SEEDS {
        let mut grid = generated(10, seed);
        let census = place_features(&mut grid, &config, &mut rng(seed));

        let mut traps_found = 0;
        for coord in grid.coords() {
            let features = grid.cell(coord).features();
            let traps = features.iter().filter(|feature| feature.is_trap()).count();
            assert!(traps <= 1, "seed {seed}: {coord} holds {traps} traps");
            traps_found += traps;
            if coord == census.treasure() {
                assert_eq!(traps, 0, "seed {seed}: trap on the treasure cell");
            }
        }
        assert_eq!(
            traps_found,
            (census.crossbow_traps() + census.pitfall_traps()) as usize,
            "seed {seed}",
        );
    }
}

#[test]
fn rivers_are_accepted_but_change_nothing() {
    let without = GenerationConfig::new(8, false, false, false).expect("valid config");
    let with = GenerationConfig::new(8, false, true, false).expect("valid config");

    let mut first = generated(8, 11);
    let mut second = generated(8, 11);
    let _ = place_features(&mut first, &without, &mut rng(12));
    let _ = place_features(&mut second, &with, &mut rng(12));

    for coord in first.coords() {
        assert_eq!(
            first.cell(coord).features().len(),
            second.cell(coord).features().len(),
        );
    }
}

#[test]
fn spawns_land_on_feature_free_ground() {
    let config = GenerationConfig::new(10, true, false, true).expect("valid config");
    let mut grid = generated(10, 31);
    let census = place_features(&mut grid, &config, &mut rng(32));

    let spawns = place_players(&grid, census.treasure(), 4, &mut rng(33));

    assert_eq!(spawns.len(), 4);
    for spawn in spawns {
        assert!(grid.cell(spawn).features().is_empty(), "spawn on {spawn}");
    }
}
