#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a labyrinth game in the terminal.
//!
//! The adapter wires the pieces together and draws text; it holds no game
//! logic of its own. The human plays seat 1 through a channel fed by a
//! stdin-reading thread, every other seat runs the seeded random policy.

mod parse;
mod render;

use std::io::{self, BufRead};
use std::thread;

use anyhow::Result;
use clap::Parser;
use labyrinth_core::{GenerationConfig, PlayerId, WELCOME_BANNER};
use labyrinth_system_agents::{ChannelSource, RandomPolicy, TurnHandle};
use labyrinth_system_generation as generation;
use labyrinth_system_turns::{Seat, TurnEngine};
use labyrinth_world::{query, World};

/// A turn-based maze adventure: find the treasure, mind the traps.
#[derive(Debug, Parser)]
#[command(name = "labyrinth")]
struct Args {
    /// Side length of the maze, in cells.
    #[arg(long, default_value_t = 10)]
    size: u32,

    /// Number of players including you; you are always player 1.
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(2..=8))]
    players: u32,

    /// Scatter wormholes through the maze.
    #[arg(long)]
    wormholes: bool,

    /// Accepted for compatibility; rivers are not implemented.
    #[arg(long)]
    rivers: bool,

    /// Scatter crossbow and pitfall traps through the maze.
    #[arg(long)]
    traps: bool,

    /// Seed for the whole game; drawn from entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many rounds even if several players survive.
    #[arg(long)]
    max_rounds: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = GenerationConfig::new(args.size, args.wormholes, args.rivers, args.traps)?;
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut world = build_world(&config, args.players as usize, seed)?;
    let mut seats = build_seats(&world, seed);
    let mut engine = TurnEngine::new();

    println!("{WELCOME_BANNER} (seed {seed})");
    println!("Commands: move <dir>, use <weapon> [dir], pass — dirs are up/right/down/left.");
    println!("{}", render::draw_maze(&world));

    let mut events = Vec::new();
    loop {
        if human_acts_this_round(&world) {
            println!("Your move, player 1:");
        }

        events.clear();
        engine.play_round(&mut world, &mut seats, &mut events);

        println!("--- round {} ---", query::round(&world));
        for event in &events {
            println!("  {event}");
        }
        println!("{}", render::draw_maze(&world));
        for line in render::roster_lines(&world) {
            println!("  {line}");
        }

        let alive = query::player_view(&world).alive();
        if alive <= 1 {
            match query::player_view(&world).iter().find(|p| !p.health.is_dead()) {
                Some(survivor) => println!("Player {} is the last one standing.", survivor.id),
                None => println!("Nobody made it out of the labyrinth."),
            }
            break;
        }
        if args
            .max_rounds
            .is_some_and(|cap| engine.rounds_played() >= cap)
        {
            println!("Round limit reached; calling it a draw.");
            break;
        }
    }

    Ok(())
}

/// Generates the maze, scatters features, places the roster, and seeds the
/// world — each step on its own derived random stream.
fn build_world(config: &GenerationConfig, players: usize, seed: u64) -> Result<World> {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    let mut walls_rng = ChaCha8Rng::seed_from_u64(generation::stream_seed(seed, "maze-walls"));
    let mut grid = generation::generate(config.size(), &mut walls_rng)?;

    let mut feature_rng = ChaCha8Rng::seed_from_u64(generation::stream_seed(seed, "features"));
    let census = generation::place_features(&mut grid, config, &mut feature_rng);

    let mut spawn_rng = ChaCha8Rng::seed_from_u64(generation::stream_seed(seed, "player-spawns"));
    let spawns = generation::place_players(&grid, census.treasure(), players, &mut spawn_rng);

    Ok(World::new(
        grid,
        &spawns,
        generation::stream_seed(seed, "combat"),
    ))
}

/// Seats the human behind a stdin-fed channel and every other player behind
/// the seeded random policy.
fn build_seats(world: &World, seed: u64) -> Vec<Seat> {
    let mut seats = Vec::new();
    for id in query::player_ids(world) {
        if id == PlayerId::HUMAN {
            let (source, handle) = ChannelSource::new();
            spawn_input_thread(handle);
            seats.push(Seat::new(id, Box::new(source)));
        } else {
            let policy = RandomPolicy::from_seed(generation::agent_seed(seed, id));
            seats.push(Seat::new(id, Box::new(policy)));
        }
    }
    seats
}

/// Reads stdin lines, parses them, and delivers turns to the human seat.
/// Parse errors are reported and the prompt stays open.
fn spawn_input_thread(handle: TurnHandle) {
    let _ = thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match parse::parse_turn(&line) {
                Ok(turn) => {
                    if !handle.submit(turn) {
                        break;
                    }
                }
                Err(error) => eprintln!("{error}"),
            }
        }
    });
}

fn human_acts_this_round(world: &World) -> bool {
    query::player(world, PlayerId::HUMAN)
        .is_some_and(|snapshot| !snapshot.health.is_dead() && snapshot.can_move)
}
