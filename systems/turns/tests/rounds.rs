use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use labyrinth_core::{CellCoord, Direction, Event, PlayerId, Turn};
use labyrinth_system_turns::{DecisionSource, Observation, Seat, TurnEngine};
use labyrinth_world::{query, Feature, Grid, World};

/// Test stub that records every consultation and replays a queued script.
struct Scripted {
    queue: VecDeque<Turn>,
    consultations: Rc<RefCell<Vec<PlayerId>>>,
}

impl Scripted {
    fn seated(
        player: u32,
        turns: Vec<Turn>,
        consultations: &Rc<RefCell<Vec<PlayerId>>>,
    ) -> Seat {
        Seat::new(
            PlayerId::new(player),
            Box::new(Scripted {
                queue: turns.into(),
                consultations: Rc::clone(consultations),
            }),
        )
    }
}

impl DecisionSource for Scripted {
    fn decide(&mut self, observation: &Observation<'_>) -> Turn {
        self.consultations.borrow_mut().push(observation.player());
        self.queue.pop_front().unwrap_or_else(Turn::idle)
    }
}

fn move_turn(direction: Direction) -> Turn {
    Turn::new(Some(direction), None)
}

fn consultations_of(log: &Rc<RefCell<Vec<PlayerId>>>, player: u32) -> usize {
    log.borrow()
        .iter()
        .filter(|id| **id == PlayerId::new(player))
        .count()
}

#[test]
fn players_act_in_ascending_id_order() {
    let spawns = [CellCoord::new(0, 0), CellCoord::new(3, 3), CellCoord::new(1, 2)];
    let mut world = World::new(Grid::open(4), &spawns, 1);
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut seats = vec![
        Scripted::seated(3, Vec::new(), &log),
        Scripted::seated(1, Vec::new(), &log),
        Scripted::seated(2, Vec::new(), &log),
    ];
    let mut engine = TurnEngine::new();
    let mut events = Vec::new();

    engine.play_round(&mut world, &mut seats, &mut events);
    engine.play_round(&mut world, &mut seats, &mut events);

    let expected: Vec<PlayerId> = [1, 2, 3, 1, 2, 3].map(PlayerId::new).into();
    assert_eq!(*log.borrow(), expected);
    assert_eq!(engine.rounds_played(), 2);
}

#[test]
fn dead_players_are_skipped_without_consultation() {
    // Player 2 walks over two crossbow traps and dies; afterwards the engine
    // must leave its source alone.
    let mut grid = Grid::open(4);
    grid.place_feature(CellCoord::new(1, 3), Feature::crossbow());
    grid.place_feature(CellCoord::new(2, 3), Feature::crossbow());
    let spawns = [CellCoord::new(0, 0), CellCoord::new(0, 3)];
    let mut world = World::new(grid, &spawns, 1);

    let log = Rc::new(RefCell::new(Vec::new()));
    let mut seats = vec![
        Scripted::seated(1, Vec::new(), &log),
        Scripted::seated(
            2,
            vec![move_turn(Direction::Right), move_turn(Direction::Right)],
            &log,
        ),
    ];
    let mut engine = TurnEngine::new();
    let mut events = Vec::new();

    for _ in 0..4 {
        engine.play_round(&mut world, &mut seats, &mut events);
    }

    assert!(query::player(&world, PlayerId::new(2))
        .expect("roster keeps the dead")
        .health
        .is_dead());
    assert_eq!(consultations_of(&log, 2), 2);
    assert_eq!(consultations_of(&log, 1), 4);
}

#[test]
fn restrained_players_are_skipped_but_narrated() {
    let mut grid = Grid::open(4);
    grid.place_feature(CellCoord::new(1, 0), Feature::pitfall());
    let mut world = World::new(grid, &[CellCoord::new(0, 0)], 1);

    let log = Rc::new(RefCell::new(Vec::new()));
    let mut seats = vec![Scripted::seated(
        1,
        vec![move_turn(Direction::Right)],
        &log,
    )];
    let mut engine = TurnEngine::new();
    let mut events = Vec::new();

    // Round 1: the player walks into the pit.
    engine.play_round(&mut world, &mut seats, &mut events);
    assert_eq!(consultations_of(&log, 1), 1);

    // Rounds 2-4: restrained, skipped without consulting the source.
    for round in 2..=4 {
        events.clear();
        engine.play_round(&mut world, &mut seats, &mut events);
        assert_eq!(consultations_of(&log, 1), 1, "consulted during round {round}");
        assert!(events.contains(&Event::TurnSkipped {
            player: PlayerId::new(1),
        }));
    }

    // The fourth round tick released the player; round 5 consults again.
    events.clear();
    engine.play_round(&mut world, &mut seats, &mut events);
    assert_eq!(consultations_of(&log, 1), 2);
    assert!(!events.contains(&Event::TurnSkipped {
        player: PlayerId::new(1),
    }));
}

#[test]
fn scripted_rounds_replay_identically() {
    let run = || {
        let mut grid = Grid::open(4);
        grid.place_feature(CellCoord::new(2, 0), Feature::Treasure);
        let spawns = [CellCoord::new(0, 0), CellCoord::new(3, 3)];
        let mut world = World::new(grid, &spawns, 9);

        let log = Rc::new(RefCell::new(Vec::new()));
        let mut seats = vec![
            Scripted::seated(
                1,
                vec![move_turn(Direction::Right), move_turn(Direction::Right)],
                &log,
            ),
            Scripted::seated(
                2,
                vec![move_turn(Direction::Up), move_turn(Direction::Left)],
                &log,
            ),
        ];
        let mut engine = TurnEngine::new();
        let mut events = Vec::new();
        for _ in 0..3 {
            engine.play_round(&mut world, &mut seats, &mut events);
        }
        (
            events,
            query::player_view(&world).into_vec(),
        )
    };

    assert_eq!(run(), run());
}

#[test]
fn the_engine_never_ends_the_game_itself() {
    let mut world = World::new(Grid::open(4), &[CellCoord::new(0, 0)], 1);
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut seats = vec![Scripted::seated(1, Vec::new(), &log)];
    let mut engine = TurnEngine::new();
    let mut events = Vec::new();

    // A lone survivor is a caller-side termination policy; the engine keeps
    // dealing rounds for as long as it is asked to.
    for _ in 0..10 {
        engine.play_round(&mut world, &mut seats, &mut events);
    }
    assert_eq!(engine.rounds_played(), 10);
    assert_eq!(query::round(&world), 10);
}
