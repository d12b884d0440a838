//! Turn resolution: movement, weapon physics, and feature triggers.

use labyrinth_core::{CellCoord, Direction, Event, PlayerId, Turn, Use, WallKind, Weapon};
use rand::Rng;

use crate::feature::{Feature, TrappedPlayer};
use crate::World;

/// Applies one player's complete turn to the world.
///
/// Movement resolves first; on success every feature of the entered cell
/// fires in placement order. The weapon, if any, then resolves from the
/// post-movement position. A failed move never blocks the weapon.
pub(crate) fn resolve_turn(
    world: &mut World,
    player: PlayerId,
    turn: Turn,
    out_events: &mut Vec<Event>,
) {
    debug_assert!(
        world.player_alive_and_mobile(player),
        "the engine must not hand turns to dead or restrained players",
    );

    if turn.is_idle() {
        out_events.push(Event::Idled { player });
        return;
    }

    if let Some(direction) = turn.movement() {
        attempt_move(world, player, direction, out_events);
    }
    if let Some(action) = turn.action() {
        resolve_use(world, player, action, out_events);
    }
}

fn attempt_move(
    world: &mut World,
    player: PlayerId,
    direction: Direction,
    out_events: &mut Vec<Event>,
) {
    let from = world.player_cell(player);
    if world.grid.wall(from, direction) != WallKind::Open {
        out_events.push(Event::MoveBlocked { player, direction });
        return;
    }

    let to = world
        .grid
        .neighbor(from, direction)
        .expect("an open wall always leads to a cell inside the monolith ring");
    world.relocate(player, to);
    out_events.push(Event::PlayerMoved {
        player,
        direction,
        from,
        to,
    });
    activate_features(world, player, to, out_events);
}

/// What a single feature decided to do to the entering player.
enum Triggered {
    Pickup,
    Teleport(labyrinth_core::WormholeId),
    PitDamage,
    BoltDamage,
    Nothing,
}

/// Fires every feature of the entered cell, in placement order.
///
/// A wormhole teleport does not activate the destination cell's features, so
/// a teleport can never chain; later features of the entered cell still fire
/// against the player wherever they ended up.
fn activate_features(
    world: &mut World,
    player: PlayerId,
    at: CellCoord,
    out_events: &mut Vec<Event>,
) {
    let mut index = 0;
    loop {
        if index >= world.grid.cell(at).features().len() {
            break;
        }

        let unheld = world.treasure_holder.is_none();
        let full_health = world.player_at_full_health(player);
        let triggered = match &mut world.grid.cell_mut(at).features_mut()[index] {
            Feature::Treasure if unheld && full_health => Triggered::Pickup,
            Feature::Treasure => Triggered::Nothing,
            Feature::Wormhole { next, .. } => Triggered::Teleport(*next),
            Feature::Pitfall { trapped } => {
                trapped.push(TrappedPlayer::caught(player));
                Triggered::PitDamage
            }
            Feature::Crossbow { spent } => {
                if *spent {
                    Triggered::Nothing
                } else {
                    *spent = true;
                    Triggered::BoltDamage
                }
            }
        };

        match triggered {
            Triggered::Pickup => {
                let _ = world.grid.cell_mut(at).features_mut().remove(index);
                world.treasure_holder = Some(player);
                out_events.push(Event::TreasurePickedUp { player, cell: at });
                // The list shifted; the same index now names the next feature.
                continue;
            }
            Triggered::Teleport(next) => {
                if let Some(destination) = world.wormholes.get(&next).copied() {
                    world.relocate(player, destination);
                    out_events.push(Event::WormholeTraversed {
                        player,
                        from: at,
                        to: destination,
                    });
                }
            }
            Triggered::PitDamage => {
                world.restrain(player);
                out_events.push(Event::PitfallTriggered { player, cell: at });
                world.damage(player, out_events);
            }
            Triggered::BoltDamage => {
                out_events.push(Event::CrossbowTriggered { player, cell: at });
                world.damage(player, out_events);
            }
            Triggered::Nothing => {}
        }
        index += 1;
    }
}

fn resolve_use(world: &mut World, player: PlayerId, action: Use, out_events: &mut Vec<Event>) {
    match action.weapon() {
        Weapon::Knife => stab(world, player, out_events),
        Weapon::Gun => {
            let direction =
                aim_or_substitute(world, player, Weapon::Gun, action.direction(), out_events);
            fire_gun(world, player, direction, out_events);
        }
        Weapon::Grenade => {
            let direction =
                aim_or_substitute(world, player, Weapon::Grenade, action.direction(), out_events);
            throw_grenade(world, player, direction, out_events);
        }
    }
}

/// Resolves the aim of a direction-requiring weapon, drawing one uniformly
/// at random and reporting the substitution when the turn brought none.
fn aim_or_substitute(
    world: &mut World,
    player: PlayerId,
    weapon: Weapon,
    aim: Option<Direction>,
    out_events: &mut Vec<Event>,
) -> Direction {
    if let Some(direction) = aim {
        return direction;
    }
    let direction = Direction::ALL[world.rng.gen_range(0..Direction::ALL.len())];
    out_events.push(Event::DirectionSubstituted {
        player,
        weapon,
        direction,
    });
    direction
}

/// Ray-steps cell by cell until a cell holds a player or the ray's
/// exit-facing wall is closed. Dead bodies absorb bullets too.
fn fire_gun(
    world: &mut World,
    player: PlayerId,
    direction: Direction,
    out_events: &mut Vec<Event>,
) {
    let mut probe = world.player_cell(player);
    if world.grid.wall(probe, direction) != WallKind::Open {
        out_events.push(Event::GunHitWall { player, direction });
        return;
    }

    loop {
        let Some(next) = world.grid.neighbor(probe, direction) else {
            debug_assert!(false, "a ray escaped the monolith ring at {probe}");
            return;
        };
        probe = next;

        let occupants: Vec<PlayerId> = world.occupancy.players_at(probe).collect();
        if !occupants.is_empty() {
            let victim = occupants[world.rng.gen_range(0..occupants.len())];
            out_events.push(Event::GunHitPlayer {
                player,
                victim,
                direction,
            });
            world.damage(victim, out_events);
            return;
        }

        if world.grid.wall(probe, direction) != WallKind::Open {
            out_events.push(Event::GunHitWall { player, direction });
            return;
        }
    }
}

/// A grenade breaches a normal wall, fizzles on permanent walls, and sails
/// uselessly through an edge that has no wall left.
fn throw_grenade(
    world: &mut World,
    player: PlayerId,
    direction: Direction,
    out_events: &mut Vec<Event>,
) {
    let at = world.player_cell(player);
    match world.grid.wall(at, direction) {
        WallKind::Normal => {
            let opened = world.grid.open_wall(at, direction);
            debug_assert!(opened, "a normal wall must yield to a grenade");
            out_events.push(Event::GrenadeWallDestroyed { player, direction });
        }
        WallKind::Monolith | WallKind::Exit => {
            out_events.push(Event::GrenadeFizzled { player, direction });
        }
        WallKind::Open => {
            out_events.push(Event::GrenadeMissed { player, direction });
        }
    }
}

/// Damages one uniformly-random other occupant of the attacker's cell.
fn stab(world: &mut World, player: PlayerId, out_events: &mut Vec<Event>) {
    let at = world.player_cell(player);
    let others: Vec<PlayerId> = world
        .occupancy
        .players_at(at)
        .filter(|occupant| *occupant != player)
        .collect();

    if others.is_empty() {
        out_events.push(Event::KnifeMissed { player });
        return;
    }

    let victim = others[world.rng.gen_range(0..others.len())];
    out_events.push(Event::KnifeHitPlayer { player, victim });
    world.damage(victim, out_events);
}
