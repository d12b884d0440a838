//! Text rendering of the maze and the roster status block.
//!
//! Presentation only: everything here reads through the world's query
//! surface and draws characters.

use labyrinth_core::{CellCoord, Direction, WallKind};
use labyrinth_world::{query, Feature, World};

/// Renders the maze as a block of text, one wall per edge.
///
/// Monoliths draw as `=`/`#`, normal walls as `-`/`|`, open edges as blanks.
/// Each cell shows its first feature's glyph and the occupying player's id
/// (`*` when several players share the cell).
#[must_use]
pub(crate) fn draw_maze(world: &World) -> String {
    let grid = query::grid(world);
    let size = grid.size();
    let mut out = String::new();

    for y in 0..size {
        for x in 0..size {
            out.push('+');
            out.push_str(horizontal(grid.wall(CellCoord::new(x, y), Direction::Up)));
        }
        out.push_str("+\n");

        for x in 0..size {
            let at = CellCoord::new(x, y);
            out.push(vertical(grid.wall(at, Direction::Left)));
            out.push_str(&cell_glyphs(world, at));
        }
        out.push(vertical(
            grid.wall(CellCoord::new(size - 1, y), Direction::Right),
        ));
        out.push('\n');
    }

    for x in 0..size {
        out.push('+');
        out.push_str(horizontal(grid.wall(CellCoord::new(x, size - 1), Direction::Down)));
    }
    out.push_str("+\n");
    out
}

/// One status line per player, ascending by id.
#[must_use]
pub(crate) fn roster_lines(world: &World) -> Vec<String> {
    query::player_view(world)
        .iter()
        .map(|snapshot| {
            let mut line = format!(
                "Player {}: {} at {}",
                snapshot.id,
                snapshot.health.label(),
                snapshot.cell,
            );
            if snapshot.has_treasure {
                line.push_str(", carrying the treasure");
            }
            if !snapshot.can_move && !snapshot.health.is_dead() {
                line.push_str(", stuck in a pit");
            }
            line
        })
        .collect()
}

fn horizontal(wall: WallKind) -> &'static str {
    match wall {
        WallKind::Open => "   ",
        WallKind::Normal => "---",
        WallKind::Monolith | WallKind::Exit => "===",
    }
}

fn vertical(wall: WallKind) -> char {
    match wall {
        WallKind::Open => ' ',
        WallKind::Normal => '|',
        WallKind::Monolith | WallKind::Exit => '#',
    }
}

fn cell_glyphs(world: &World, at: CellCoord) -> String {
    let glyph = match query::grid(world).cell(at).features().first() {
        Some(Feature::Treasure) => 'T',
        Some(Feature::Wormhole { .. }) => 'W',
        Some(Feature::Pitfall { .. }) => 'P',
        Some(Feature::Crossbow { .. }) => 'C',
        None => ' ',
    };

    let players = query::players_at(world, at);
    let occupant = match players.len() {
        0 => ' ',
        1 => char::from_digit(players[0].get() % 10, 10).unwrap_or('?'),
        _ => '*',
    };

    format!("{glyph}{occupant} ")
}
