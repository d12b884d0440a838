//! The cell and grid model underneath the labyrinth.

use labyrinth_core::{CellCoord, Direction, WallKind};

use crate::feature::Feature;

/// A single maze cell: four wall slots and the features resting on it.
///
/// Player membership is tracked by the world's occupancy index, not by the
/// cell itself.
#[derive(Clone, Debug)]
pub struct Cell {
    walls: [WallKind; 4],
    features: Vec<Feature>,
}

impl Cell {
    fn sealed() -> Self {
        Self {
            walls: [WallKind::Normal; 4],
            features: Vec::new(),
        }
    }

    /// The wall occupying the given slot of the cell.
    #[must_use]
    pub fn wall(&self, direction: Direction) -> WallKind {
        self.walls[direction.index()]
    }

    /// The features resting on the cell, in placement order.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub(crate) fn features_mut(&mut self) -> &mut Vec<Feature> {
        &mut self.features
    }

    fn set_wall(&mut self, direction: Direction, kind: WallKind) {
        self.walls[direction.index()] = kind;
    }
}

/// Square 2-D array of cells making up the maze.
///
/// The grid is created once per game by the generator and mutated afterwards
/// only by explicit wall-destroying effects. Edge state is stored redundantly
/// on both adjacent cells; every mutation goes through [`Grid::open_wall`],
/// which keeps the two sides synchronized.
#[derive(Clone, Debug)]
pub struct Grid {
    size: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid with every internal wall normal and a monolith ring
    /// around the border. This is the generator's starting point.
    #[must_use]
    pub fn sealed(size: u32) -> Self {
        let cell_count = (size as usize).saturating_mul(size as usize);
        let mut grid = Self {
            size,
            cells: vec![Cell::sealed(); cell_count],
        };

        for coord in grid.coords() {
            if coord.y() == 0 {
                grid.cell_mut(coord).set_wall(Direction::Up, WallKind::Monolith);
            }
            if coord.x() + 1 == size {
                grid.cell_mut(coord)
                    .set_wall(Direction::Right, WallKind::Monolith);
            }
            if coord.y() + 1 == size {
                grid.cell_mut(coord)
                    .set_wall(Direction::Down, WallKind::Monolith);
            }
            if coord.x() == 0 {
                grid.cell_mut(coord)
                    .set_wall(Direction::Left, WallKind::Monolith);
            }
        }

        grid
    }

    /// Creates a grid whose every internal wall is already open, keeping the
    /// monolith ring. Scenario scaffolding for tests only.
    #[cfg(any(test, feature = "scenario_scaffolding"))]
    #[must_use]
    pub fn open(size: u32) -> Self {
        let mut grid = Self::sealed(size);
        for coord in grid.coords().collect::<Vec<_>>() {
            let _ = grid.open_wall(coord, Direction::Right);
            let _ = grid.open_wall(coord, Direction::Down);
        }
        grid
    }

    /// Side length of the grid, in cells.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, at: CellCoord) -> bool {
        at.x() < self.size && at.y() < self.size
    }

    /// Iterates every cell coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> {
        let size = self.size;
        (0..size).flat_map(move |y| (0..size).map(move |x| CellCoord::new(x, y)))
    }

    /// Read access to the cell at the given coordinate.
    ///
    /// Out-of-range coordinates are programming errors and panic.
    #[must_use]
    pub fn cell(&self, at: CellCoord) -> &Cell {
        &self.cells[self.index(at)]
    }

    pub(crate) fn cell_mut(&mut self, at: CellCoord) -> &mut Cell {
        let index = self.index(at);
        &mut self.cells[index]
    }

    /// The wall the given cell carries in the given direction.
    #[must_use]
    pub fn wall(&self, at: CellCoord, direction: Direction) -> WallKind {
        self.cell(at).wall(direction)
    }

    /// The neighboring coordinate in the given direction, if it exists.
    #[must_use]
    pub fn neighbor(&self, at: CellCoord, direction: Direction) -> Option<CellCoord> {
        direction
            .offset(at)
            .filter(|candidate| self.contains(*candidate))
    }

    /// Opens the wall on both sides of an edge.
    ///
    /// Only normal walls yield; monolith and exit walls are permanent, and an
    /// already open edge is left alone. Returns whether anything changed.
    pub fn open_wall(&mut self, at: CellCoord, direction: Direction) -> bool {
        let Some(next) = self.neighbor(at, direction) else {
            return false;
        };
        if self.wall(at, direction) != WallKind::Normal {
            return false;
        }
        debug_assert_eq!(
            self.wall(next, direction.opposite()),
            WallKind::Normal,
            "edge wall state diverged between {at} and {next}",
        );
        self.cell_mut(at).set_wall(direction, WallKind::Open);
        self.cell_mut(next)
            .set_wall(direction.opposite(), WallKind::Open);
        true
    }

    /// Rests a feature on a cell, after any features already present.
    pub fn place_feature(&mut self, at: CellCoord, feature: Feature) {
        self.cell_mut(at).features_mut().push(feature);
    }

    fn index(&self, at: CellCoord) -> usize {
        debug_assert!(self.contains(at), "{at} lies outside the {0}x{0} grid", self.size);
        (at.y() as usize) * (self.size as usize) + at.x() as usize
    }
}
