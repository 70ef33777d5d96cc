//! The mouse's belief about the maze.
//!
//! The mouse does not know which way it faces in absolute terms, so it assumes
//! north and keeps a memory twice the size of the maze with itself in the
//! middle:
//!
//! ```text
//!   maze 2x2 -> memory 5x5, mouse at (2,2)
//!     # # # # #
//!     # # # # #
//!     # # ^ # #
//!     # # # # #
//!     # # # # #
//! ```
//!
//! Both axes use the larger maze side so any orientation fits.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::direction::{AbsoluteDirection, Coords};
use crate::grid::{Cell, Grid};
use crate::maze::MazeSize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryGrid {
    grid: Grid,
    total_cells: u32,
    explored_cells: u32,
}

impl MemoryGrid {
    pub fn new(size: MazeSize) -> Self {
        let half = size.width.max(size.height);
        let side = half * 2 + 1;
        Self {
            grid: Grid::open(side, side),
            total_cells: size.width * size.height,
            explored_cells: 0,
        }
    }

    pub fn center(&self) -> Coords {
        Coords::new(self.grid.width() / 2, self.grid.height() / 2)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn cell(&self, at: Coords) -> Option<&Cell> {
        self.grid.cell(at)
    }

    pub fn total_cells(&self) -> u32 {
        self.total_cells
    }

    pub fn explored_cells(&self) -> u32 {
        self.explored_cells
    }

    /// True once as many cells are known as the real maze holds.
    pub fn is_complete(&self) -> bool {
        self.explored_cells >= self.total_cells
    }

    /// Cells outside memory count as explored so they are never chosen.
    pub fn is_explored(&self, at: Coords) -> bool {
        self.grid.cell(at).map_or(true, |c| c.explored)
    }

    /// Records the four absolute walls sensed at `at` and mirrors every wall
    /// onto the neighbour across it. Neighbours that end up with three known
    /// walls are inferred to be dead ends. Returns false if `at` was already
    /// explored, in which case nothing changes.
    pub fn record_cell(&mut self, at: Coords, sensed: [(AbsoluteDirection, bool); 4]) -> bool {
        match self.grid.cell_mut(at) {
            Some(cell) if !cell.explored => cell.explored = true,
            _ => return false,
        }
        self.explored_cells += 1;

        for (dir, present) in sensed {
            self.grid.set_wall(at, dir, present);
        }
        for (dir, present) in sensed {
            if present {
                if let Some(next) = self.grid.neighbor(at, dir) {
                    self.infer_deadend(next);
                }
            }
        }
        true
    }

    /// Marks an unexplored cell with three or more known walls as an explored
    /// dead end, so the mouse never drives into it.
    pub fn infer_deadend(&mut self, at: Coords) -> bool {
        let Some(cell) = self.grid.cell_mut(at) else {
            return false;
        };
        if cell.explored || cell.wall_count() < 3 {
            return false;
        }
        cell.explored = true;
        cell.deadend = true;
        self.explored_cells += 1;
        debug!("Inferred dead end at ({}, {})", at.x, at.y);
        true
    }

    pub fn mark_deadend(&mut self, at: Coords) {
        if let Some(cell) = self.grid.cell_mut(at) {
            cell.deadend = true;
        }
    }

    pub fn reset_planning(&mut self) {
        self.grid.reset_planning();
    }
}
