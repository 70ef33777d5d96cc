//! Row-major cell arena shared by the ground-truth maze and the mouse memory.
//!
//! Walls live on both sides of every interior boundary. All writes go through
//! [`Grid::set_wall`], which updates the neighbour's opposite wall in the same
//! call, so the two sides can never disagree.

use serde::{Deserialize, Serialize};

use crate::direction::{AbsoluteDirection, Coords, W_ALL};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
    /// Wall bits, see [`crate::direction::W_NORTH`] and friends.
    pub walls: u8,
    /// Sensed or inferred. The flood fill reuses it as its own "scored" mark.
    pub explored: bool,
    /// Only used while following a planned route.
    #[serde(default)]
    pub visited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f32>,
    #[serde(default)]
    pub deadend: bool,
}

impl Cell {
    fn new(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn coords(&self) -> Coords {
        Coords::new(self.x, self.y)
    }

    pub fn has_wall(&self, dir: AbsoluteDirection) -> bool {
        self.walls & dir.wall_bit() != 0
    }

    pub fn wall_count(&self) -> u32 {
        (self.walls & W_ALL).count_ones()
    }

    fn clear_planning(&mut self) {
        self.visited = false;
        self.explored = false;
        self.distance = None;
        self.time = None;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// A grid with no walls at all. Used for the mouse memory, where an unset
    /// wall means "not known to exist".
    pub fn open(width: u32, height: u32) -> Self {
        let mut cells = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// A grid whose border cells carry the outer wall.
    pub fn enclosed(width: u32, height: u32) -> Self {
        let mut grid = Self::open(width, height);
        for cell in grid.cells.iter_mut() {
            if cell.y == 0 {
                cell.walls |= AbsoluteDirection::North.wall_bit();
            }
            if cell.x + 1 == width {
                cell.walls |= AbsoluteDirection::East.wall_bit();
            }
            if cell.y + 1 == height {
                cell.walls |= AbsoluteDirection::South.wall_bit();
            }
            if cell.x == 0 {
                cell.walls |= AbsoluteDirection::West.wall_bit();
            }
        }
        grid
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, at: Coords) -> bool {
        at.x < self.width && at.y < self.height
    }

    fn idx(&self, at: Coords) -> Option<usize> {
        if self.contains(at) {
            Some((at.y as usize) * (self.width as usize) + (at.x as usize))
        } else {
            None
        }
    }

    pub fn cell(&self, at: Coords) -> Option<&Cell> {
        self.idx(at).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, at: Coords) -> Option<&mut Cell> {
        let i = self.idx(at)?;
        Some(&mut self.cells[i])
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Rows top to bottom, for renderers.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    pub fn neighbor(&self, at: Coords, dir: AbsoluteDirection) -> Option<Coords> {
        at.step(dir).filter(|next| self.contains(*next))
    }

    /// Out-of-bounds cells are treated as fully walled.
    pub fn has_wall(&self, at: Coords, dir: AbsoluteDirection) -> bool {
        self.cell(at).map_or(true, |c| c.has_wall(dir))
    }

    /// Sets or clears the wall on `dir` of `at` and the matching wall of the
    /// neighbour across it. Returns false if `at` is outside the grid.
    pub fn set_wall(&mut self, at: Coords, dir: AbsoluteDirection, present: bool) -> bool {
        let Some(i) = self.idx(at) else {
            return false;
        };
        write_wall(&mut self.cells[i], dir, present);
        if let Some(j) = self.neighbor(at, dir).and_then(|n| self.idx(n)) {
            write_wall(&mut self.cells[j], dir.opposite(), present);
        }
        true
    }

    /// Clears visited/explored flags and cost annotations ahead of a flood fill.
    pub fn reset_planning(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.clear_planning();
        }
    }

    /// True when every interior boundary agrees on both sides.
    pub fn walls_consistent(&self) -> bool {
        self.cells.iter().all(|cell| {
            [AbsoluteDirection::East, AbsoluteDirection::South]
                .into_iter()
                .all(|dir| match self.neighbor(cell.coords(), dir) {
                    Some(n) => self.has_wall(n, dir.opposite()) == cell.has_wall(dir),
                    None => true,
                })
        })
    }
}

fn write_wall(cell: &mut Cell, dir: AbsoluteDirection, present: bool) {
    if present {
        cell.walls |= dir.wall_bit();
    } else {
        cell.walls &= !dir.wall_bit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::{W_NORTH, W_WEST};

    #[test]
    fn enclosed_grid_has_border_walls_only() {
        let g = Grid::enclosed(3, 2);
        let corner = g.cell(Coords::new(0, 0)).unwrap();
        assert_eq!(corner.walls, W_NORTH | W_WEST);
        let middle_bottom = g.cell(Coords::new(1, 1)).unwrap();
        assert!(middle_bottom.has_wall(AbsoluteDirection::South));
        assert_eq!(middle_bottom.wall_count(), 1);
        assert!(g.walls_consistent());
    }

    #[test]
    fn set_wall_updates_the_neighbour() {
        let mut g = Grid::open(3, 3);
        assert!(g.set_wall(Coords::new(1, 1), AbsoluteDirection::North, true));
        assert!(g.has_wall(Coords::new(1, 0), AbsoluteDirection::South));
        assert!(g.walls_consistent());

        g.set_wall(Coords::new(1, 0), AbsoluteDirection::South, false);
        assert!(!g.has_wall(Coords::new(1, 1), AbsoluteDirection::North));
        assert!(!g.set_wall(Coords::new(3, 0), AbsoluteDirection::West, true));
    }

    #[test]
    fn out_of_bounds_reads_as_walled() {
        let g = Grid::open(2, 2);
        assert!(g.has_wall(Coords::new(5, 5), AbsoluteDirection::East));
        assert_eq!(g.neighbor(Coords::new(1, 1), AbsoluteDirection::East), None);
        assert_eq!(
            g.neighbor(Coords::new(1, 1), AbsoluteDirection::West),
            Some(Coords::new(0, 1))
        );
    }

    #[test]
    fn reset_planning_keeps_walls_and_deadends() {
        let mut g = Grid::open(2, 1);
        g.set_wall(Coords::new(0, 0), AbsoluteDirection::East, true);
        {
            let c = g.cell_mut(Coords::new(0, 0)).unwrap();
            c.explored = true;
            c.visited = true;
            c.distance = Some(3);
            c.time = Some(1.1);
            c.deadend = true;
        }
        g.reset_planning();
        let c = g.cell(Coords::new(0, 0)).unwrap();
        assert!(!c.explored && !c.visited);
        assert_eq!(c.distance, None);
        assert_eq!(c.time, None);
        assert!(c.deadend);
        assert!(c.has_wall(AbsoluteDirection::East));
    }
}
