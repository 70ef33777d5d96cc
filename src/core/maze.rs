use serde::{Deserialize, Serialize};

use crate::direction::{AbsoluteDirection, Coords, Pose, RelativeDirection};
use crate::error::MouseError;
use crate::grid::Grid;
use crate::perspective::MazePerspective;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeSize {
    pub width: u32,
    pub height: u32,
}

/// What the mouse can do to the physical maze it sits in.
///
/// Walls are only ever reported relative to the mouse's current heading; the
/// engine never sees absolute orientation.
pub trait MouseMaze {
    fn has_wall(&self, relative: RelativeDirection) -> bool;

    fn has_reached_goal(&self) -> bool;

    fn size(&self) -> MazeSize;

    fn turn(&mut self, relative: RelativeDirection);

    /// Returns false, without moving, when a wall or the border blocks the way.
    fn move_forward(&mut self, cells: u32) -> bool;

    /// Stable identifier, used as the persistence key.
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallSpec {
    pub x: u32,
    pub y: u32,
    pub side: AbsoluteDirection,
}

/// Plain description of a maze: size, start pose, goal and interior walls.
/// Border walls are implied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeLayout {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub start: Pose,
    pub goal: Coords,
    #[serde(default)]
    pub walls: Vec<WallSpec>,
}

/// Ground truth: the real walls, where the mouse is and where the goal is.
#[derive(Debug, Clone)]
pub struct GridMaze {
    name: String,
    grid: Grid,
    goal: Coords,
    start: Pose,
    mouse: Pose,
}

impl GridMaze {
    pub const MAX_SIDE: u32 = 1024;

    /// An enclosed maze with no interior walls.
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        start: Pose,
        goal: Coords,
    ) -> Result<Self, MouseError> {
        if width == 0 || height == 0 {
            return Err(MouseError::InvalidMaze("maze must be at least 1x1"));
        }
        if width > Self::MAX_SIDE || height > Self::MAX_SIDE {
            return Err(MouseError::InvalidMaze("maze side too large"));
        }
        let grid = Grid::enclosed(width, height);
        if !grid.contains(start.location) {
            return Err(MouseError::out_of_bounds(start.location));
        }
        if !grid.contains(goal) {
            return Err(MouseError::out_of_bounds(goal));
        }
        let mut maze = Self {
            name: name.into(),
            grid,
            goal,
            start,
            mouse: start,
        };
        maze.mark_explored();
        Ok(maze)
    }

    pub fn from_layout(layout: &MazeLayout) -> Result<Self, MouseError> {
        let mut maze = Self::new(
            layout.name.clone(),
            layout.width,
            layout.height,
            layout.start,
            layout.goal,
        )?;
        for wall in &layout.walls {
            maze.set_wall(Coords::new(wall.x, wall.y), wall.side)?;
        }
        Ok(maze)
    }

    /// Builder form of [`GridMaze::set_wall`].
    pub fn with_wall(mut self, at: Coords, side: AbsoluteDirection) -> Result<Self, MouseError> {
        self.set_wall(at, side)?;
        Ok(self)
    }

    /// Adds a wall on `side` of `at` (and on the facing side of its neighbour).
    pub fn set_wall(&mut self, at: Coords, side: AbsoluteDirection) -> Result<(), MouseError> {
        if self.grid.set_wall(at, side, true) {
            Ok(())
        } else {
            Err(MouseError::out_of_bounds(at))
        }
    }

    /// Puts the mouse back on the start pose and forgets what it uncovered.
    pub fn reset(&mut self) {
        self.mouse = self.start;
        for y in 0..self.grid.height() {
            for x in 0..self.grid.width() {
                if let Some(cell) = self.grid.cell_mut(Coords::new(x, y)) {
                    cell.explored = false;
                }
            }
        }
        self.mark_explored();
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn goal(&self) -> Coords {
        self.goal
    }

    pub fn start(&self) -> Pose {
        self.start
    }

    pub fn pose(&self) -> Pose {
        self.mouse
    }

    fn mark_explored(&mut self) {
        if let Some(cell) = self.grid.cell_mut(self.mouse.location) {
            cell.explored = true;
        }
    }
}

impl MouseMaze for GridMaze {
    fn has_wall(&self, relative: RelativeDirection) -> bool {
        let dir = self.mouse.direction.turned(relative);
        self.grid.has_wall(self.mouse.location, dir)
    }

    fn has_reached_goal(&self) -> bool {
        self.mouse.location == self.goal
    }

    fn size(&self) -> MazeSize {
        MazeSize {
            width: self.grid.width(),
            height: self.grid.height(),
        }
    }

    fn turn(&mut self, relative: RelativeDirection) {
        self.mouse.direction = self.mouse.direction.turned(relative);
    }

    fn move_forward(&mut self, cells: u32) -> bool {
        let dir = self.mouse.direction;
        // Only the wall nearest the start is checked; the whole run must stay on the grid.
        if self.grid.has_wall(self.mouse.location, dir) {
            return false;
        }
        let mut dest = self.mouse.location;
        for _ in 0..cells {
            match self.grid.neighbor(dest, dir) {
                Some(next) => dest = next,
                None => return false,
            }
        }
        self.mouse.location = dest;
        self.mark_explored();
        true
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl MazePerspective for GridMaze {
    fn board(&self) -> &Grid {
        &self.grid
    }

    fn win_location(&self) -> Option<Coords> {
        Some(self.goal)
    }

    fn mouse_location(&self) -> Coords {
        self.mouse.location
    }

    fn mouse_direction(&self) -> AbsoluteDirection {
        self.mouse.direction
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use AbsoluteDirection::*;

    fn north_at(x: u32, y: u32) -> Pose {
        Pose::new(Coords::new(x, y), North)
    }

    /// 3x3 with no interior walls, start (0,0) facing north, goal (2,2).
    pub(crate) fn open_3x3() -> GridMaze {
        GridMaze::new("open-3x3", 3, 3, north_at(0, 0), Coords::new(2, 2)).unwrap()
    }

    /// A 1x5 corridor up column 0 with a two-cell dead-end branch east of the
    /// middle cell. Every other cell is walled off.
    pub(crate) fn corridor_with_branch() -> GridMaze {
        let mut m =
            GridMaze::new("corridor-branch", 3, 5, north_at(0, 4), Coords::new(0, 0)).unwrap();
        for y in [0, 1, 3, 4] {
            m.set_wall(Coords::new(0, y), East).unwrap();
        }
        for x in [1, 2] {
            m.set_wall(Coords::new(x, 2), North).unwrap();
            m.set_wall(Coords::new(x, 2), South).unwrap();
        }
        m
    }

    /// 5x3 with exactly two routes from (0,0) to (4,0):
    /// a six-cell zig-zag through rows 0-1 with four turns, and an eight-cell
    /// route down column 0, along row 2 and up column 4 with two turns.
    /// (2,0) is a dead-end pocket off (2,1).
    pub(crate) fn zigzag_vs_corridor() -> GridMaze {
        let mut m = GridMaze::new("zigzag", 5, 3, north_at(0, 0), Coords::new(4, 0)).unwrap();
        let walls = [
            (1, 0, East),
            (2, 0, East),
            (0, 1, East),
            (3, 1, East),
            (1, 1, South),
            (2, 1, South),
            (3, 1, South),
        ];
        for (x, y, side) in walls {
            m.set_wall(Coords::new(x, y), side).unwrap();
        }
        m
    }

    /// A 1x3 column entered from the middle cell facing north, so one end is
    /// ahead of the mouse and the other behind it.
    pub(crate) fn corridor_from_middle(goal_y: u32) -> GridMaze {
        GridMaze::new("middle", 1, 3, north_at(0, 1), Coords::new(0, goal_y)).unwrap()
    }

    /// 4x4 whose goal sits in a walled-off cell.
    pub(crate) fn unreachable_goal() -> GridMaze {
        let mut m = GridMaze::new("sealed", 4, 4, north_at(0, 3), Coords::new(3, 0)).unwrap();
        m.set_wall(Coords::new(3, 0), West).unwrap();
        m.set_wall(Coords::new(3, 0), South).unwrap();
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AbsoluteDirection::*;
    use RelativeDirection::*;

    #[test]
    fn walls_are_reported_relative_to_heading() {
        let maze = fixtures::open_3x3();
        // (0,0) facing north: border ahead and to the left.
        assert!(maze.has_wall(Front));
        assert!(maze.has_wall(Left));
        assert!(!maze.has_wall(Right));
        assert!(!maze.has_wall(Back));
    }

    #[test]
    fn blocked_moves_change_nothing() {
        let mut maze = fixtures::open_3x3();
        assert!(!maze.move_forward(1));
        assert_eq!(maze.pose().location, Coords::new(0, 0));

        maze.turn(Right);
        assert_eq!(maze.pose().direction, East);
        // Two cells fit, three would leave the grid.
        assert!(!maze.move_forward(3));
        assert!(maze.move_forward(2));
        assert_eq!(maze.pose().location, Coords::new(2, 0));
        assert!(maze.grid().cell(Coords::new(2, 0)).unwrap().explored);
        assert!(!maze.grid().cell(Coords::new(1, 0)).unwrap().explored);
    }

    #[test]
    fn goal_is_detected_on_arrival() {
        let mut maze = fixtures::corridor_with_branch();
        assert!(!maze.has_reached_goal());
        assert!(maze.move_forward(4));
        assert!(maze.has_reached_goal());
        maze.reset();
        assert_eq!(maze.pose(), maze.start());
        assert!(!maze.grid().cell(Coords::new(0, 0)).unwrap().explored);
    }

    #[test]
    fn layout_builds_a_consistent_maze() {
        let layout = MazeLayout {
            name: "tiny".to_string(),
            width: 2,
            height: 2,
            start: Pose::new(Coords::new(0, 1), North),
            goal: Coords::new(1, 1),
            walls: vec![WallSpec {
                x: 0,
                y: 1,
                side: East,
            }],
        };
        let maze = GridMaze::from_layout(&layout).unwrap();
        assert!(maze.grid().has_wall(Coords::new(1, 1), West));
        assert!(maze.grid().walls_consistent());
        assert_eq!(maze.name(), "tiny");

        let json = serde_json::to_string(&layout).unwrap();
        assert!(json.contains("\"side\":\"east\""));
    }

    #[test]
    fn rejects_out_of_grid_layouts() {
        let start = Pose::new(Coords::new(0, 0), North);
        assert!(matches!(
            GridMaze::new("bad", 2, 2, start, Coords::new(2, 0)),
            Err(MouseError::OutOfBounds { x: 2, y: 0 })
        ));
        assert!(GridMaze::new("empty", 0, 3, start, Coords::new(0, 0)).is_err());
        let maze = GridMaze::new("ok", 2, 2, start, Coords::new(1, 1)).unwrap();
        assert!(maze.with_wall(Coords::new(5, 5), North).is_err());
    }
}
