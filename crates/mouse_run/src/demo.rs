//! Built-in maze used when no layout file is given.

use micromouse::prelude::*;

/// 6x6 with a long corridor up the west side, a shelf across row 1 and a
/// walled pocket around the goal.
pub fn layout() -> MazeLayout {
    use AbsoluteDirection::*;

    let mut walls = Vec::new();
    for y in 1..=4 {
        walls.push(WallSpec { x: 0, y, side: East });
    }
    for x in 1..=4 {
        walls.push(WallSpec { x, y: 1, side: South });
    }
    for (x, y, side) in [(2, 3, East), (2, 4, East), (3, 2, South), (4, 2, South), (4, 2, East)] {
        walls.push(WallSpec { x, y, side });
    }

    MazeLayout {
        name: "demo-6x6".to_string(),
        width: 6,
        height: 6,
        start: Pose::new(Coords::new(0, 5), North),
        goal: Coords::new(3, 2),
        walls,
    }
}

/// Where `goal` lies from `start`, in the frame of a mouse that started at
/// `start` believing it faced north.
pub fn offset_in_mouse_frame(start: Pose, goal: Coords) -> (i32, i32) {
    let dx = goal.x as i32 - start.location.x as i32;
    let dy = goal.y as i32 - start.location.y as i32;
    match start.direction {
        AbsoluteDirection::North => (dx, dy),
        AbsoluteDirection::East => (dy, -dx),
        AbsoluteDirection::South => (-dx, -dy),
        AbsoluteDirection::West => (-dy, dx),
    }
}
