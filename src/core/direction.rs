use serde::{Deserialize, Serialize};

// Wall bits per cell.
// 1=north, 2=east, 4=south, 8=west.
pub const W_NORTH: u8 = 1;
pub const W_EAST: u8 = 2;
pub const W_SOUTH: u8 = 4;
pub const W_WEST: u8 = 8;
pub const W_ALL: u8 = W_NORTH | W_EAST | W_SOUTH | W_WEST;

/// Compass heading on the grid. North points to the row above (`y - 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbsoluteDirection {
    North,
    East,
    South,
    West,
}

impl AbsoluteDirection {
    pub const ALL: [AbsoluteDirection; 4] = [
        AbsoluteDirection::North,
        AbsoluteDirection::East,
        AbsoluteDirection::South,
        AbsoluteDirection::West,
    ];

    pub fn index(self) -> u8 {
        match self {
            AbsoluteDirection::North => 0,
            AbsoluteDirection::East => 1,
            AbsoluteDirection::South => 2,
            AbsoluteDirection::West => 3,
        }
    }

    pub fn from_index(i: u8) -> Self {
        match i % 4 {
            0 => AbsoluteDirection::North,
            1 => AbsoluteDirection::East,
            2 => AbsoluteDirection::South,
            _ => AbsoluteDirection::West,
        }
    }

    pub fn wall_bit(self) -> u8 {
        match self {
            AbsoluteDirection::North => W_NORTH,
            AbsoluteDirection::East => W_EAST,
            AbsoluteDirection::South => W_SOUTH,
            AbsoluteDirection::West => W_WEST,
        }
    }

    pub fn opposite(self) -> Self {
        self.turned(RelativeDirection::Back)
    }

    /// `absolute = (current + relative) mod 4`
    pub fn turned(self, relative: RelativeDirection) -> Self {
        Self::from_index(self.index() + relative.index())
    }

    /// The relative turn that takes `heading` onto `self`.
    pub fn relative_to(self, heading: AbsoluteDirection) -> RelativeDirection {
        RelativeDirection::from_index(self.index() + 4 - heading.index())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AbsoluteDirection::North => "north",
            AbsoluteDirection::East => "east",
            AbsoluteDirection::South => "south",
            AbsoluteDirection::West => "west",
        }
    }
}

/// Direction relative to the mouse's current heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelativeDirection {
    Front,
    Right,
    Back,
    Left,
}

impl RelativeDirection {
    pub fn index(self) -> u8 {
        match self {
            RelativeDirection::Front => 0,
            RelativeDirection::Right => 1,
            RelativeDirection::Back => 2,
            RelativeDirection::Left => 3,
        }
    }

    pub fn from_index(i: u8) -> Self {
        match i % 4 {
            0 => RelativeDirection::Front,
            1 => RelativeDirection::Right,
            2 => RelativeDirection::Back,
            _ => RelativeDirection::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelativeDirection::Front => "front",
            RelativeDirection::Right => "right",
            RelativeDirection::Back => "back",
            RelativeDirection::Left => "left",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coords {
    pub x: u32,
    pub y: u32,
}

impl Coords {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// One cell over in `dir`. `None` when that would underflow.
    pub fn step(self, dir: AbsoluteDirection) -> Option<Self> {
        match dir {
            AbsoluteDirection::North => self.y.checked_sub(1).map(|y| Self::new(self.x, y)),
            AbsoluteDirection::East => self.x.checked_add(1).map(|x| Self::new(x, self.y)),
            AbsoluteDirection::South => self.y.checked_add(1).map(|y| Self::new(self.x, y)),
            AbsoluteDirection::West => self.x.checked_sub(1).map(|x| Self::new(x, self.y)),
        }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Self::new(x, y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pose {
    pub location: Coords,
    pub direction: AbsoluteDirection,
}

impl Pose {
    pub const fn new(location: Coords, direction: AbsoluteDirection) -> Self {
        Self {
            location,
            direction,
        }
    }
}
