//! # micromouse
//!
//! A maze-exploring mouse that knows nothing but what its sensors tell it.
//!
//! The mouse is dropped into an unknown rectangular maze, explores it with a
//! right-first wall-following search, backtracks out of dead ends through a
//! stack of junction records, and once the map is complete routes between any
//! two cells by flood fill, minimising either distance or time.
//!
//! ## Quick Start
//!
//! ```
//! use micromouse::prelude::*;
//!
//! let start = Pose::new(Coords::new(0, 0), AbsoluteDirection::North);
//! let maze = GridMaze::new("open", 3, 3, start, Coords::new(2, 2))?
//!     .with_wall(Coords::new(1, 1), AbsoluteDirection::East)?;
//!
//! let mut mouse = Mouse::new(maze, MouseConfig::instant())?;
//! let state = mouse.solve(&mut NoPacer::default())?;
//! assert_eq!(state, MouseState::Finished);
//!
//! // Back home; drive to the far corner by the quickest route.
//! let route = mouse.goto(2, 2, CostMode::Time, &mut NoPacer::default())?;
//! assert_eq!(route.destination(), mouse.location());
//! # Ok::<(), MouseError>(())
//! ```
//!
//! ## Modules
//!
//! - [`maze`]: the ground-truth maze and the interface the mouse drives
//! - [`memory`]: what the mouse believes about the maze
//! - [`explorer`]: the exploration state machine
//! - [`planner`]: flood fill routing
//! - [`storage`]: remembering finished maps between runs

#[path = "core/direction.rs"]
pub mod direction;

#[path = "core/error.rs"]
pub mod error;

#[path = "core/grid.rs"]
pub mod grid;

#[path = "core/maze.rs"]
pub mod maze;

#[path = "core/memory.rs"]
pub mod memory;

#[path = "core/explorer.rs"]
pub mod explorer;

#[path = "core/planner.rs"]
pub mod planner;

#[path = "core/observer.rs"]
pub mod observer;

#[path = "core/perspective.rs"]
pub mod perspective;

#[path = "core/storage.rs"]
pub mod storage;

#[path = "core/config.rs"]
pub mod config;

#[path = "core/pacing.rs"]
pub mod pacing;

#[path = "core/stats.rs"]
pub mod stats;

/// Prelude module for convenient imports.
///
/// ```
/// use micromouse::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{MouseConfig, MouseSpeed};
    pub use crate::direction::{AbsoluteDirection, Coords, Pose, RelativeDirection};
    pub use crate::error::MouseError;
    pub use crate::explorer::{Mouse, MouseState, StopHandle};
    pub use crate::grid::{Cell, Grid};
    pub use crate::maze::{GridMaze, MazeLayout, MazeSize, MouseMaze, WallSpec};
    pub use crate::memory::MemoryGrid;
    pub use crate::observer::{MouseObserver, NullObserver};
    pub use crate::pacing::{NoPacer, Pacer, ThreadPacer};
    pub use crate::perspective::{CellText, MazePerspective};
    pub use crate::planner::{CostMode, Route};
    pub use crate::stats::ExplorationStats;
    pub use crate::storage::{BlobStore, MazeSnapshot, MemoryStore};
}
