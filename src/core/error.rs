use thiserror::Error;

use crate::direction::{AbsoluteDirection, Coords};

/// Everything the engine can refuse or fail at.
///
/// Blocked moves are reported by [`crate::maze::MouseMaze::move_forward`] as a
/// plain `false`; the engine only escalates to [`MouseError::Crashed`] when a
/// move it believed legal was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MouseError {
    #[error("crashed into a wall at ({}, {}) heading {}", .at.x, .at.y, .heading.as_str())]
    Crashed {
        at: Coords,
        heading: AbsoluteDirection,
    },

    #[error("no more junctions to backtrack to and the goal was never reached")]
    NoJunctions,

    #[error("mouse is stuck; load a different maze or forget this one")]
    Stuck,

    #[error("maze already finished; exploration has nothing left to do")]
    AlreadyFinished,

    #[error("must finish maze first")]
    NotFinished,

    #[error("got stuck at ({}, {}) while following the flood fill", .at.x, .at.y)]
    PlannerStuck { at: Coords },

    #[error("({x}, {y}) is outside the grid")]
    OutOfBounds { x: i64, y: i64 },

    #[error("invalid maze: {0}")]
    InvalidMaze(&'static str),

    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

impl MouseError {
    pub fn out_of_bounds(at: Coords) -> Self {
        MouseError::OutOfBounds {
            x: at.x as i64,
            y: at.y as i64,
        }
    }

    /// Fatal errors leave the engine in an inconsistent or terminal state.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MouseError::Crashed { .. }
                | MouseError::NoJunctions
                | MouseError::Stuck
                | MouseError::PlannerStuck { .. }
        )
    }
}
