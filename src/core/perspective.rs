use serde::{Deserialize, Serialize};

use crate::direction::{AbsoluteDirection, Coords};
use crate::grid::{Cell, Grid};
use crate::planner::CostMode;

/// Which annotation a renderer wants printed inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellText {
    Time,
    Distance,
    /// "D" on dead ends, otherwise the cost of the active routing mode.
    PathBy,
    Deadend,
}

/// One view of a maze for drawing. The ground truth and the mouse's memory
/// both implement it, each in its own coordinate frame.
pub trait MazePerspective {
    fn board(&self) -> &Grid;

    fn win_location(&self) -> Option<Coords>;

    fn mouse_location(&self) -> Coords;

    fn mouse_direction(&self) -> AbsoluteDirection;

    fn width(&self) -> u32 {
        self.board().width()
    }

    fn height(&self) -> u32 {
        self.board().height()
    }

    /// Empty when there is nothing to show.
    fn text(&self, _cell: &Cell, _what: CellText) -> String {
        String::new()
    }
}

/// Labels for a cell scored by the planner. Zero and unset both print as
/// nothing, so the destination cell stays blank.
pub fn cell_label(cell: &Cell, what: CellText, mode: CostMode) -> String {
    let time = || match cell.time {
        Some(t) if t != 0.0 => format!("{}", (t * 10.0).round() / 10.0),
        _ => String::new(),
    };
    let distance = || match cell.distance {
        Some(d) if d != 0 => d.to_string(),
        _ => String::new(),
    };
    match what {
        CellText::Time => time(),
        CellText::Distance => distance(),
        CellText::PathBy if cell.deadend => "D".to_string(),
        CellText::PathBy => match mode {
            CostMode::Distance => distance(),
            CostMode::Time => time(),
        },
        CellText::Deadend if cell.deadend => "D".to_string(),
        CellText::Deadend => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(distance: u32, time: f32) -> Cell {
        Cell {
            distance: Some(distance),
            time: Some(time),
            ..Cell::default()
        }
    }

    #[test]
    fn time_is_rounded_to_one_decimal() {
        let cell = scored(4, 2.2999);
        assert_eq!(cell_label(&cell, CellText::Time, CostMode::Distance), "2.3");
        assert_eq!(cell_label(&cell, CellText::Distance, CostMode::Time), "4");
        assert_eq!(cell_label(&scored(0, 0.0), CellText::Time, CostMode::Time), "");
    }

    #[test]
    fn path_by_prefers_the_deadend_marker() {
        let mut cell = scored(3, 1.1);
        assert_eq!(cell_label(&cell, CellText::PathBy, CostMode::Distance), "3");
        assert_eq!(cell_label(&cell, CellText::PathBy, CostMode::Time), "1.1");
        assert_eq!(cell_label(&cell, CellText::Deadend, CostMode::Time), "");
        cell.deadend = true;
        assert_eq!(cell_label(&cell, CellText::PathBy, CostMode::Time), "D");
        assert_eq!(cell_label(&cell, CellText::Deadend, CostMode::Time), "D");
    }
}
