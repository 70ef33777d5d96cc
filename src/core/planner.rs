//! Point-to-point routing over a finished memory grid.
//!
//! Costs are flooded outward from the destination, then the route is read off
//! by walking downhill from the source. The fill is a depth-first relaxation:
//! a cell is revisited whenever a cheaper arrival is found, so with the `Time`
//! metric the value a cell ends up with depends on visiting order. The order
//! is fixed (north, south, west, east) which keeps routes reproducible.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::direction::{AbsoluteDirection, Coords};
use crate::error::MouseError;
use crate::grid::{Cell, Grid};

/// Straight continuation is cheap under [`CostMode::Time`]; turning is not.
pub const STRAIGHT_COST: f32 = 0.1;
pub const TURN_COST: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostMode {
    /// One unit per cell.
    Distance,
    /// Weighs turns against straight runs.
    #[default]
    Time,
}

impl CostMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CostMode::Distance => "distance",
            CostMode::Time => "time",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "distance" | "d" => Some(CostMode::Distance),
            "time" | "t" => Some(CostMode::Time),
            _ => None,
        }
    }

    /// The annotation this mode compares, if the fill reached the cell.
    pub fn cost_of(self, cell: &Cell) -> Option<f32> {
        match self {
            CostMode::Distance => cell.distance.map(|d| d as f32),
            CostMode::Time => cell.time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub heading: AbsoluteDirection,
    pub to: Coords,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub from: Coords,
    pub mode: CostMode,
    pub steps: Vec<RouteStep>,
}

impl Route {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn destination(&self) -> Coords {
        self.steps.last().map_or(self.from, |s| s.to)
    }

    pub fn cells(&self) -> impl Iterator<Item = Coords> + '_ {
        self.steps.iter().map(|s| s.to)
    }

    pub fn turns(&self) -> usize {
        self.steps
            .windows(2)
            .filter(|w| w[0].heading != w[1].heading)
            .count()
    }

    /// What the route costs under its own mode. Under `Time` the first move
    /// is charged as a turn since the starting heading plays no part in the fill.
    pub fn cost(&self) -> f32 {
        match self.mode {
            CostMode::Distance => self.steps.len() as f32,
            CostMode::Time => {
                let mut total = 0.0;
                let mut prev: Option<AbsoluteDirection> = None;
                for step in &self.steps {
                    total += step_cost(prev, step.heading);
                    prev = Some(step.heading);
                }
                total
            }
        }
    }
}

fn step_cost(prev: Option<AbsoluteDirection>, heading: AbsoluteDirection) -> f32 {
    if prev == Some(heading) {
        STRAIGHT_COST
    } else {
        TURN_COST
    }
}

struct Frontier {
    at: Coords,
    distance: u32,
    time: f32,
    heading: Option<AbsoluteDirection>,
}

/// Fills `distance` and `time` on every cell reachable from `dest` without
/// passing through `source`. All planning flags are cleared first; `explored`
/// marks a cell the fill has scored. `source` itself stays unscored.
pub fn flood_fill(grid: &mut Grid, source: Coords, dest: Coords, mode: CostMode) {
    use AbsoluteDirection::*;

    grid.reset_planning();
    let mut stack = vec![Frontier {
        at: dest,
        distance: 0,
        time: 0.0,
        heading: None,
    }];

    while let Some(next) = stack.pop() {
        if next.at == source {
            continue;
        }
        let Some(cell) = grid.cell_mut(next.at) else {
            continue;
        };
        if cell.explored {
            let known = mode.cost_of(cell);
            let offered = match mode {
                CostMode::Distance => next.distance as f32,
                CostMode::Time => next.time,
            };
            if known.is_some_and(|k| k <= offered) {
                continue;
            }
        }
        cell.explored = true;
        cell.distance = Some(next.distance);
        cell.time = Some(next.time);

        // Pushed in reverse so north is expanded first.
        for dir in [East, West, South, North] {
            if grid.has_wall(next.at, dir) {
                continue;
            }
            let Some(to) = grid.neighbor(next.at, dir) else {
                continue;
            };
            stack.push(Frontier {
                at: to,
                distance: next.distance + 1,
                time: next.time + step_cost(next.heading, dir),
                heading: Some(dir),
            });
        }
    }
}

/// Walks downhill from `source` to `dest` over a filled grid, marking cells
/// visited on the way. Each move goes to the open, unvisited neighbour with
/// the strictly lowest cost, checked north, south, east, west.
pub fn descend(
    grid: &mut Grid,
    source: Coords,
    dest: Coords,
    mode: CostMode,
) -> Result<Route, MouseError> {
    use AbsoluteDirection::*;

    let mut route = Route {
        from: source,
        mode,
        steps: Vec::new(),
    };
    let mut at = source;
    while at != dest {
        match grid.cell_mut(at) {
            Some(cell) => cell.visited = true,
            None => return Err(MouseError::out_of_bounds(at)),
        }

        let mut best: Option<(f32, AbsoluteDirection, Coords)> = None;
        for dir in [North, South, East, West] {
            if grid.has_wall(at, dir) {
                continue;
            }
            let Some(next) = grid.neighbor(at, dir) else {
                continue;
            };
            let Some(cell) = grid.cell(next) else {
                continue;
            };
            if cell.visited {
                continue;
            }
            let Some(cost) = mode.cost_of(cell) else {
                continue;
            };
            if best.map_or(true, |(b, _, _)| cost < b) {
                best = Some((cost, dir, next));
            }
        }

        let Some((_, heading, next)) = best else {
            error!("Got stuck at ({}, {}) following {} costs", at.x, at.y, mode.as_str());
            return Err(MouseError::PlannerStuck { at });
        };
        route.steps.push(RouteStep { heading, to: next });
        at = next;
    }
    Ok(route)
}

/// True when the fill scored some open neighbour of `source`, i.e. the
/// destination is connected to it.
pub fn reaches(grid: &Grid, source: Coords, mode: CostMode) -> bool {
    AbsoluteDirection::ALL.into_iter().any(|dir| {
        !grid.has_wall(source, dir)
            && grid
                .neighbor(source, dir)
                .and_then(|n| grid.cell(n))
                .is_some_and(|c| mode.cost_of(c).is_some())
    })
}

/// Flood fill followed by descent. A destination the fill cannot connect to
/// `source` is reported as out of bounds rather than left for the descent to
/// trip over.
pub fn plan(
    grid: &mut Grid,
    source: Coords,
    dest: Coords,
    mode: CostMode,
) -> Result<Route, MouseError> {
    if !grid.contains(dest) {
        return Err(MouseError::out_of_bounds(dest));
    }
    flood_fill(grid, source, dest, mode);
    if source != dest && !reaches(grid, source, mode) {
        warn!("({}, {}) is not connected to ({}, {})", dest.x, dest.y, source.x, source.y);
        return Err(MouseError::out_of_bounds(dest));
    }
    let route = descend(grid, source, dest, mode)?;
    debug!(
        "Planned {} route: {} cells, {} turns, cost {:.1}",
        mode.as_str(),
        route.len(),
        route.turns(),
        route.cost()
    );
    Ok(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::fixtures;
    use AbsoluteDirection::*;

    fn zigzag_grid() -> Grid {
        fixtures::zigzag_vs_corridor().grid().clone()
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn fill_scores_from_the_destination_outward() {
        let mut g = zigzag_grid();
        let source = Coords::new(0, 0);
        let dest = Coords::new(4, 0);
        flood_fill(&mut g, source, dest, CostMode::Time);

        let at = |x, y| g.cell(Coords::new(x, y)).unwrap().clone();
        assert_eq!(at(4, 0).distance, Some(0));
        assert!(approx(at(0, 1).time.unwrap(), 3.4));
        assert!(approx(at(1, 0).time.unwrap(), 4.1));
        assert_eq!(at(1, 0).distance, Some(5));
        assert_eq!(at(0, 1).distance, Some(7));
        // The source is never scored.
        assert_eq!(at(0, 0).distance, None);
        assert!(!at(0, 0).explored);
    }

    #[test]
    fn distance_takes_the_zigzag() {
        let mut g = zigzag_grid();
        let route = plan(&mut g, Coords::new(0, 0), Coords::new(4, 0), CostMode::Distance).unwrap();
        let cells: Vec<_> = route.cells().map(|c| (c.x, c.y)).collect();
        assert_eq!(cells, vec![(1, 0), (1, 1), (2, 1), (3, 1), (3, 0), (4, 0)]);
        assert_eq!(route.cost(), 6.0);
        assert_eq!(route.turns(), 4);
    }

    #[test]
    fn time_takes_the_long_straight_way() {
        let mut g = zigzag_grid();
        let route = plan(&mut g, Coords::new(0, 0), Coords::new(4, 0), CostMode::Time).unwrap();
        let cells: Vec<_> = route.cells().map(|c| (c.x, c.y)).collect();
        assert_eq!(
            cells,
            vec![(0, 1), (0, 2), (1, 2), (2, 2), (3, 2), (4, 2), (4, 1), (4, 0)]
        );
        assert!(approx(route.cost(), 3.5));
        assert_eq!(route.steps[0].heading, South);
        assert_eq!(route.destination(), Coords::new(4, 0));
    }

    #[test]
    fn planning_twice_is_identical() {
        let mut g = zigzag_grid();
        for mode in [CostMode::Distance, CostMode::Time] {
            let a = plan(&mut g, Coords::new(0, 2), Coords::new(2, 0), mode).unwrap();
            let scored_a = g.clone();
            let b = plan(&mut g, Coords::new(0, 2), Coords::new(2, 0), mode).unwrap();
            assert_eq!(a, b);
            assert_eq!(scored_a, g);
        }
    }

    #[test]
    fn sealed_destination_is_out_of_bounds() {
        let mut g = fixtures::unreachable_goal().grid().clone();
        let err = plan(&mut g, Coords::new(0, 3), Coords::new(3, 0), CostMode::Distance)
            .unwrap_err();
        assert_eq!(err, MouseError::OutOfBounds { x: 3, y: 0 });
        assert!(!err.is_fatal());
    }

    #[test]
    fn descending_an_unfilled_grid_gets_stuck() {
        let mut g = zigzag_grid();
        let err = descend(&mut g, Coords::new(0, 0), Coords::new(4, 0), CostMode::Time)
            .unwrap_err();
        assert_eq!(
            err,
            MouseError::PlannerStuck {
                at: Coords::new(0, 0)
            }
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn source_equal_to_destination_is_an_empty_route() {
        let mut g = zigzag_grid();
        let route = plan(&mut g, Coords::new(2, 1), Coords::new(2, 1), CostMode::Time).unwrap();
        assert!(route.is_empty());
        assert_eq!(route.cost(), 0.0);
        assert!(plan(&mut g, Coords::new(2, 1), Coords::new(9, 9), CostMode::Time).is_err());
    }
}
