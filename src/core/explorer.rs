//! The exploring mouse.
//!
//! The engine is a cooperative state machine: every call to [`Mouse::step`]
//! does one unit of work (inspect a cell and move, or replay one backtrack
//! instruction). [`Mouse::solve`] and [`Mouse::continue_exploring`] loop over
//! it, dwelling on a [`Pacer`] between steps and checking the stop flag once
//! per iteration.
//!
//! Exploration picks, in this order, the first of right, left and front that
//! is open and leads to an unexplored memory cell. The start cell is the one
//! place the mouse did not arrive from behind, so there an open back side is
//! a last resort option too. Whenever more than one option qualifies, a
//! junction record is pushed; every move and turn made while exploring is
//! appended to the top record so that a dead end can be undone by replaying
//! the record backwards.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::MouseConfig;
use crate::direction::{AbsoluteDirection, Coords, RelativeDirection};
use crate::error::MouseError;
use crate::grid::{Cell, Grid};
use crate::maze::MouseMaze;
use crate::memory::MemoryGrid;
use crate::observer::{MouseObserver, NullObserver};
use crate::pacing::{Instant, Pacer};
use crate::perspective::{cell_label, CellText, MazePerspective};
use crate::planner::{self, CostMode, Route};
use crate::stats::ExplorationStats;
use crate::storage::{memory_key, BlobStore, MazeSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseState {
    Placed,
    Exploring,
    Backtracking,
    Solved,
    Finished,
    Stuck,
}

impl MouseState {
    pub fn as_str(self) -> &'static str {
        match self {
            MouseState::Placed => "placed",
            MouseState::Exploring => "exploring",
            MouseState::Backtracking => "backtracking",
            MouseState::Solved => "solved",
            MouseState::Finished => "finished",
            MouseState::Stuck => "stuck",
        }
    }
}

/// "Face `direction`, then drive `steps` cells."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacktrackStep {
    pub direction: AbsoluteDirection,
    pub steps: u32,
}

/// The path driven since leaving `origin`, oldest instruction first.
/// `heading` is the way the mouse faced when the record was pushed; replay
/// ends facing it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Junction {
    pub origin: Coords,
    pub heading: AbsoluteDirection,
    pub path: Vec<BacktrackStep>,
}

impl Junction {
    fn at(origin: Coords, heading: AbsoluteDirection) -> Self {
        Self {
            origin,
            heading,
            path: Vec::new(),
        }
    }
}

/// A junction record being replayed backwards, one instruction per step.
#[derive(Debug, Clone)]
struct Replay {
    junction: Junction,
    mark_deadend: bool,
}

/// Cooperative cancellation flag. Cloned handles share the flag.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clears the request and reports whether there was one.
    fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

pub struct Mouse<M: MouseMaze> {
    maze: M,
    config: MouseConfig,
    memory: MemoryGrid,
    location: Coords,
    direction: AbsoluteDirection,
    /// Goal cell in memory coordinates, once found.
    cheese: Option<Coords>,
    state: MouseState,
    solved: bool,
    junctions: Vec<Junction>,
    create_new_junction: bool,
    replay: Option<Replay>,
    stats: ExplorationStats,
    stop: StopHandle,
    observer: Box<dyn MouseObserver + Send>,
    store: Option<Box<dyn BlobStore + Send>>,
}

impl<M: MouseMaze> Mouse<M> {
    /// Places a mouse in `maze`. It assumes it is facing north from the
    /// center of its memory, whatever the maze says.
    pub fn new(maze: M, config: MouseConfig) -> Result<Self, MouseError> {
        config.validate().map_err(MouseError::InvalidConfig)?;
        let size = maze.size();
        if size.width == 0 || size.height == 0 {
            return Err(MouseError::InvalidMaze("maze must be at least 1x1"));
        }
        let memory = MemoryGrid::new(size);
        let location = memory.center();
        Ok(Self {
            maze,
            config,
            memory,
            location,
            direction: AbsoluteDirection::North,
            cheese: None,
            state: MouseState::Placed,
            solved: false,
            junctions: Vec::new(),
            create_new_junction: false,
            replay: None,
            stats: ExplorationStats::new(),
            stop: StopHandle::new(),
            observer: Box::new(NullObserver),
            store: None,
        })
    }

    pub fn with_observer(mut self, observer: impl MouseObserver + Send + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Attaches a blob store and restores a finished map of this maze from
    /// it, if one was saved.
    pub fn with_store(mut self, store: impl BlobStore + Send + 'static) -> Self {
        self.store = Some(Box::new(store));
        self.recall();
        self
    }

    pub fn state(&self) -> MouseState {
        self.state
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn location(&self) -> Coords {
        self.location
    }

    pub fn direction(&self) -> AbsoluteDirection {
        self.direction
    }

    pub fn cheese(&self) -> Option<Coords> {
        self.cheese
    }

    pub fn home(&self) -> Coords {
        self.memory.center()
    }

    pub fn memory(&self) -> &MemoryGrid {
        &self.memory
    }

    pub fn stats(&self) -> ExplorationStats {
        self.stats
    }

    pub fn config(&self) -> &MouseConfig {
        &self.config
    }

    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    pub fn maze(&self) -> &M {
        &self.maze
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Takes effect at the next step boundary.
    pub fn stop(&self) {
        self.stop.stop();
    }

    // ------------------------------------------------------------------
    // Session

    /// Explores until the goal is reached. With `auto_continue` the mouse then
    /// pauses and goes on to map the rest of the maze.
    ///
    /// Returns early, without error, when stopped; calling `solve` again
    /// resumes where it left off.
    pub fn solve(&mut self, pacer: &mut dyn Pacer) -> Result<MouseState, MouseError> {
        if !self.run(pacer)? {
            return Ok(self.state);
        }
        match self.state {
            MouseState::Solved => {
                info!(
                    "Solved after {} moves ({} backtracks)",
                    self.stats.moves, self.stats.backtracks
                );
                if self.config.auto_continue {
                    pacer.dwell(self.config.solved_pause);
                    return self.continue_exploring(pacer);
                }
            }
            MouseState::Finished if self.config.return_home => {
                self.go_home(pacer)?;
            }
            _ => {}
        }
        Ok(self.state)
    }

    /// Keeps exploring until the map is finished, then optionally drives home.
    /// A mouse that has not reached the goal yet does that first.
    pub fn continue_exploring(&mut self, pacer: &mut dyn Pacer) -> Result<MouseState, MouseError> {
        self.ensure_exploring()?;
        while self.state != MouseState::Finished {
            if !self.run(pacer)? {
                return Ok(self.state);
            }
        }
        if self.config.return_home {
            self.go_home(pacer)?;
        }
        Ok(self.state)
    }

    /// One unit of exploration. Returns false once the current phase is over:
    /// the goal was reached for the first time, or the map is finished.
    pub fn step(&mut self) -> Result<bool, MouseError> {
        self.ensure_exploring()?;
        self.advance_phase()
    }

    /// Drives exploration until the phase ends (true) or a stop request is
    /// honoured (false).
    fn run(&mut self, pacer: &mut dyn Pacer) -> Result<bool, MouseError> {
        self.ensure_exploring()?;
        loop {
            if self.stop.take() {
                info!("Stopped while {}", self.state.as_str());
                return Ok(false);
            }
            if self.should_keep_exploring() {
                pacer.dwell(self.config.step_delay);
            }
            if !self.advance_phase()? {
                return Ok(true);
            }
        }
    }

    fn ensure_exploring(&mut self) -> Result<(), MouseError> {
        match self.state {
            MouseState::Finished => Err(MouseError::AlreadyFinished),
            MouseState::Stuck => Err(MouseError::Stuck),
            MouseState::Placed | MouseState::Solved => {
                self.set_state(MouseState::Exploring);
                Ok(())
            }
            MouseState::Exploring | MouseState::Backtracking => Ok(()),
        }
    }

    fn should_keep_exploring(&self) -> bool {
        if self.replay.is_some() {
            return true;
        }
        self.state != MouseState::Finished
            && if self.solved {
                !self.memory.is_complete()
            } else {
                !self.maze.has_reached_goal()
            }
    }

    fn advance_phase(&mut self) -> Result<bool, MouseError> {
        if !self.should_keep_exploring() {
            self.end_phase();
            return Ok(false);
        }
        let advanced = match self.replay.take() {
            Some(replay) => self.replay_next(replay),
            None => self.explore_step(),
        };
        advanced.map_err(|e| self.fail(e))?;
        Ok(self.state != MouseState::Finished)
    }

    fn end_phase(&mut self) {
        if self.state == MouseState::Finished {
            return;
        }
        let continuing = self.solved;
        if self.maze.has_reached_goal() {
            self.solved = true;
            self.cheese = Some(self.location);
            self.set_state(MouseState::Solved);
        }
        if continuing {
            self.finish();
        }
    }

    fn finish(&mut self) {
        if self.state == MouseState::Finished {
            return;
        }
        self.replay = None;
        self.junctions.clear();
        self.set_state(MouseState::Finished);
        info!(
            "Finished: {}/{} cells known after {} moves",
            self.memory.explored_cells(),
            self.memory.total_cells(),
            self.stats.moves
        );
        self.remember();
    }

    fn fail(&mut self, err: MouseError) -> MouseError {
        match &err {
            MouseError::Crashed { .. } => {
                error!("{err}");
                self.set_state(MouseState::Stuck);
            }
            MouseError::NoJunctions => {
                info!("Stuck: {err}");
                self.set_state(MouseState::Stuck);
            }
            _ => {}
        }
        err
    }

    fn set_state(&mut self, state: MouseState) {
        if self.state != state {
            debug!("{} -> {}", self.state.as_str(), state.as_str());
        }
        self.state = state;
        self.observer.on_mouse_changed_state(state);
    }

    // ------------------------------------------------------------------
    // Exploration

    fn explore_step(&mut self) -> Result<(), MouseError> {
        use RelativeDirection::*;

        self.inspect_current_cell();
        if self.solved && self.memory.is_complete() {
            self.finish();
            return Ok(());
        }

        let right = self.leads_somewhere_new(Right);
        let left = self.leads_somewhere_new(Left);
        let front = self.leads_somewhere_new(Front);
        let back = self.location == self.home() && self.leads_somewhere_new(Back);
        let is_deadend = self.walled(Front) && self.walled(Left) && self.walled(Right);

        let options = [right, left, front, back].into_iter().filter(|o| *o).count();
        if options > 1 {
            debug!(
                "Junction at ({}, {}) with {} options",
                self.location.x, self.location.y, options
            );
            self.junctions.push(Junction::at(self.location, self.direction));
            self.create_new_junction = false;
            self.stats.record_junction();
        }

        if right {
            self.turn(Right, true);
            self.move_forward(1, false)
        } else if left {
            self.turn(Left, true);
            self.move_forward(1, false)
        } else if front {
            self.move_forward(1, false)
        } else if back {
            self.turn(Back, true);
            self.move_forward(1, false)
        } else {
            self.begin_backtrack(is_deadend)
        }
    }

    fn inspect_current_cell(&mut self) {
        if self.memory.is_explored(self.location) {
            return;
        }
        let sensed = AbsoluteDirection::ALL
            .map(|dir| (dir, self.maze.has_wall(dir.relative_to(self.direction))));
        self.memory.record_cell(self.location, sensed);
    }

    fn walled(&self, relative: RelativeDirection) -> bool {
        self.memory
            .grid()
            .has_wall(self.location, self.direction.turned(relative))
    }

    fn leads_somewhere_new(&self, relative: RelativeDirection) -> bool {
        if self.walled(relative) {
            return false;
        }
        let dir = self.direction.turned(relative);
        self.memory
            .grid()
            .neighbor(self.location, dir)
            .is_some_and(|next| !self.memory.is_explored(next))
    }

    /// Pops the newest junction and turns around to start replaying it. With
    /// nothing left to pop, a mouse that has seen the goal is done; one that
    /// has not is stuck.
    fn begin_backtrack(&mut self, is_deadend: bool) -> Result<(), MouseError> {
        let Some(junction) = self.junctions.pop() else {
            if self.solved {
                debug!("No junctions left to revisit");
                self.finish();
                return Ok(());
            }
            return Err(MouseError::NoJunctions);
        };

        self.stats.record_backtrack();
        debug!(
            "Backtracking #{} to ({}, {})",
            self.stats.backtracks, junction.origin.x, junction.origin.y
        );
        self.set_state(MouseState::Backtracking);
        self.turn(RelativeDirection::Back, false);

        let replay = Replay {
            junction,
            // Only the leg leading out of a real dead end is marked.
            mark_deadend: is_deadend,
        };
        if replay.junction.path.is_empty() {
            self.end_backtrack(replay);
        } else {
            self.replay = Some(replay);
        }
        Ok(())
    }

    fn replay_next(&mut self, mut replay: Replay) -> Result<(), MouseError> {
        if let Some(step) = replay.junction.path.pop() {
            let heading = step.direction.opposite();
            self.turn(heading.relative_to(self.direction), true);
            let mark = std::mem::take(&mut replay.mark_deadend);
            self.move_forward(step.steps, mark)?;
        }
        if replay.junction.path.is_empty() {
            self.end_backtrack(replay);
        } else {
            self.replay = Some(replay);
        }
        Ok(())
    }

    fn end_backtrack(&mut self, replay: Replay) {
        // Still backtracking, so the turn is not recorded.
        let heading = replay.junction.heading;
        self.turn(heading.relative_to(self.direction), true);
        debug_assert_eq!(self.location, replay.junction.origin);
        debug_assert_eq!(self.direction, heading);
        self.set_state(MouseState::Exploring);
        self.create_new_junction = true;
    }

    fn turn(&mut self, relative: RelativeDirection, suppress_redraw: bool) {
        if relative == RelativeDirection::Front {
            return;
        }
        self.maze.turn(relative);
        self.direction = self.direction.turned(relative);
        self.stats.record_turn();

        if self.state == MouseState::Exploring {
            if let Some(top) = self.junctions.last_mut() {
                self.create_new_junction = false;
                top.path.push(BacktrackStep {
                    direction: self.direction,
                    steps: 0,
                });
            }
        }
        self.observer.on_mouse_moved(suppress_redraw);
    }

    /// Moves the real mouse and mirrors the move in memory. A refused move is
    /// a crash: the engine only drives where it believes the way is open.
    fn move_forward(&mut self, cells: u32, mark_deadend: bool) -> Result<(), MouseError> {
        if cells == 0 {
            return Ok(());
        }
        let start = self.location;
        if !self.maze.move_forward(cells) {
            return Err(MouseError::Crashed {
                at: start,
                heading: self.direction,
            });
        }
        for _ in 0..cells {
            if mark_deadend {
                self.memory.mark_deadend(self.location);
            }
            self.location = self
                .memory
                .grid()
                .neighbor(self.location, self.direction)
                .ok_or_else(|| MouseError::out_of_bounds(self.location))?;
        }
        self.stats.record_move(cells);

        if self.state == MouseState::Exploring && !self.junctions.is_empty() {
            if self.create_new_junction {
                self.create_new_junction = false;
                self.junctions.push(Junction::at(start, self.direction));
            }
            if let Some(top) = self.junctions.last_mut() {
                match top.path.last_mut() {
                    Some(last) => last.steps += cells,
                    None => top.path.push(BacktrackStep {
                        direction: self.direction,
                        steps: cells,
                    }),
                }
            }
        }
        self.observer.on_mouse_moved(false);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Routing

    /// Plans a route to `location + (dx, dy)` over the finished map without
    /// moving. Offsets are in the mouse's own frame (north is where it first
    /// faced). A destination the map does not connect to the mouse, such as
    /// one outside the maze, is out of bounds.
    pub fn plan_route(&mut self, dx: i32, dy: i32, mode: CostMode) -> Result<Route, MouseError> {
        if self.state != MouseState::Finished {
            warn!("Must finish maze first!");
            return Err(MouseError::NotFinished);
        }
        let dest = self
            .location
            .offset(dx, dy)
            .ok_or(MouseError::OutOfBounds {
                x: self.location.x as i64 + dx as i64,
                y: self.location.y as i64 + dy as i64,
            })?;
        planner::plan(self.memory.grid_mut(), self.location, dest, mode)
    }

    /// Plans and drives a route. The mode also becomes the one used for going
    /// home and for [`CellText::PathBy`] labels.
    pub fn goto(
        &mut self,
        dx: i32,
        dy: i32,
        mode: CostMode,
        pacer: &mut dyn Pacer,
    ) -> Result<Route, MouseError> {
        self.config.cost_mode = mode;
        let started = Instant::now();
        let route = self.plan_route(dx, dy, mode)?;
        debug!(
            "Goto ({}, {}) -> ({}, {}) by {}",
            dx,
            dy,
            route.destination().x,
            route.destination().y,
            mode.as_str()
        );

        for step in &route.steps {
            self.turn(step.heading.relative_to(self.direction), true);
            self.move_forward(1, false).map_err(|e| self.fail(e))?;
            pacer.dwell(self.config.step_delay);
        }
        info!(
            "Route of {} cells ({} cost {:.1}) took {}ms",
            route.len(),
            mode.as_str(),
            route.cost(),
            started.elapsed().as_millis()
        );
        Ok(route)
    }

    /// Drives back to the cell the mouse started from.
    pub fn go_home(&mut self, pacer: &mut dyn Pacer) -> Result<Route, MouseError> {
        let home = self.memory.center();
        let dx = home.x as i32 - self.location.x as i32;
        let dy = home.y as i32 - self.location.y as i32;
        self.goto(dx, dy, self.config.cost_mode, pacer)
    }

    // ------------------------------------------------------------------
    // Persistence

    /// Saves the map under this maze's key. Only finished maps are kept.
    pub fn remember(&mut self) -> bool {
        if self.state != MouseState::Finished {
            return false;
        }
        let Some(store) = self.store.as_mut() else {
            return false;
        };
        let snapshot = MazeSnapshot {
            board: self.memory.clone(),
            cheese: self.cheese,
            total_cells: self.memory.total_cells(),
            explored_cells: self.memory.explored_cells(),
            state: self.state,
        };
        match snapshot.to_json() {
            Ok(json) => {
                store.set(&memory_key(self.maze.name()), &json);
                debug!("Remembered maze {}", self.maze.name());
                true
            }
            Err(e) => {
                warn!("Failed to serialize maze memory: {e}");
                false
            }
        }
    }

    /// Restores a saved map, skipping exploration entirely. Snapshots that do
    /// not fit this maze are ignored.
    pub fn recall(&mut self) -> bool {
        let Some(store) = self.store.as_ref() else {
            return false;
        };
        let key = memory_key(self.maze.name());
        let Some(json) = store.get(&key) else {
            return false;
        };
        let snapshot = match MazeSnapshot::from_json(&json) {
            Ok(s) => s,
            Err(e) => {
                warn!("Ignoring unreadable maze memory {key}: {e}");
                return false;
            }
        };

        let expected = MemoryGrid::new(self.maze.size());
        let board = snapshot.board.grid();
        if board.width() != expected.grid().width()
            || board.height() != expected.grid().height()
            || snapshot.total_cells != expected.total_cells()
            || snapshot.state != MouseState::Finished
        {
            warn!("Ignoring maze memory {key}: it does not match this maze");
            return false;
        }

        self.memory = snapshot.board;
        self.cheese = snapshot.cheese;
        self.location = self.memory.center();
        self.direction = AbsoluteDirection::North;
        self.junctions.clear();
        self.replay = None;
        self.solved = true;
        self.set_state(MouseState::Finished);
        info!(
            "Recalled maze {} ({}/{} cells known)",
            self.maze.name(),
            self.memory.explored_cells(),
            self.memory.total_cells()
        );
        true
    }

    /// Drops the saved map of this maze. The current memory is kept.
    pub fn forget_maze(&mut self) {
        if let Some(store) = self.store.as_mut() {
            store.remove(&memory_key(self.maze.name()));
            info!("Forgot maze {}", self.maze.name());
        }
    }
}

impl<M: MouseMaze> MazePerspective for Mouse<M> {
    fn board(&self) -> &Grid {
        self.memory.grid()
    }

    fn win_location(&self) -> Option<Coords> {
        self.cheese
    }

    fn mouse_location(&self) -> Coords {
        self.location
    }

    fn mouse_direction(&self) -> AbsoluteDirection {
        self.direction
    }

    fn text(&self, cell: &Cell, what: CellText) -> String {
        cell_label(cell, what, self.config.cost_mode)
    }
}
