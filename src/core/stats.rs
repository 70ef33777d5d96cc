use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationStats {
    /// Cells travelled, including backtracking and routed moves.
    pub moves: u32,
    pub turns: u32,
    pub backtracks: u32,
    pub junctions: u32,
}

impl ExplorationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_move(&mut self, cells: u32) {
        self.moves = self.moves.saturating_add(cells);
    }

    pub fn record_turn(&mut self) {
        self.turns = self.turns.saturating_add(1);
    }

    pub fn record_backtrack(&mut self) {
        self.backtracks = self.backtracks.saturating_add(1);
    }

    pub fn record_junction(&mut self) {
        self.junctions = self.junctions.saturating_add(1);
    }
}
