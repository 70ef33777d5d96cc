use crate::explorer::MouseState;

/// Fire-and-forget notifications for whoever draws the maze.
pub trait MouseObserver {
    /// After every successful move or turn. `suppress_redraw` is set on a turn
    /// that is immediately followed by a move.
    fn on_mouse_moved(&mut self, _suppress_redraw: bool) {}

    fn on_mouse_changed_state(&mut self, _state: MouseState) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl MouseObserver for NullObserver {}
