//! The dwell between engine steps.
//!
//! The engine never sleeps on its own; it hands every pause to a [`Pacer`] so
//! tests can run the state machine without real time passing.

pub use core::time::Duration;

// No usable monotonic clock in std on wasm32-unknown-unknown; route timing
// through the browser clock there.
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

pub trait Pacer {
    fn dwell(&mut self, period: Duration);
}

/// Blocks the calling thread for the requested period.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn dwell(&mut self, period: Duration) {
        if !period.is_zero() {
            std::thread::sleep(period);
        }
    }
}

/// Never waits. Counts how often it was asked to.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPacer {
    pub dwells: u64,
}

impl Pacer for NoPacer {
    fn dwell(&mut self, _period: Duration) {
        self.dwells += 1;
    }
}
