//! The supervisor prints the board at a fixed interval and detects the end
//! of the game.

use std::thread;
use std::time::Duration;

use tracing::info;

use crate::state::{SharedState, StopReason};

/// Periodic whole-board printer and completion detector.
#[derive(Debug, Clone, Copy)]
pub struct Supervisor {
    interval: Duration,
}

impl Supervisor {
    pub fn new(interval: Duration) -> Self {
        Supervisor { interval }
    }

    /// Sleeps, publishes a consistent snapshot, and repeats until every
    /// player has given up or termination was requested.
    ///
    /// When the players are all done the supervisor raises the termination
    /// flag itself so the remaining cooperative threads wind down. Returns
    /// the reason the game stopped and the number of boards published.
    pub fn run(&self, state: &SharedState) -> (StopReason, u64) {
        let mut published = 0u64;
        loop {
            thread::sleep(self.interval);
            state.publish_snapshot();
            published += 1;

            if let Some(reason) = state.stop_reason() {
                info!(?reason, published, "supervisor stopping");
                return (reason, published);
            }
            if state.all_gave_up() {
                state.request_stop(StopReason::AllGaveUp);
                // A termination event may have landed first.
                let reason = state.stop_reason().unwrap_or(StopReason::AllGaveUp);
                info!(?reason, published, "all players gave up");
                return (reason, published);
            }
        }
    }
}
