//! Per-round decision countdown

use serde::{Deserialize, Serialize};

/// A single linear countdown. The owner advances it and reacts to expiry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionClock {
    remaining_secs: f64,
    running: bool,
}

impl DecisionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, limit_secs: f64) {
        self.remaining_secs = limit_secs.max(0.0);
        self.running = true;
    }

    /// Advance by `delta_secs` and return the time left. Stopped clocks don't move.
    pub fn tick(&mut self, delta_secs: f64) -> f64 {
        if self.running && delta_secs > 0.0 {
            self.remaining_secs = (self.remaining_secs - delta_secs).max(0.0);
        }
        self.remaining_secs
    }

    pub fn is_expired(&self) -> bool {
        self.running && self.remaining_secs <= 0.0
    }

    pub fn cancel(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> f64 {
        self.remaining_secs
    }
}
