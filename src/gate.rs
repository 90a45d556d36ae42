//! Action gate for the input boundary
//!
//! Touch screens tend to fire the same button twice. Each connection keeps a
//! gate and drops game actions that arrive too soon after the last accepted one.

use std::time::{Duration, Instant};

pub const DEFAULT_MIN_GAP: Duration = Duration::from_millis(350);

#[derive(Debug, Clone)]
pub struct ActionGate {
    min_gap: Duration,
    last_accepted: Option<Instant>,
}

impl Default for ActionGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_GAP)
    }
}

impl ActionGate {
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_accepted: None,
        }
    }

    /// Returns true (and arms the gate) if the action may proceed
    pub fn allow(&mut self) -> bool {
        self.allow_at(Instant::now())
    }

    pub fn allow_at(&mut self, now: Instant) -> bool {
        match self.last_accepted {
            Some(last) if now.saturating_duration_since(last) < self.min_gap => false,
            _ => {
                self.last_accepted = Some(now);
                true
            }
        }
    }
}
