//! Cancellable one-shot timers
//!
//! Frame-driven replacement for scheduled callbacks: the owner arms a timer,
//! advances it with the frame delta and reacts when `advance` reports that it
//! fired. Dropping or cancelling the owner cancels the timer, so a reset can
//! never land on state that no longer exists.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OneShotTimer {
    remaining_ms: Option<f32>,
}

impl OneShotTimer {
    /// A timer that is already armed
    pub fn armed(delay_ms: f32) -> Self {
        Self {
            remaining_ms: Some(delay_ms.max(0.0)),
        }
    }

    /// Arm (or re-arm) the timer; any pending firing is replaced
    pub fn arm(&mut self, delay_ms: f32) {
        self.remaining_ms = Some(delay_ms.max(0.0));
    }

    pub fn cancel(&mut self) {
        self.remaining_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining_ms.is_some()
    }

    pub fn remaining_ms(&self) -> Option<f32> {
        self.remaining_ms
    }

    /// Advance by `dt_ms`. Returns true exactly once, on the frame the timer
    /// runs out; the timer is disarmed afterwards.
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        match self.remaining_ms {
            Some(remaining) => {
                let left = remaining - dt_ms;
                if left <= 0.0 {
                    self.remaining_ms = None;
                    true
                } else {
                    self.remaining_ms = Some(left);
                    false
                }
            }
            None => false,
        }
    }
}
