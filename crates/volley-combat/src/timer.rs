//! Scheduling primitives for the cooperative attack cycle.
//!
//! A running cycle holds exactly one `ScheduledStep`; the controller
//! executes it once the clock reaches `due_at`. Each cycle also owns a
//! `CancellationToken` that outside code may trigger; the controller
//! notices on its next update and stops with movement unlocked.

use std::cell::Cell;
use std::rc::Rc;

use volley_core::constants::SCHEDULE_EPSILON;
use volley_core::enums::CycleStep;

/// Shared cancellation flag for one attack cycle.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// The next step of a running cycle and when it wakes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledStep {
    pub step: CycleStep,
    pub due_at: f64,
}

impl ScheduledStep {
    pub fn new(step: CycleStep, due_at: f64) -> Self {
        Self { step, due_at }
    }

    pub fn is_due(&self, now: f64) -> bool {
        now + SCHEDULE_EPSILON >= self.due_at
    }
}
