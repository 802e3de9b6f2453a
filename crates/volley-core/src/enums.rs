//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Attack cycle state of one controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CyclePhase {
    /// No cycle running.
    #[default]
    Idle,
    /// Cycle started, first scan pending.
    Scanning,
    /// Last scan found a visible target. Movement locked, shot attempted.
    Engaging,
    /// Last scan found nothing visible. Movement unlocked, retrying.
    RetreatingUnlocked,
}

/// The step a running cycle will execute at its next wake-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleStep {
    /// Pick the first visible candidate and fire.
    Scan,
    /// Re-check the current target and purge dead candidates.
    Recheck,
}

/// Why a cycle returned to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The target set became empty.
    TargetsExhausted,
    /// The cycle's cancellation token was triggered, or `stop` was called.
    Cancelled,
}

/// Why a candidate left a target set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    /// Left the engagement volume.
    LeftRange,
    /// Purged because it was dead, disabled or despawned.
    Invalid,
}
