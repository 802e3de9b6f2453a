//! Events emitted by attack controllers for UI, audio and test feedback.
//!
//! Generic over the candidate handle type so the pure combat logic can be
//! driven with plain integers while the arena uses ECS entities.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Something an attack controller did during an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CombatEvent<H> {
    /// A cycle started because a candidate entered an idle attacker's range.
    CycleStarted { attacker: H },
    /// A cycle returned to idle.
    CycleStopped { attacker: H, reason: StopReason },
    /// A visible target was newly acquired.
    AttackStarted { attacker: H, target: H },
    /// A projectile was taken from the pool and launched.
    ShotFired {
        attacker: H,
        target: H,
        /// Pool slot of the launched projectile.
        projectile: u32,
    },
    /// A target was visible but the pool had nothing to hand out.
    ShotSkipped { attacker: H, target: H },
    /// Locomotion was switched off.
    MovementLocked { attacker: H },
    /// Locomotion was switched back on.
    MovementReleased { attacker: H },
    /// A candidate left the target set.
    CandidateRemoved {
        attacker: H,
        candidate: H,
        cause: RemovalCause,
    },
    /// A projectile struck a damageable candidate.
    ProjectileHit { target: H, damage: f32 },
    /// A candidate's health reached zero.
    CandidateKilled { target: H },
}

impl<H> CombatEvent<H> {
    /// Re-key the event with a different handle type.
    pub fn map_handle<K>(self, mut f: impl FnMut(H) -> K) -> CombatEvent<K> {
        match self {
            CombatEvent::CycleStarted { attacker } => CombatEvent::CycleStarted {
                attacker: f(attacker),
            },
            CombatEvent::CycleStopped { attacker, reason } => CombatEvent::CycleStopped {
                attacker: f(attacker),
                reason,
            },
            CombatEvent::AttackStarted { attacker, target } => CombatEvent::AttackStarted {
                attacker: f(attacker),
                target: f(target),
            },
            CombatEvent::ShotFired {
                attacker,
                target,
                projectile,
            } => CombatEvent::ShotFired {
                attacker: f(attacker),
                target: f(target),
                projectile,
            },
            CombatEvent::ShotSkipped { attacker, target } => CombatEvent::ShotSkipped {
                attacker: f(attacker),
                target: f(target),
            },
            CombatEvent::MovementLocked { attacker } => CombatEvent::MovementLocked {
                attacker: f(attacker),
            },
            CombatEvent::MovementReleased { attacker } => CombatEvent::MovementReleased {
                attacker: f(attacker),
            },
            CombatEvent::CandidateRemoved {
                attacker,
                candidate,
                cause,
            } => CombatEvent::CandidateRemoved {
                attacker: f(attacker),
                candidate: f(candidate),
                cause,
            },
            CombatEvent::ProjectileHit { target, damage } => CombatEvent::ProjectileHit {
                target: f(target),
                damage,
            },
            CombatEvent::CandidateKilled { target } => CombatEvent::CandidateKilled {
                target: f(target),
            },
        }
    }
}
