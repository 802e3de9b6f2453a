//! Commands sent to the arena from scenarios, tools or tests.
//!
//! Commands are queued and applied at the next tick boundary.
//! Entities are addressed by their 64-bit ids as they appear in snapshots.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// All possible arena mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArenaCommand {
    // --- Population ---
    /// Spawn a damageable candidate.
    SpawnCandidate {
        position: Vec3,
        #[serde(default)]
        velocity: Vec3,
        health: f32,
        radius: f32,
    },
    /// Spawn a sphere obstacle.
    SpawnObstacle { position: Vec3, radius: f32 },
    /// Remove an entity from the world entirely.
    Despawn { id: u64 },

    // --- Candidate control ---
    /// Teleport an entity.
    Teleport { id: u64, position: Vec3 },
    /// Change a candidate's velocity.
    SetVelocity { id: u64, velocity: Vec3 },
    /// Disable an entity without despawning it.
    Disable { id: u64 },
    /// Re-enable a disabled entity.
    Enable { id: u64 },
    /// Apply damage directly to a candidate.
    Damage { id: u64, amount: f32 },

    // --- Attacker control ---
    /// Cancel the attacker's running cycle.
    CancelAttack { attacker: u64 },
    /// Set or clear the attacker's locomotion goal.
    SetGoal { attacker: u64, goal: Option<Vec3> },
}

impl ArenaCommand {
    /// The entity this command addresses, if any.
    pub fn target(&self) -> Option<u64> {
        match self {
            ArenaCommand::SpawnCandidate { .. } | ArenaCommand::SpawnObstacle { .. } => None,
            ArenaCommand::Despawn { id }
            | ArenaCommand::Teleport { id, .. }
            | ArenaCommand::SetVelocity { id, .. }
            | ArenaCommand::Disable { id }
            | ArenaCommand::Enable { id }
            | ArenaCommand::Damage { id, .. } => Some(*id),
            ArenaCommand::CancelAttack { attacker } | ArenaCommand::SetGoal { attacker, .. } => {
                Some(*attacker)
            }
        }
    }

    /// Point the command at entity `id`. Spawn commands are returned as is.
    pub fn retarget(mut self, new_id: u64) -> Self {
        match &mut self {
            ArenaCommand::SpawnCandidate { .. } | ArenaCommand::SpawnObstacle { .. } => {}
            ArenaCommand::Despawn { id }
            | ArenaCommand::Teleport { id, .. }
            | ArenaCommand::SetVelocity { id, .. }
            | ArenaCommand::Disable { id }
            | ArenaCommand::Enable { id }
            | ArenaCommand::Damage { id, .. } => *id = new_id,
            ArenaCommand::CancelAttack { attacker } | ArenaCommand::SetGoal { attacker, .. } => {
                *attacker = new_id
            }
        }
        self
    }
}
