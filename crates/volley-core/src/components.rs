//! ECS components for hecs entities.
//!
//! Components are plain data structs with no game logic.
//! Logic lives in systems, not components.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::types::LayerMask;

/// Marks an entity that can be attacked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Candidate;

/// Marks static geometry that blocks probes and projectiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Obstacle;

/// Marks an entity driven by an attack controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Attacker;

/// Whether the entity takes part in the simulation. Disabled entities are
/// invisible to probes, ignored by projectiles and fail liveness checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enabled(pub bool);

/// Linear velocity (m/s).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub Vec3);

/// Hit points of a damageable entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

/// Sphere collider used by probes and projectile impacts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub radius: f32,
    pub layer: LayerMask,
    /// Sphere center relative to the entity position.
    #[serde(default)]
    pub offset: Vec3,
}

impl Collider {
    pub fn center(&self, position: Vec3) -> Vec3 {
        position + self.offset
    }
}

/// Attacker locomotion. `enabled` is the movement toggle the attack
/// controller switches; the controller never reads it back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Locomotion {
    pub enabled: bool,
    /// Point the attacker walks toward while enabled.
    pub goal: Option<Vec3>,
    /// Walking speed (m/s).
    pub speed: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}
