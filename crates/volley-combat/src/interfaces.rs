//! Collaborators the combat logic consumes but does not implement.
//!
//! The host world provides transforms, a volumetric visibility probe and a
//! liveness check; attackers expose a movement switch; anything a projectile
//! can hurt is `Damageable`.

use glam::Vec3;
use volley_core::components::Locomotion;
use volley_core::types::{LayerMask, Pose};

/// A sphere swept from `origin` along `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeRequest {
    pub origin: Vec3,
    pub radius: f32,
    /// Unit direction.
    pub direction: Vec3,
    pub max_distance: f32,
    /// Only colliders on these layers can be hit.
    pub mask: LayerMask,
}

/// Current placement of a handle. `None` if the handle no longer resolves.
pub trait TransformLookup<H> {
    fn pose_of(&self, handle: H) -> Option<Pose>;
}

/// First blocking object along a probe, if any.
pub trait VisibilityQuery<H> {
    fn probe(&self, request: &ProbeRequest) -> Option<H>;
}

/// False once a handle is destroyed, disabled or otherwise dead.
pub trait Liveness<H> {
    fn is_alive(&self, handle: H) -> bool;
}

/// Everything a controller needs from the world during one update.
pub trait Battlefield<H>: TransformLookup<H> + VisibilityQuery<H> + Liveness<H> {}

impl<H, B> Battlefield<H> for B where B: TransformLookup<H> + VisibilityQuery<H> + Liveness<H> + ?Sized
{}

/// Something that can be hit.
pub trait Damageable {
    fn take_damage(&mut self, amount: f32);
    fn position(&self) -> Vec3;
}

/// Binary switch on an attacker's locomotion. Set, never queried.
pub trait MovementToggle {
    fn set_movement_enabled(&mut self, enabled: bool);
}

impl MovementToggle for Locomotion {
    fn set_movement_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}
