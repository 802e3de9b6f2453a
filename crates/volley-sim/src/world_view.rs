//! Adapters that expose the hecs world through the combat traits.
//!
//! Components are borrowed per call, so a `WorldView`, a `LocomotionHandle`
//! and a `CandidateBody` may coexist over the same `&World`.

use glam::Vec3;
use hecs::{Entity, World};

use volley_combat::{Damageable, Liveness, MovementToggle, ProbeRequest, TransformLookup, VisibilityQuery};
use volley_core::components::{Enabled, Health, Locomotion};
use volley_core::types::Pose;

use crate::visibility;

/// Read-only view of the arena for attack controllers.
#[derive(Clone, Copy)]
pub struct WorldView<'w> {
    world: &'w World,
}

impl<'w> WorldView<'w> {
    pub fn new(world: &'w World) -> Self {
        Self { world }
    }
}

impl TransformLookup<Entity> for WorldView<'_> {
    fn pose_of(&self, handle: Entity) -> Option<Pose> {
        self.world.get::<&Pose>(handle).ok().map(|pose| *pose)
    }
}

impl VisibilityQuery<Entity> for WorldView<'_> {
    fn probe(&self, request: &ProbeRequest) -> Option<Entity> {
        visibility::sphere_cast(self.world, request)
    }
}

impl Liveness<Entity> for WorldView<'_> {
    fn is_alive(&self, handle: Entity) -> bool {
        is_alive(self.world, handle)
    }
}

/// Present, enabled and, if it has health, not dead.
pub fn is_alive(world: &World, entity: Entity) -> bool {
    if !world.contains(entity) {
        return false;
    }
    let enabled = world.get::<&Enabled>(entity).is_ok_and(|enabled| enabled.0);
    let dead = world
        .get::<&Health>(entity)
        .is_ok_and(|health| health.is_dead());
    enabled && !dead
}

/// Movement switch bound to one attacker's `Locomotion` component.
pub struct LocomotionHandle<'w> {
    world: &'w World,
    entity: Entity,
}

impl<'w> LocomotionHandle<'w> {
    pub fn new(world: &'w World, entity: Entity) -> Self {
        Self { world, entity }
    }
}

impl MovementToggle for LocomotionHandle<'_> {
    fn set_movement_enabled(&mut self, enabled: bool) {
        if let Ok(mut locomotion) = self.world.get::<&mut Locomotion>(self.entity) {
            locomotion.set_movement_enabled(enabled);
        }
    }
}

/// A candidate as seen by a projectile.
pub struct CandidateBody<'w> {
    world: &'w World,
    entity: Entity,
}

impl<'w> CandidateBody<'w> {
    /// `None` unless `entity` has health.
    pub fn new(world: &'w World, entity: Entity) -> Option<Self> {
        world
            .get::<&Health>(entity)
            .is_ok()
            .then_some(Self { world, entity })
    }

    /// Disable the candidate if its health ran out. Returns true if it
    /// was alive before.
    pub fn disable_if_dead(&self) -> bool {
        let dead = self
            .world
            .get::<&Health>(self.entity)
            .is_ok_and(|health| health.is_dead());
        if !dead {
            return false;
        }
        match self.world.get::<&mut Enabled>(self.entity) {
            Ok(mut enabled) if enabled.0 => {
                enabled.0 = false;
                true
            }
            _ => false,
        }
    }
}

impl Damageable for CandidateBody<'_> {
    fn take_damage(&mut self, amount: f32) {
        if let Ok(mut health) = self.world.get::<&mut Health>(self.entity) {
            health.current = (health.current - amount).max(0.0);
        }
    }

    fn position(&self) -> Vec3 {
        self.world
            .get::<&Pose>(self.entity)
            .map_or(Vec3::ZERO, |pose| pose.position)
    }
}
