//! Entity spawn factories for populating the arena.

use std::f32::consts::TAU;

use glam::Vec3;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use volley_core::components::*;
use volley_core::constants::BODY_CENTER_HEIGHT;
use volley_core::types::{LayerMask, Pose};

use crate::scenario::ScatterSpec;

fn body(radius: f32, layer: LayerMask) -> Collider {
    Collider {
        radius,
        layer,
        offset: Vec3::Y * BODY_CENTER_HEIGHT,
    }
}

/// Spawn a damageable candidate standing at `position`.
pub fn spawn_candidate(
    world: &mut World,
    position: Vec3,
    velocity: Vec3,
    health: f32,
    radius: f32,
) -> Entity {
    world.spawn((
        Candidate,
        Pose::new(position, Default::default()),
        Velocity(velocity),
        Health::new(health),
        body(radius, LayerMask::CANDIDATES),
        Enabled(true),
    ))
}

/// Spawn a static sphere centered on `position` that blocks probes and
/// projectiles.
pub fn spawn_obstacle(world: &mut World, position: Vec3, radius: f32) -> Entity {
    world.spawn((
        Obstacle,
        Pose::new(position, Default::default()),
        Collider {
            radius,
            layer: LayerMask::OBSTACLES,
            offset: Vec3::ZERO,
        },
        Enabled(true),
    ))
}

/// Spawn the ECS side of an attacker. Its controller lives in the engine.
pub fn spawn_attacker(world: &mut World, pose: Pose, locomotion: Locomotion, radius: f32) -> Entity {
    world.spawn((
        Attacker,
        pose,
        locomotion,
        body(radius, LayerMask::ATTACKERS),
        Enabled(true),
    ))
}

/// Spawn stationary candidates at random points of a ring.
pub fn scatter_candidates(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    scatter: &ScatterSpec,
) -> Vec<Entity> {
    (0..scatter.count)
        .map(|_| {
            let bearing = rng.gen_range(0.0..TAU);
            let distance = if scatter.max_radius > scatter.min_radius {
                rng.gen_range(scatter.min_radius..scatter.max_radius)
            } else {
                scatter.min_radius
            };
            let position =
                scatter.center + Vec3::new(bearing.sin(), 0.0, bearing.cos()) * distance;
            spawn_candidate(world, position, Vec3::ZERO, scatter.health, scatter.radius)
        })
        .collect()
}
