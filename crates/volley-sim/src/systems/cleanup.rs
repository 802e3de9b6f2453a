//! Cleanup system: removes candidates that wandered out of the arena.

use hecs::{Entity, World};

use volley_core::components::Candidate;
use volley_core::constants::WORLD_RADIUS;
use volley_core::types::Pose;

/// Despawn candidates beyond `WORLD_RADIUS` from the origin.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();

    let radius_sq = WORLD_RADIUS * WORLD_RADIUS;
    for (entity, (pose, _candidate)) in world.query_mut::<(&Pose, &Candidate)>() {
        if pose.position.length_squared() > radius_sq {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
