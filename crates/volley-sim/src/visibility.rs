//! Volumetric line-of-sight probe against the arena's sphere colliders.
//!
//! A sphere of radius `r` swept along a ray hits a collider of radius `R`
//! exactly where the ray hits a sphere of radius `r + R`, so the sweep
//! reduces to a ray/sphere intersection per collider.

use hecs::{Entity, World};

use volley_combat::ProbeRequest;
use volley_core::components::{Collider, Enabled};
use volley_core::types::Pose;

/// Nearest enabled collider on `request.mask` that the swept sphere touches
/// within `request.max_distance`.
///
/// Colliders the sphere already overlaps at its origin are skipped, so an
/// attacker never blocks its own probe.
pub fn sphere_cast(world: &World, request: &ProbeRequest) -> Option<Entity> {
    let mut nearest: Option<(Entity, f32)> = None;

    for (entity, (pose, collider, enabled)) in world.query::<(&Pose, &Collider, &Enabled)>().iter()
    {
        if !enabled.0 || !collider.layer.intersects(request.mask) {
            continue;
        }
        let Some(distance) = sweep_distance(request, pose, collider) else {
            continue;
        };
        if distance > request.max_distance {
            continue;
        }
        if nearest.map_or(true, |(_, best)| distance < best) {
            nearest = Some((entity, distance));
        }
    }

    nearest.map(|(entity, _)| entity)
}

/// Distance along the ray at which the swept sphere first touches
/// `collider`, or `None` if it never does or already overlaps it.
fn sweep_distance(request: &ProbeRequest, pose: &Pose, collider: &Collider) -> Option<f32> {
    let reach = request.radius + collider.radius;
    let to_origin = request.origin - collider.center(pose.position);
    let c = to_origin.length_squared() - reach * reach;
    if c <= 0.0 {
        return None;
    }
    let b = to_origin.dot(request.direction);
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = -b - discriminant.sqrt();
    (t >= 0.0).then_some(t)
}
