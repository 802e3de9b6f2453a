//! Proximity trigger: feeds range entries and exits into target sets.
//!
//! A candidate is in range when its collider touches the attacker's
//! engagement sphere. Candidates that were disabled or despawned while in
//! range raise no exit; their controller purges them on its own.

use hecs::{Entity, World};
use tracing::trace;

use volley_core::components::{Candidate, Collider, Enabled};
use volley_core::events::CombatEvent;
use volley_core::types::Pose;

use crate::attacker::AttackerState;
use crate::world_view::{is_alive, LocomotionHandle};

pub fn run(
    world: &World,
    attackers: &mut [AttackerState],
    now: f64,
    events: &mut Vec<CombatEvent<Entity>>,
) {
    for state in attackers.iter_mut() {
        let Ok(center) = world.get::<&Pose>(state.entity).map(|pose| pose.position) else {
            continue;
        };
        let radius = state.controller.config().engagement_radius;

        let inside: Vec<Entity> = world
            .query::<(&Candidate, &Pose, &Collider, &Enabled)>()
            .iter()
            .filter(|(_, (_, pose, collider, enabled))| {
                enabled.0 && pose.position.distance(center) <= radius + collider.radius
            })
            .map(|(entity, _)| entity)
            .collect();

        for &candidate in &inside {
            if !state.in_range.contains(&candidate) {
                state.controller.add_candidate(candidate, now, events);
            }
        }

        let mut movement = LocomotionHandle::new(world, state.entity);
        for &candidate in &state.in_range {
            if inside.contains(&candidate) || !is_alive(world, candidate) {
                continue;
            }
            trace!(
                attacker = state.entity.to_bits().get(),
                candidate = candidate.to_bits().get(),
                "candidate left range"
            );
            state
                .controller
                .remove_candidate(candidate, &mut movement, events);
        }

        state.in_range = inside;
    }
}
