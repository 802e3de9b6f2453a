//! Snapshot system: builds an `ArenaSnapshot` from the world and the
//! attack controllers.
//!
//! This system is read-only. Entity handles become their 64-bit ids.

use hecs::{Entity, World};

use volley_core::components::{Candidate, Enabled, Health, Locomotion};
use volley_core::events::CombatEvent;
use volley_core::state::*;
use volley_core::types::{Pose, SimTime};

use crate::attacker::AttackerState;

fn id(entity: Entity) -> u64 {
    entity.to_bits().get()
}

pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    attackers: &[AttackerState],
    events: Vec<CombatEvent<Entity>>,
) -> ArenaSnapshot {
    ArenaSnapshot {
        time: *time,
        attackers: build_attackers(world, attackers),
        candidates: build_candidates(world),
        projectiles: build_projectiles(attackers),
        events: events.into_iter().map(|event| event.map_handle(id)).collect(),
    }
}

fn build_attackers(world: &World, attackers: &[AttackerState]) -> Vec<AttackerView> {
    attackers
        .iter()
        .map(|state| {
            let pose = world
                .get::<&Pose>(state.entity)
                .map(|pose| *pose)
                .unwrap_or_default();
            let movement_enabled = world
                .get::<&Locomotion>(state.entity)
                .is_ok_and(|locomotion| locomotion.enabled);
            let controller = &state.controller;
            let stats = controller.stats();

            AttackerView {
                id: id(state.entity),
                position: pose.position,
                facing: pose.forward(),
                phase: controller.phase(),
                movement_enabled,
                current_target: controller.current_target().map(id),
                candidates: controller.targets().iter().map(id).collect(),
                pool: state.pool_view(),
                shots_fired: stats.shots_fired,
                shots_skipped: stats.shots_skipped,
            }
        })
        .collect()
}

fn build_candidates(world: &World) -> Vec<CandidateView> {
    world
        .query::<(&Candidate, &Pose, &Health, &Enabled)>()
        .iter()
        .map(|(entity, (_, pose, health, enabled))| CandidateView {
            id: id(entity),
            position: pose.position,
            health: health.current,
            enabled: enabled.0,
        })
        .collect()
}

fn build_projectiles(attackers: &[AttackerState]) -> Vec<ProjectileView> {
    attackers
        .iter()
        .flat_map(|state| {
            let owner = id(state.entity);
            state
                .controller
                .projectiles_in_flight()
                .into_iter()
                .map(move |shot| {
                    let slot = shot.id().slot;
                    let projectile = shot.borrow();
                    ProjectileView {
                        owner,
                        slot,
                        position: projectile.pose.position,
                        velocity: projectile.velocity,
                        age_secs: projectile.age_secs,
                    }
                })
        })
        .collect()
}
