//! Projectile system: flight, impact and expiry.
//!
//! Each in-flight projectile sweeps its collision sphere along this tick's
//! path. The first collider on its mask stops it; a candidate struck this
//! way takes damage and is disabled once its health runs out. Projectiles
//! that expire or leave the arena are deactivated, which hands them back
//! to their pool.

use hecs::{Entity, World};
use tracing::{debug, trace};

use volley_combat::{Damageable, Flight, ProbeRequest};
use volley_core::constants::WORLD_RADIUS;
use volley_core::events::CombatEvent;

use crate::attacker::AttackerState;
use crate::visibility;
use crate::world_view::CandidateBody;

pub fn run(
    world: &World,
    attackers: &[AttackerState],
    dt: f64,
    events: &mut Vec<CombatEvent<Entity>>,
) {
    for state in attackers {
        for shot in state.controller.projectiles_in_flight() {
            // Step 1: integrate
            let (from, to, flight) = {
                let mut projectile = shot.borrow_mut();
                let from = projectile.pose.position;
                let flight = projectile.advance(dt);
                (from, projectile.pose.position, flight)
            };
            let (radius, mask, damage) = {
                let projectile = shot.borrow();
                (
                    projectile.template.radius,
                    projectile.template.collision_mask,
                    projectile.damage,
                )
            };

            // Step 2: impact along the swept path
            let travel = to - from;
            if let Some(direction) = travel.try_normalize() {
                let request = ProbeRequest {
                    origin: from,
                    radius,
                    direction,
                    max_distance: travel.length(),
                    mask,
                };
                if let Some(hit) = visibility::sphere_cast(world, &request) {
                    if let Some(mut body) = CandidateBody::new(world, hit) {
                        body.take_damage(damage);
                        trace!(
                            candidate = hit.to_bits().get(),
                            damage,
                            at = ?body.position(),
                            "projectile hit"
                        );
                        events.push(CombatEvent::ProjectileHit {
                            target: hit,
                            damage,
                        });
                        if body.disable_if_dead() {
                            debug!(candidate = hit.to_bits().get(), "candidate killed");
                            events.push(CombatEvent::CandidateKilled { target: hit });
                        }
                    }
                    shot.deactivate();
                    continue;
                }
            }

            // Step 3: expiry and bounds
            let out_of_bounds = to.length_squared() > WORLD_RADIUS * WORLD_RADIUS;
            if flight == Flight::Expired || out_of_bounds {
                shot.deactivate();
            }
        }
    }
}
