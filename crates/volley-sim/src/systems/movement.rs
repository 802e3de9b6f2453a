//! Kinematic integration system.
//!
//! Candidates drift with their velocity. Attackers whose locomotion is
//! enabled walk toward their goal and face it; a locked attacker stands
//! still and keeps its facing.

use hecs::World;

use volley_core::components::{Attacker, Candidate, Enabled, Locomotion, Velocity};
use volley_core::constants::ARRIVAL_TOLERANCE;
use volley_core::types::Pose;

pub fn run(world: &mut World, dt: f64) {
    let dt = dt as f32;

    for (_entity, (pose, velocity, enabled, _candidate)) in
        world.query_mut::<(&mut Pose, &Velocity, &Enabled, &Candidate)>()
    {
        if enabled.0 {
            pose.position += velocity.0 * dt;
        }
    }

    for (_entity, (pose, locomotion, _attacker)) in
        world.query_mut::<(&mut Pose, &mut Locomotion, &Attacker)>()
    {
        if !locomotion.enabled {
            continue;
        }
        let Some(goal) = locomotion.goal else {
            continue;
        };
        let to_goal = goal - pose.position;
        let distance = to_goal.length();
        if distance <= ARRIVAL_TOLERANCE {
            locomotion.goal = None;
            continue;
        }
        pose.face_towards(goal);
        let step = (locomotion.speed * dt).min(distance);
        pose.position += to_goal / distance * step;
    }
}
