//! Attack system: advances every attacker's cycle.

use hecs::{Entity, World};

use volley_combat::TransformLookup;
use volley_core::events::CombatEvent;

use crate::attacker::AttackerState;
use crate::world_view::{LocomotionHandle, WorldView};

pub fn run(
    world: &World,
    attackers: &mut [AttackerState],
    now: f64,
    events: &mut Vec<CombatEvent<Entity>>,
) {
    let view = WorldView::new(world);
    for state in attackers.iter_mut() {
        let Some(pose) = view.pose_of(state.entity) else {
            continue;
        };
        let mut movement = LocomotionHandle::new(world, state.entity);
        state
            .controller
            .update(now, &pose, &view, &mut movement, events);
    }
}
