//! Engine-side attacker state.
//!
//! Controllers hold single-threaded pools and cannot live in the ECS world,
//! so the engine keeps them here, keyed by the attacker entity.

use hecs::Entity;

use volley_combat::AttackController;
use volley_core::state::PoolView;

pub struct AttackerState {
    pub entity: Entity,
    pub controller: AttackController<Entity>,
    /// Enabled candidates inside the engagement volume as of the last
    /// proximity pass, in discovery order.
    pub in_range: Vec<Entity>,
}

impl AttackerState {
    pub fn new(entity: Entity, controller: AttackController<Entity>) -> Self {
        Self {
            entity,
            controller,
            in_range: Vec::new(),
        }
    }

    pub fn pool_view(&self) -> PoolView {
        let pool = self.controller.pool();
        PoolView {
            created: pool.len(),
            available: pool.available(),
            in_use: pool.in_use(),
            high_water: pool.high_water(),
            limit: pool.limit(),
        }
    }
}
