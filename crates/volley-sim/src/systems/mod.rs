//! ECS systems that operate on the arena each tick.
//!
//! Systems are free functions over the world and the engine's attacker
//! states. They hold no state of their own apart from the timeline queue.

pub mod attack;
pub mod cleanup;
pub mod movement;
pub mod projectiles;
pub mod proximity;
pub mod snapshot;
pub mod timeline;
