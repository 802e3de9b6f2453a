//! Headless arena for VOLLEY.
//!
//! Owns the hecs ECS world, wires attack controllers to it through the
//! collaborator traits, runs systems at a fixed tick rate and produces
//! `ArenaSnapshot`s.

pub mod attacker;
pub mod engine;
pub mod error;
pub mod scenario;
pub mod systems;
pub mod visibility;
pub mod world_setup;
pub mod world_view;

pub use engine::{ArenaEngine, SimConfig};
pub use error::ScenarioError;
pub use scenario::{AttackerSpec, Scenario};
pub use volley_core as core;

#[cfg(test)]
mod tests;
