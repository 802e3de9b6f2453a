//! Ranged attack logic for VOLLEY.
//!
//! The `AttackController` runs a periodic attack cycle over a `TargetSet`,
//! picks the first visible candidate, launches pooled projectiles and
//! keeps the attacker's locomotion switched off while engaging.
//! No ECS dependency: the world is reached only through the traits in
//! `interfaces`.

pub mod controller;
pub mod error;
pub mod interfaces;
pub mod projectile;
pub mod target_set;
pub mod timer;

pub use controller::{muzzle_position, AttackController, AttackStats};
pub use error::CombatError;
pub use interfaces::{
    Battlefield, Damageable, Liveness, MovementToggle, ProbeRequest, TransformLookup,
    VisibilityQuery,
};
pub use projectile::{Flight, Projectile};
pub use target_set::TargetSet;
pub use timer::{CancellationToken, ScheduledStep};

pub use volley_core as core;

#[cfg(test)]
mod tests;
