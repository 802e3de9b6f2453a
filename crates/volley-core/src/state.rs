//! Arena snapshot: the complete visible state produced after each tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::CombatEvent;
use crate::types::SimTime;

/// Complete arena state after one tick. Entities are identified by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub time: SimTime,
    pub attackers: Vec<AttackerView>,
    pub candidates: Vec<CandidateView>,
    pub projectiles: Vec<ProjectileView>,
    pub events: Vec<CombatEvent<u64>>,
}

/// One attacker and its controller state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackerView {
    pub id: u64,
    pub position: Vec3,
    pub facing: Vec3,
    pub phase: CyclePhase,
    pub movement_enabled: bool,
    pub current_target: Option<u64>,
    /// Target set contents in insertion order.
    pub candidates: Vec<u64>,
    pub pool: PoolView,
    pub shots_fired: u32,
    pub shots_skipped: u32,
}

/// Projectile pool statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolView {
    pub created: usize,
    pub available: usize,
    pub in_use: usize,
    pub high_water: usize,
    pub limit: Option<usize>,
}

/// A candidate on the field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateView {
    pub id: u64,
    pub position: Vec3,
    pub health: f32,
    pub enabled: bool,
}

/// A projectile in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub owner: u64,
    pub slot: u32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub age_secs: f64,
}
