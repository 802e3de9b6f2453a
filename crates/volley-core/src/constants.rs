//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Slack when comparing a scheduled wake-up against the clock, so that
/// accumulated tick time does not push a step one tick late.
pub const SCHEDULE_EPSILON: f64 = 1e-6;

/// Maximum cycle steps one controller update may run to catch up after a
/// long frame.
pub const MAX_CATCH_UP_STEPS: usize = 16;

// --- World bounds ---

/// Arena radius in meters. Candidates beyond it are despawned.
pub const WORLD_RADIUS: f32 = 500.0;

// --- Attack defaults ---

/// Seconds between attack cycle ticks.
pub const DEFAULT_ATTACK_INTERVAL: f64 = 0.5;

/// Damage dealt by one projectile.
pub const DEFAULT_DAMAGE: f32 = 10.0;

/// Projectile spawn offset above the attacker origin (meters).
pub const DEFAULT_SPAWN_OFFSET_Y: f32 = 1.0;

/// Radius of the line-of-sight sphere cast (meters).
pub const DEFAULT_PROBE_RADIUS: f32 = 0.1;

/// Radius of the engagement volume, also the probe's max distance (meters).
pub const DEFAULT_ENGAGEMENT_RADIUS: f32 = 10.0;

/// Largest initial pool an attacker may request.
pub const MAX_INITIAL_POOL: usize = 4096;

// --- Projectile defaults ---

/// Projectile launch speed (m/s).
pub const DEFAULT_PROJECTILE_SPEED: f32 = 20.0;

/// Seconds before an unobstructed projectile disables itself.
pub const DEFAULT_PROJECTILE_LIFETIME: f64 = 2.0;

/// Projectile collision radius (meters).
pub const DEFAULT_PROJECTILE_RADIUS: f32 = 0.1;

// --- Candidates ---

/// Starting health for scenario candidates without an explicit value.
pub const DEFAULT_CANDIDATE_HEALTH: f32 = 100.0;

/// Collision radius for scenario candidates without an explicit value.
pub const DEFAULT_CANDIDATE_RADIUS: f32 = 0.5;

/// Height of a standing body's collider center above its position (meters).
pub const BODY_CENTER_HEIGHT: f32 = 1.0;

/// Collision radius of an attacker's body (meters).
pub const ATTACKER_RADIUS: f32 = 0.5;

/// Attacker locomotion speed (m/s).
pub const DEFAULT_MOVE_SPEED: f32 = 3.5;

/// Distance at which locomotion considers its goal reached (meters).
pub const ARRIVAL_TOLERANCE: f32 = 0.05;
