//! Configuration errors. Fatal at setup; they prevent a subsystem from starting.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("attack interval must be greater than zero (got {0})")]
    NonPositiveInterval(f64),
    #[error("damage must not be negative (got {0})")]
    NegativeDamage(f32),
    #[error("probe radius must not be negative (got {0})")]
    NegativeProbeRadius(f32),
    #[error("engagement radius must be greater than zero (got {0})")]
    NonPositiveEngagementRadius(f32),
    #[error("invalid projectile template: {0}")]
    InvalidProjectile(String),
    #[error("pool limit {limit} is below the initial pool size {initial}")]
    PoolLimitBelowInitial { limit: usize, initial: usize },
    #[error("initial pool of {requested} projectiles exceeds the maximum of {max}")]
    PoolSizeTooLarge { requested: f64, max: usize },
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}
