//! Attacker and projectile configuration.
//!
//! All values are set once when an attacker is created. `validate` is the
//! single gate: a controller is never built from a config that fails it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;
use crate::types::LayerMask;

/// Tuning for one ranged attacker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    /// Seconds between cycle ticks. Must be > 0.
    pub attack_interval_secs: f64,
    /// Damage per projectile. Must be >= 0.
    pub damage: f32,
    /// Added to the attacker position for projectile spawn and probe origin.
    pub spawn_offset: Vec3,
    /// Radius of the line-of-sight sphere cast. Must be >= 0.
    pub probe_radius: f32,
    /// Engagement volume radius; also the probe's max distance.
    pub engagement_radius: f32,
    /// Layers the line-of-sight probe can hit.
    pub filter_mask: LayerMask,
    /// Overrides the derived initial pool size.
    pub pool_size: Option<usize>,
    /// Hard cap on pool growth. `None` grows without bound.
    pub pool_limit: Option<usize>,
}

/// Prototype for the pooled projectile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTemplate {
    /// Launch speed (m/s).
    pub speed: f32,
    /// Seconds before the projectile disables itself.
    pub auto_destroy_secs: f64,
    /// Collision radius (meters).
    pub radius: f32,
    /// Layers the projectile collides with.
    pub collision_mask: LayerMask,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            attack_interval_secs: DEFAULT_ATTACK_INTERVAL,
            damage: DEFAULT_DAMAGE,
            spawn_offset: Vec3::new(0.0, DEFAULT_SPAWN_OFFSET_Y, 0.0),
            probe_radius: DEFAULT_PROBE_RADIUS,
            engagement_radius: DEFAULT_ENGAGEMENT_RADIUS,
            filter_mask: LayerMask::CANDIDATES | LayerMask::OBSTACLES,
            pool_size: None,
            pool_limit: None,
        }
    }
}

impl Default for ProjectileTemplate {
    fn default() -> Self {
        Self {
            speed: DEFAULT_PROJECTILE_SPEED,
            auto_destroy_secs: DEFAULT_PROJECTILE_LIFETIME,
            radius: DEFAULT_PROJECTILE_RADIUS,
            collision_mask: LayerMask::CANDIDATES | LayerMask::OBSTACLES,
        }
    }
}

impl AttackConfig {
    /// Parse a config from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AttackConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every numeric bound. Returns the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // NaN fails every comparison, so test for the valid range.
        if !(self.attack_interval_secs > 0.0) || !self.attack_interval_secs.is_finite() {
            return Err(ConfigError::NonPositiveInterval(self.attack_interval_secs));
        }
        if !(self.damage >= 0.0) {
            return Err(ConfigError::NegativeDamage(self.damage));
        }
        if !(self.probe_radius >= 0.0) {
            return Err(ConfigError::NegativeProbeRadius(self.probe_radius));
        }
        if !(self.engagement_radius > 0.0) {
            return Err(ConfigError::NonPositiveEngagementRadius(
                self.engagement_radius,
            ));
        }
        if let (Some(limit), Some(initial)) = (self.pool_limit, self.pool_size) {
            if limit < initial {
                return Err(ConfigError::PoolLimitBelowInitial { limit, initial });
            }
        }
        Ok(())
    }

    /// Initial pool size: the override if set, otherwise enough projectiles
    /// to cover one full lifetime of back-to-back shots,
    /// `ceil(1 / interval * lifetime)`. Clamped to the pool limit.
    ///
    /// Fails when the size is not finite or exceeds `MAX_INITIAL_POOL`.
    pub fn initial_pool_size(&self, template: &ProjectileTemplate) -> Result<usize, ConfigError> {
        let requested = match self.pool_size {
            Some(size) => size as f64,
            None => ((1.0 / self.attack_interval_secs) * template.auto_destroy_secs).ceil(),
        };
        let requested = match self.pool_limit {
            Some(limit) => requested.min(limit as f64),
            None => requested,
        };
        if !requested.is_finite() || requested > MAX_INITIAL_POOL as f64 {
            return Err(ConfigError::PoolSizeTooLarge {
                requested,
                max: MAX_INITIAL_POOL,
            });
        }
        Ok(requested.max(0.0) as usize)
    }
}

impl ProjectileTemplate {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.speed >= 0.0) || !self.speed.is_finite() {
            return Err(ConfigError::InvalidProjectile(format!(
                "speed must be a finite non-negative number (got {})",
                self.speed
            )));
        }
        if !(self.auto_destroy_secs > 0.0) || !self.auto_destroy_secs.is_finite() {
            return Err(ConfigError::InvalidProjectile(format!(
                "auto_destroy_secs must be a finite number greater than zero (got {})",
                self.auto_destroy_secs
            )));
        }
        if !(self.radius >= 0.0) {
            return Err(ConfigError::InvalidProjectile(format!(
                "radius must not be negative (got {})",
                self.radius
            )));
        }
        Ok(())
    }
}
