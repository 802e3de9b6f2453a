//! The pooled projectile: flies straight along its facing until it hits
//! something or its lifetime runs out.

use glam::Vec3;
use volley_core::config::ProjectileTemplate;
use volley_core::constants::SCHEDULE_EPSILON;
use volley_core::types::Pose;
use volley_pool::Recyclable;

/// Outcome of one integration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flight {
    InFlight,
    /// Lifetime exhausted; the owner should deactivate the projectile.
    Expired,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub template: ProjectileTemplate,
    pub damage: f32,
    pub pose: Pose,
    pub velocity: Vec3,
    pub age_secs: f64,
}

impl Projectile {
    pub fn from_template(template: ProjectileTemplate) -> Self {
        Self {
            template,
            damage: 0.0,
            pose: Pose::default(),
            velocity: Vec3::ZERO,
            age_secs: 0.0,
        }
    }

    /// Apply a forward velocity change of `template.speed`.
    pub fn launch(&mut self) {
        self.velocity += self.pose.forward() * self.template.speed;
    }

    pub fn advance(&mut self, dt: f64) -> Flight {
        self.pose.position += self.velocity * dt as f32;
        self.age_secs += dt;
        if self.age_secs + SCHEDULE_EPSILON >= self.template.auto_destroy_secs {
            Flight::Expired
        } else {
            Flight::InFlight
        }
    }
}

impl Recyclable for Projectile {
    fn reset(&mut self) {
        self.velocity = Vec3::ZERO;
        self.age_secs = 0.0;
    }
}
