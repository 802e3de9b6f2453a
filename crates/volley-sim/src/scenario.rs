//! Scenario definitions: who stands where, and what happens when.
//!
//! Scenarios are JSON documents. Entities may carry a `name` so timeline
//! entries can address them; ids are assigned at load time.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use volley_core::commands::ArenaCommand;
use volley_core::config::{AttackConfig, ProjectileTemplate};
use volley_core::constants::*;

use crate::error::ScenarioError;

/// An attacker and its controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackerSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub position: Vec3,
    /// Facing in radians around +Y; 0 faces +Z.
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub config: AttackConfig,
    /// `null` leaves the attacker without a projectile prototype, which
    /// fails at spawn.
    #[serde(default = "default_projectile")]
    pub projectile: Option<ProjectileTemplate>,
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    #[serde(default)]
    pub goal: Option<Vec3>,
}

fn default_projectile() -> Option<ProjectileTemplate> {
    Some(ProjectileTemplate::default())
}

fn default_move_speed() -> f32 {
    DEFAULT_MOVE_SPEED
}

fn default_health() -> f32 {
    DEFAULT_CANDIDATE_HEALTH
}

fn default_radius() -> f32 {
    DEFAULT_CANDIDATE_RADIUS
}

impl AttackerSpec {
    /// Default attacker at `position` facing +Z.
    pub fn at(position: Vec3) -> Self {
        Self {
            name: None,
            position,
            yaw: 0.0,
            config: AttackConfig::default(),
            projectile: default_projectile(),
            move_speed: DEFAULT_MOVE_SPEED,
            goal: None,
        }
    }

    pub fn facing(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn with_config(mut self, config: AttackConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_goal(mut self, goal: Vec3) -> Self {
        self.goal = Some(goal);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub position: Vec3,
    #[serde(default)]
    pub velocity: Vec3,
    #[serde(default = "default_health")]
    pub health: f32,
    #[serde(default = "default_radius")]
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub position: Vec3,
    pub radius: f32,
}

/// Randomly placed stationary candidates, drawn from the engine's seeded RNG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterSpec {
    #[serde(default)]
    pub center: Vec3,
    pub min_radius: f32,
    pub max_radius: f32,
    pub count: usize,
    #[serde(default = "default_health")]
    pub health: f32,
    #[serde(default = "default_radius")]
    pub radius: f32,
}

/// A command applied `at_secs` after the scenario loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub at_secs: f64,
    /// Named entity the command addresses. Replaces the id in `command`.
    #[serde(default)]
    pub target: Option<String>,
    pub command: ArenaCommand,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: String,
    pub attackers: Vec<AttackerSpec>,
    pub candidates: Vec<CandidateSpec>,
    pub scatter: Vec<ScatterSpec>,
    pub obstacles: Vec<ObstacleSpec>,
    pub timeline: Vec<TimelineEntry>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Built-in skirmish.
    ///
    /// One attacker walks north toward a picket line. A pillar hides one
    /// picket, a runner breaks away at 4 s, a decoy is switched off at 6 s
    /// and a second wave is scattered further north.
    pub fn skirmish() -> Self {
        let attacker = AttackerSpec {
            name: Some("sentry".into()),
            ..AttackerSpec::at(Vec3::ZERO)
                .with_config(AttackConfig {
                    engagement_radius: 12.0,
                    ..AttackConfig::default()
                })
                .with_goal(Vec3::new(0.0, 0.0, 40.0))
        };

        let picket = |name: &str, x: f32, z: f32| CandidateSpec {
            name: Some(name.into()),
            position: Vec3::new(x, 0.0, z),
            velocity: Vec3::ZERO,
            health: 30.0,
            radius: DEFAULT_CANDIDATE_RADIUS,
        };

        Self {
            name: "skirmish".into(),
            attackers: vec![attacker],
            candidates: vec![
                picket("hidden", -4.0, 14.0),
                picket("decoy", 0.0, 16.0),
                picket("runner", 3.0, 15.0),
            ],
            scatter: vec![ScatterSpec {
                center: Vec3::new(0.0, 0.0, 30.0),
                min_radius: 2.0,
                max_radius: 5.0,
                count: 4,
                health: 20.0,
                radius: DEFAULT_CANDIDATE_RADIUS,
            }],
            obstacles: vec![ObstacleSpec {
                name: Some("pillar".into()),
                position: Vec3::new(-2.0, BODY_CENTER_HEIGHT, 7.0),
                radius: 1.0,
            }],
            timeline: vec![
                TimelineEntry {
                    at_secs: 4.0,
                    target: Some("runner".into()),
                    command: ArenaCommand::SetVelocity {
                        id: 0,
                        velocity: Vec3::new(8.0, 0.0, 0.0),
                    },
                },
                TimelineEntry {
                    at_secs: 6.0,
                    target: Some("decoy".into()),
                    command: ArenaCommand::Disable { id: 0 },
                },
            ],
        }
    }
}
