//! Arena engine.
//!
//! `ArenaEngine` owns the hecs ECS world and the attack controllers,
//! processes arena commands, runs all systems and produces
//! `ArenaSnapshot`s. Completely headless, enabling deterministic testing.

use std::collections::{HashMap, VecDeque};

use glam::Vec3;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use volley_combat::{AttackController, CombatError, Damageable};
use volley_core::commands::ArenaCommand;
use volley_core::components::{Enabled, Locomotion, Velocity};
use volley_core::constants::ATTACKER_RADIUS;
use volley_core::events::CombatEvent;
use volley_core::state::ArenaSnapshot;
use volley_core::types::{Pose, SimTime};

use crate::attacker::AttackerState;
use crate::error::ScenarioError;
use crate::scenario::{AttackerSpec, Scenario};
use crate::systems;
use crate::systems::timeline::Timeline;
use crate::world_setup;
use crate::world_view::CandidateBody;

/// Configuration for starting a new arena.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

/// The arena engine. Owns the ECS world and all combat state.
pub struct ArenaEngine {
    world: World,
    time: SimTime,
    rng: ChaCha8Rng,
    command_queue: VecDeque<ArenaCommand>,
    timeline: Timeline,
    attackers: Vec<AttackerState>,
    despawn_buffer: Vec<Entity>,
    events: Vec<CombatEvent<Entity>>,
}

impl ArenaEngine {
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            timeline: Timeline::default(),
            attackers: Vec::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Spawn an attacker and build its controller.
    ///
    /// Nothing is left in the world if the controller cannot be built.
    pub fn spawn_attacker(&mut self, spec: &AttackerSpec) -> Result<Entity, CombatError> {
        let locomotion = Locomotion {
            enabled: true,
            goal: spec.goal,
            speed: spec.move_speed,
        };
        let pose = Pose::from_yaw(spec.position, spec.yaw);
        let entity = world_setup::spawn_attacker(&mut self.world, pose, locomotion, ATTACKER_RADIUS);

        let controller = match AttackController::new(
            entity,
            spec.config.clone(),
            spec.projectile.clone(),
        ) {
            Ok(controller) => controller,
            Err(err) => {
                let _ = self.world.despawn(entity);
                return Err(err);
            }
        };

        info!(
            attacker = entity.to_bits().get(),
            position = ?spec.position,
            pool = controller.pool().len(),
            "attacker spawned"
        );
        self.attackers.push(AttackerState::new(entity, controller));
        Ok(entity)
    }

    pub fn spawn_candidate(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        health: f32,
        radius: f32,
    ) -> Entity {
        world_setup::spawn_candidate(&mut self.world, position, velocity, health, radius)
    }

    pub fn spawn_obstacle(&mut self, position: Vec3, radius: f32) -> Entity {
        world_setup::spawn_obstacle(&mut self.world, position, radius)
    }

    /// Populate the arena from `scenario`.
    ///
    /// Timeline times are relative to now. Returns the named entities.
    pub fn load_scenario(
        &mut self,
        scenario: &Scenario,
    ) -> Result<HashMap<String, Entity>, ScenarioError> {
        let mut names = HashMap::new();

        for spec in &scenario.attackers {
            let entity = self.spawn_attacker(spec)?;
            if let Some(name) = &spec.name {
                names.insert(name.clone(), entity);
            }
        }
        for spec in &scenario.candidates {
            let entity =
                self.spawn_candidate(spec.position, spec.velocity, spec.health, spec.radius);
            if let Some(name) = &spec.name {
                names.insert(name.clone(), entity);
            }
        }
        for scatter in &scenario.scatter {
            world_setup::scatter_candidates(&mut self.world, &mut self.rng, scatter);
        }
        for spec in &scenario.obstacles {
            let entity = self.spawn_obstacle(spec.position, spec.radius);
            if let Some(name) = &spec.name {
                names.insert(name.clone(), entity);
            }
        }

        let now = self.time.elapsed_secs;
        for entry in &scenario.timeline {
            let command = match &entry.target {
                Some(name) => {
                    let entity = names
                        .get(name)
                        .ok_or_else(|| ScenarioError::UnknownEntity(name.clone()))?;
                    entry.command.clone().retarget(entity.to_bits().get())
                }
                None => entry.command.clone(),
            };
            self.timeline.schedule(now + entry.at_secs, command);
        }

        info!(
            scenario = %scenario.name,
            attackers = scenario.attackers.len(),
            entities = self.world.len(),
            timeline = scenario.timeline.len(),
            "scenario loaded"
        );
        Ok(names)
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: ArenaCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = ArenaCommand>) {
        self.command_queue.extend(commands);
    }

    /// Queue `command` for the first tick at or after `at_secs`.
    pub fn schedule(&mut self, at_secs: f64, command: ArenaCommand) {
        self.timeline.schedule(at_secs, command);
    }

    /// Advance the arena by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> ArenaSnapshot {
        let now = self.time.elapsed_secs;
        systems::timeline::run(&mut self.timeline, now, &mut self.command_queue);
        self.process_commands();
        self.run_systems(now);
        self.time.advance();

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.world, &self.time, &self.attackers, events)
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Read-only access to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The controller driving `attacker`, if it is one.
    pub fn controller(&self, attacker: Entity) -> Option<&AttackController<Entity>> {
        self.attackers
            .iter()
            .find(|state| state.entity == attacker)
            .map(|state| &state.controller)
    }

    pub fn attackers(&self) -> impl Iterator<Item = &AttackController<Entity>> {
        self.attackers.iter().map(|state| &state.controller)
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: ArenaCommand) {
        let target = command.target().and_then(Entity::from_bits);
        if command.target().is_some() && target.map_or(true, |e| !self.world.contains(e)) {
            debug!(?command, "command addresses an unknown entity, ignored");
            return;
        }

        match (command, target) {
            (
                ArenaCommand::SpawnCandidate {
                    position,
                    velocity,
                    health,
                    radius,
                },
                _,
            ) => {
                self.spawn_candidate(position, velocity, health, radius);
            }
            (ArenaCommand::SpawnObstacle { position, radius }, _) => {
                self.spawn_obstacle(position, radius);
            }
            (ArenaCommand::Despawn { .. }, Some(entity)) => {
                self.attackers.retain(|state| state.entity != entity);
                let _ = self.world.despawn(entity);
            }
            (ArenaCommand::Teleport { position, .. }, Some(entity)) => {
                if let Ok(mut pose) = self.world.get::<&mut Pose>(entity) {
                    pose.position = position;
                }
            }
            (ArenaCommand::SetVelocity { velocity, .. }, Some(entity)) => {
                if let Ok(mut current) = self.world.get::<&mut Velocity>(entity) {
                    current.0 = velocity;
                }
            }
            (ArenaCommand::Disable { .. }, Some(entity)) => {
                if let Ok(mut enabled) = self.world.get::<&mut Enabled>(entity) {
                    enabled.0 = false;
                }
            }
            (ArenaCommand::Enable { .. }, Some(entity)) => {
                if let Ok(mut enabled) = self.world.get::<&mut Enabled>(entity) {
                    enabled.0 = true;
                }
            }
            (ArenaCommand::Damage { amount, .. }, Some(entity)) => {
                if let Some(mut body) = CandidateBody::new(&self.world, entity) {
                    body.take_damage(amount);
                    if body.disable_if_dead() {
                        self.events.push(CombatEvent::CandidateKilled { target: entity });
                    }
                }
            }
            (ArenaCommand::CancelAttack { .. }, Some(entity)) => {
                if let Some(controller) = self.controller(entity) {
                    controller.cancellation_token().cancel();
                }
            }
            (ArenaCommand::SetGoal { goal, .. }, Some(entity)) => {
                if let Ok(mut locomotion) = self.world.get::<&mut Locomotion>(entity) {
                    locomotion.goal = goal;
                }
            }
            (_, None) => {}
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self, now: f64) {
        let dt = self.time.dt();
        // 1. Movement integration (candidates, unlocked attackers)
        systems::movement::run(&mut self.world, dt);
        // 2. Proximity trigger (range entry/exit)
        systems::proximity::run(&self.world, &mut self.attackers, now, &mut self.events);
        // 3. Attack cycles (scan, fire, recheck)
        systems::attack::run(&self.world, &mut self.attackers, now, &mut self.events);
        // 4. Projectile flight and impacts
        systems::projectiles::run(&self.world, &self.attackers, dt, &mut self.events);
        // 5. Cleanup (out of bounds)
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
    }
}
