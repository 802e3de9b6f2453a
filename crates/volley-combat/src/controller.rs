//! Periodic ranged attack cycle for one attacker.
//!
//! A cycle starts when the first candidate enters an idle attacker's range
//! and repeats until the target set is empty or the cycle is cancelled:
//!
//! 1. Wait one interval.
//! 2. Scan: the first candidate (arrival order) with a clear line of sight
//!    becomes the target. Movement locks and a projectile is launched.
//!    If nothing is visible, movement unlocks.
//! 3. Wait one interval.
//! 4. Recheck: unlock movement if the target is no longer visible, then
//!    purge dead or disabled candidates.
//! 5. Loop to 2 at the same instant.
//!
//! Whenever the cycle ends, for whatever reason, movement is unlocked.

use std::fmt;

use glam::Vec3;
use tracing::{debug, trace};
use volley_core::config::{AttackConfig, ProjectileTemplate};
use volley_core::constants::MAX_CATCH_UP_STEPS;
use volley_core::enums::{CyclePhase, CycleStep, RemovalCause, StopReason};
use volley_core::events::CombatEvent;
use volley_core::types::Pose;
use volley_pool::{Pooled, RecyclablePool};

use crate::error::CombatError;
use crate::interfaces::{Battlefield, MovementToggle, ProbeRequest};
use crate::projectile::Projectile;
use crate::target_set::TargetSet;
use crate::timer::{CancellationToken, ScheduledStep};

/// Running counters, reset never.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttackStats {
    pub cycles: u32,
    pub scans: u32,
    pub acquisitions: u32,
    pub shots_fired: u32,
    pub shots_skipped: u32,
    pub purged: u32,
}

pub struct AttackController<H> {
    attacker: H,
    config: AttackConfig,
    targets: TargetSet<H>,
    pool: RecyclablePool<Projectile>,
    phase: CyclePhase,
    pending: Option<ScheduledStep>,
    token: CancellationToken,
    current_target: Option<H>,
    movement_locked: bool,
    stats: AttackStats,
}

impl<H: Copy + Eq + fmt::Debug> AttackController<H> {
    /// Validate `config` and pre-populate the projectile pool.
    ///
    /// The pool is sized by `AttackConfig::initial_pool_size`. A missing
    /// template is a pool error; the controller cannot fire without one.
    pub fn new(
        attacker: H,
        config: AttackConfig,
        template: Option<ProjectileTemplate>,
    ) -> Result<Self, CombatError> {
        config.validate()?;
        if let Some(template) = &template {
            template.validate()?;
        }

        let initial = match &template {
            Some(template) => config.initial_pool_size(template)?,
            None => 0,
        };
        let prototype = template.map(Projectile::from_template);
        let pool = match config.pool_limit {
            Some(limit) => RecyclablePool::create_bounded(prototype, initial, limit)?,
            None => RecyclablePool::create(prototype, initial)?,
        };

        debug!(
            ?attacker,
            pool = pool.len(),
            interval = config.attack_interval_secs,
            "attack controller ready"
        );

        Ok(Self {
            attacker,
            config,
            targets: TargetSet::new(),
            pool,
            phase: CyclePhase::Idle,
            pending: None,
            token: CancellationToken::new(),
            current_target: None,
            movement_locked: false,
            stats: AttackStats::default(),
        })
    }

    /// Begin a cycle. The first scan happens one interval after `now`.
    pub fn start(
        &mut self,
        now: f64,
        events: &mut Vec<CombatEvent<H>>,
    ) -> Result<(), CombatError> {
        if self.is_running() {
            return Err(CombatError::CycleAlreadyRunning);
        }
        self.begin_cycle(now, events);
        Ok(())
    }

    /// A candidate entered range. Starts a cycle if none is running.
    ///
    /// Returns false if the candidate was already tracked.
    pub fn add_candidate(
        &mut self,
        candidate: H,
        now: f64,
        events: &mut Vec<CombatEvent<H>>,
    ) -> bool {
        if !self.targets.add(candidate) {
            return false;
        }
        trace!(attacker = ?self.attacker, ?candidate, "candidate entered range");
        if !self.is_running() {
            self.begin_cycle(now, events);
        }
        true
    }

    /// A candidate left range.
    ///
    /// An emptied set stops the running cycle. With no cycle running the
    /// attacker gets its movement back.
    pub fn remove_candidate<M>(
        &mut self,
        candidate: H,
        movement: &mut M,
        events: &mut Vec<CombatEvent<H>>,
    ) -> bool
    where
        M: MovementToggle + ?Sized,
    {
        if !self.targets.remove(candidate) {
            if !self.is_running() {
                self.release_movement(movement, events);
            }
            return false;
        }
        events.push(CombatEvent::CandidateRemoved {
            attacker: self.attacker,
            candidate,
            cause: RemovalCause::LeftRange,
        });

        if self.targets.is_empty() && self.is_running() {
            self.finish(StopReason::TargetsExhausted, movement, events);
        } else if !self.is_running() {
            self.release_movement(movement, events);
        }
        true
    }

    /// Advance the cycle to `now`, executing every step that has come due.
    ///
    /// `pose` is the attacker's current placement. Steps run at their
    /// scheduled instant, not at `now`, so a late update catches up without
    /// drifting the firing rhythm.
    pub fn update<B, M>(
        &mut self,
        now: f64,
        pose: &Pose,
        field: &B,
        movement: &mut M,
        events: &mut Vec<CombatEvent<H>>,
    ) where
        B: Battlefield<H> + ?Sized,
        M: MovementToggle + ?Sized,
    {
        if !self.is_running() {
            return;
        }
        if self.token.is_cancelled() {
            self.finish(StopReason::Cancelled, movement, events);
            return;
        }

        for _ in 0..MAX_CATCH_UP_STEPS {
            let Some(scheduled) = self.pending else {
                break;
            };
            if !scheduled.is_due(now) {
                break;
            }
            self.pending = None;

            match scheduled.step {
                CycleStep::Scan => self.scan(scheduled.due_at, pose, field, movement, events),
                CycleStep::Recheck => {
                    self.recheck(scheduled.due_at, pose, field, movement, events)
                }
            }

            if !self.is_running() {
                break;
            }
        }
    }

    /// Cancel the running cycle immediately. Movement is unlocked even if
    /// no cycle was running.
    pub fn stop<M>(&mut self, movement: &mut M, events: &mut Vec<CombatEvent<H>>)
    where
        M: MovementToggle + ?Sized,
    {
        if self.is_running() {
            self.finish(StopReason::Cancelled, movement, events);
        } else {
            self.release_movement(movement, events);
        }
    }

    /// Token of the current cycle. Cancelling it stops the cycle on the
    /// next update.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn attacker(&self) -> H {
        self.attacker
    }

    pub fn config(&self) -> &AttackConfig {
        &self.config
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase != CyclePhase::Idle
    }

    pub fn current_target(&self) -> Option<H> {
        self.current_target
    }

    pub fn is_movement_locked(&self) -> bool {
        self.movement_locked
    }

    /// When the next step wakes, if a cycle is running.
    pub fn next_wake(&self) -> Option<f64> {
        self.pending.map(|scheduled| scheduled.due_at)
    }

    pub fn targets(&self) -> &TargetSet<H> {
        &self.targets
    }

    pub fn pool(&self) -> &RecyclablePool<Projectile> {
        &self.pool
    }

    /// Projectiles launched by this attacker that are still active.
    pub fn projectiles_in_flight(&self) -> Vec<Pooled<Projectile>> {
        self.pool.active_instances()
    }

    pub fn stats(&self) -> AttackStats {
        self.stats
    }

    fn begin_cycle(&mut self, now: f64, events: &mut Vec<CombatEvent<H>>) {
        self.token = CancellationToken::new();
        self.phase = CyclePhase::Scanning;
        self.current_target = None;
        self.pending = Some(ScheduledStep::new(
            CycleStep::Scan,
            now + self.config.attack_interval_secs,
        ));
        self.stats.cycles += 1;
        events.push(CombatEvent::CycleStarted {
            attacker: self.attacker,
        });
        debug!(attacker = ?self.attacker, now, "attack cycle started");
    }

    fn scan<B, M>(
        &mut self,
        at: f64,
        pose: &Pose,
        field: &B,
        movement: &mut M,
        events: &mut Vec<CombatEvent<H>>,
    ) where
        B: Battlefield<H> + ?Sized,
        M: MovementToggle + ?Sized,
    {
        if self.targets.is_empty() {
            self.finish(StopReason::TargetsExhausted, movement, events);
            return;
        }
        self.stats.scans += 1;

        let previous = self.current_target;
        let found = self
            .targets
            .snapshot()
            .iter()
            .copied()
            .find(|&candidate| self.has_line_of_sight(candidate, pose, field));
        self.current_target = found;

        match found {
            Some(target) => {
                if previous != Some(target) {
                    self.stats.acquisitions += 1;
                    events.push(CombatEvent::AttackStarted {
                        attacker: self.attacker,
                        target,
                    });
                    debug!(attacker = ?self.attacker, ?target, "target acquired");
                }
                self.lock_movement(movement, events);
                self.phase = CyclePhase::Engaging;
                self.fire(target, pose, events);
            }
            None => {
                self.release_movement(movement, events);
                self.phase = CyclePhase::RetreatingUnlocked;
            }
        }

        self.pending = Some(ScheduledStep::new(
            CycleStep::Recheck,
            at + self.config.attack_interval_secs,
        ));
    }

    fn recheck<B, M>(
        &mut self,
        at: f64,
        pose: &Pose,
        field: &B,
        movement: &mut M,
        events: &mut Vec<CombatEvent<H>>,
    ) where
        B: Battlefield<H> + ?Sized,
        M: MovementToggle + ?Sized,
    {
        let still_visible = self
            .current_target
            .is_some_and(|target| self.has_line_of_sight(target, pose, field));
        if !still_visible {
            self.release_movement(movement, events);
            if self.phase == CyclePhase::Engaging {
                self.phase = CyclePhase::RetreatingUnlocked;
            }
        }

        let purged = self.targets.remove_invalid(|candidate| !field.is_alive(candidate));
        for candidate in purged {
            self.stats.purged += 1;
            events.push(CombatEvent::CandidateRemoved {
                attacker: self.attacker,
                candidate,
                cause: RemovalCause::Invalid,
            });
        }

        if self.targets.is_empty() {
            self.finish(StopReason::TargetsExhausted, movement, events);
            return;
        }
        self.pending = Some(ScheduledStep::new(CycleStep::Scan, at));
    }

    fn fire(&mut self, target: H, pose: &Pose, events: &mut Vec<CombatEvent<H>>) {
        let Some(projectile) = self.pool.acquire() else {
            self.stats.shots_skipped += 1;
            debug!(attacker = ?self.attacker, ?target, "pool exhausted, shot skipped");
            events.push(CombatEvent::ShotSkipped {
                attacker: self.attacker,
                target,
            });
            return;
        };

        {
            let mut shot = projectile.borrow_mut();
            shot.damage = self.config.damage;
            shot.pose = Pose::new(muzzle_position(pose, &self.config), pose.rotation);
            shot.launch();
        }

        self.stats.shots_fired += 1;
        events.push(CombatEvent::ShotFired {
            attacker: self.attacker,
            target,
            projectile: projectile.id().slot,
        });
    }

    fn has_line_of_sight<B>(&self, candidate: H, pose: &Pose, field: &B) -> bool
    where
        B: Battlefield<H> + ?Sized,
    {
        let Some(candidate_pose) = field.pose_of(candidate) else {
            return false;
        };
        let origin = muzzle_position(pose, &self.config);
        let aim = candidate_pose.position + self.config.spawn_offset;
        // Coincident origin and aim: no direction to probe along.
        let Some(direction) = (aim - origin).try_normalize() else {
            return false;
        };

        let request = ProbeRequest {
            origin,
            radius: self.config.probe_radius,
            direction,
            max_distance: self.config.engagement_radius,
            mask: self.config.filter_mask,
        };
        field.probe(&request) == Some(candidate)
    }

    fn lock_movement<M>(&mut self, movement: &mut M, events: &mut Vec<CombatEvent<H>>)
    where
        M: MovementToggle + ?Sized,
    {
        movement.set_movement_enabled(false);
        if !self.movement_locked {
            self.movement_locked = true;
            events.push(CombatEvent::MovementLocked {
                attacker: self.attacker,
            });
        }
    }

    fn release_movement<M>(&mut self, movement: &mut M, events: &mut Vec<CombatEvent<H>>)
    where
        M: MovementToggle + ?Sized,
    {
        movement.set_movement_enabled(true);
        if self.movement_locked {
            self.movement_locked = false;
            events.push(CombatEvent::MovementReleased {
                attacker: self.attacker,
            });
        }
    }

    fn finish<M>(
        &mut self,
        reason: StopReason,
        movement: &mut M,
        events: &mut Vec<CombatEvent<H>>,
    ) where
        M: MovementToggle + ?Sized,
    {
        self.token.cancel();
        self.phase = CyclePhase::Idle;
        self.pending = None;
        self.current_target = None;
        self.release_movement(movement, events);
        events.push(CombatEvent::CycleStopped {
            attacker: self.attacker,
            reason,
        });
        debug!(attacker = ?self.attacker, ?reason, "attack cycle stopped");
    }
}

impl<H: fmt::Debug> fmt::Debug for AttackController<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttackController")
            .field("attacker", &self.attacker)
            .field("phase", &self.phase)
            .field("targets", &self.targets)
            .field("current_target", &self.current_target)
            .field("movement_locked", &self.movement_locked)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

/// Where a projectile spawns for an attacker at `pose`.
pub fn muzzle_position(pose: &Pose, config: &AttackConfig) -> Vec3 {
    pose.position + config.spawn_offset
}
