use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use glam::Vec3;
use volley_core::config::{AttackConfig, ProjectileTemplate};
use volley_core::constants::DT;
use volley_core::enums::{CyclePhase, RemovalCause, StopReason};
use volley_core::error::ConfigError;
use volley_core::events::CombatEvent;
use volley_core::types::Pose;
use volley_pool::PoolError;

use crate::interfaces::{Liveness, MovementToggle, ProbeRequest, TransformLookup, VisibilityQuery};
use crate::projectile::Flight;
use crate::{AttackController, CombatError};

const ATTACKER: u32 = 0;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Candidates on a ring around the origin. The probe reports whichever
/// candidate lies along the request direction, or its blocker if one is set.
#[derive(Default)]
struct StubField {
    poses: HashMap<u32, Pose>,
    blocked_by: HashMap<u32, u32>,
    dead: HashSet<u32>,
    probes: RefCell<u32>,
}

impl StubField {
    fn place(&mut self, handle: u32, position: Vec3) {
        self.poses.insert(handle, Pose::new(position, Default::default()));
    }

    fn block(&mut self, handle: u32, blocker: u32) {
        self.blocked_by.insert(handle, blocker);
    }

    fn clear(&mut self, handle: u32) {
        self.blocked_by.remove(&handle);
    }
}

impl TransformLookup<u32> for StubField {
    fn pose_of(&self, handle: u32) -> Option<Pose> {
        self.poses.get(&handle).copied()
    }
}

impl VisibilityQuery<u32> for StubField {
    fn probe(&self, request: &ProbeRequest) -> Option<u32> {
        *self.probes.borrow_mut() += 1;
        let mut hits: Vec<_> = self
            .poses
            .iter()
            .filter(|(handle, _)| **handle != ATTACKER)
            .filter_map(|(&handle, pose)| {
                let to = pose.position - (request.origin - Vec3::Y);
                let distance = to.length();
                let aligned = to.normalize_or_zero().dot(request.direction) > 0.9999;
                (aligned && distance <= request.max_distance).then_some((handle, distance))
            })
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits.first()
            .map(|&(handle, _)| self.blocked_by.get(&handle).copied().unwrap_or(handle))
    }
}

impl Liveness<u32> for StubField {
    fn is_alive(&self, handle: u32) -> bool {
        self.poses.contains_key(&handle) && !self.dead.contains(&handle)
    }
}

#[derive(Debug, Default)]
struct RecordingToggle {
    enabled: Option<bool>,
    writes: Vec<bool>,
}

impl RecordingToggle {
    fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

impl MovementToggle for RecordingToggle {
    fn set_movement_enabled(&mut self, enabled: bool) {
        self.enabled = Some(enabled);
        self.writes.push(enabled);
    }
}

fn config() -> AttackConfig {
    AttackConfig {
        attack_interval_secs: 0.5,
        damage: 12.0,
        spawn_offset: Vec3::Y,
        engagement_radius: 20.0,
        ..Default::default()
    }
}

fn template() -> ProjectileTemplate {
    ProjectileTemplate {
        speed: 20.0,
        auto_destroy_secs: 2.0,
        ..Default::default()
    }
}

fn controller(config: AttackConfig) -> AttackController<u32> {
    AttackController::new(ATTACKER, config, Some(template())).unwrap()
}

fn attacker_pose() -> Pose {
    Pose::default()
}

/// Candidate `n` sits at distance 5 on a distinct bearing.
fn bearing(n: u32) -> Vec3 {
    let angle = n as f32 * 0.7;
    Vec3::new(angle.sin(), 0.0, angle.cos()) * 5.0
}

/// Field with candidates 1..=count, all visible.
fn field_with(count: u32) -> StubField {
    let mut field = StubField::default();
    for n in 1..=count {
        field.place(n, bearing(n));
    }
    field
}

struct Run {
    now: f64,
    events: Vec<CombatEvent<u32>>,
}

impl Run {
    fn new() -> Self {
        Self {
            now: 0.0,
            events: Vec::new(),
        }
    }

    /// Step the clock by `secs` in fixed ticks, updating the controller
    /// each tick.
    fn advance(
        &mut self,
        secs: f64,
        ctl: &mut AttackController<u32>,
        field: &StubField,
        movement: &mut RecordingToggle,
    ) {
        let steps = (secs / DT).round() as u32;
        for _ in 0..steps {
            self.now += DT;
            ctl.update(self.now, &attacker_pose(), field, movement, &mut self.events);
        }
    }

    fn count(&self, pred: impl Fn(&CombatEvent<u32>) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn test_zero_interval_rejected() {
    let config = AttackConfig {
        attack_interval_secs: 0.0,
        ..config()
    };
    let err = AttackController::new(ATTACKER, config, Some(template())).unwrap_err();
    assert!(matches!(
        err,
        CombatError::Config(ConfigError::NonPositiveInterval(_))
    ));
}

#[test]
fn test_missing_template_rejected() {
    let err = AttackController::<u32>::new(ATTACKER, config(), None).unwrap_err();
    assert!(matches!(err, CombatError::Pool(PoolError::InvalidPrototype)));
}

#[test]
fn test_pool_presized_from_interval_and_lifetime() {
    // ceil(1 / 0.5 * 2.0) = 4
    let ctl = controller(config());
    assert_eq!(ctl.pool().len(), 4);
    assert_eq!(ctl.pool().available(), 4);
    assert_eq!(ctl.phase(), CyclePhase::Idle);
}

#[test]
fn test_tiny_interval_fails_instead_of_allocating() {
    let config = AttackConfig {
        attack_interval_secs: 1e-300,
        ..config()
    };
    assert!(config.validate().is_ok());
    assert!(matches!(
        AttackController::new(ATTACKER, config, Some(template())),
        Err(CombatError::Config(ConfigError::PoolSizeTooLarge { .. }))
    ));
}

#[test]
fn test_start_twice_is_an_error() {
    let mut ctl = controller(config());
    let mut events = Vec::new();
    ctl.start(0.0, &mut events).unwrap();
    assert!(matches!(
        ctl.start(0.1, &mut events),
        Err(CombatError::CycleAlreadyRunning)
    ));
    assert_eq!(events, vec![CombatEvent::CycleStarted { attacker: ATTACKER }]);
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

#[test]
fn test_first_visible_candidate_wins() {
    let mut field = field_with(3);
    field.block(1, 99);
    field.block(3, 99);
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut run = Run::new();

    for n in 1..=3 {
        assert!(ctl.add_candidate(n, run.now, &mut run.events));
    }
    run.advance(0.5, &mut ctl, &field, &mut movement);

    assert_eq!(ctl.current_target(), Some(2));
    assert_eq!(ctl.phase(), CyclePhase::Engaging);
    assert!(run.events.contains(&CombatEvent::AttackStarted {
        attacker: ATTACKER,
        target: 2
    }));
    assert_eq!(
        run.count(|e| matches!(e, CombatEvent::ShotFired { target: 2, .. })),
        1
    );
}

#[test]
fn test_arrival_order_breaks_ties() {
    let field = field_with(3);
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut run = Run::new();

    for n in [3, 1, 2] {
        ctl.add_candidate(n, run.now, &mut run.events);
    }
    run.advance(0.5, &mut ctl, &field, &mut movement);
    assert_eq!(ctl.current_target(), Some(3));
}

#[test]
fn test_first_scan_waits_one_interval() {
    let field = field_with(1);
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut run = Run::new();

    ctl.add_candidate(1, run.now, &mut run.events);
    run.advance(0.4, &mut ctl, &field, &mut movement);
    assert_eq!(ctl.stats().scans, 0);
    assert!(movement.writes.is_empty());

    run.advance(0.1, &mut ctl, &field, &mut movement);
    assert_eq!(ctl.stats().scans, 1);
    assert_eq!(ctl.stats().shots_fired, 1);
}

#[test]
fn test_sustained_fire_rate_and_lock() {
    let field = field_with(1);
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut run = Run::new();

    ctl.add_candidate(1, run.now, &mut run.events);
    run.advance(0.5, &mut ctl, &field, &mut movement);
    assert!(ctl.is_movement_locked());

    // 9.5 more seconds with the target visible the whole time.
    for _ in 0..285 {
        run.advance(DT, &mut ctl, &field, &mut movement);
        assert!(!movement.is_enabled());
    }

    let fired = ctl.stats().shots_fired;
    assert!((19..=21).contains(&fired), "fired {fired}");
    assert!(movement.writes.iter().all(|&enabled| !enabled));
    assert_eq!(run.count(|e| matches!(e, CombatEvent::MovementLocked { .. })), 1);
    assert_eq!(run.count(|e| matches!(e, CombatEvent::AttackStarted { .. })), 1);
}

#[test]
fn test_nothing_visible_keeps_movement() {
    let mut field = field_with(2);
    field.block(1, 99);
    field.block(2, 99);
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut run = Run::new();

    ctl.add_candidate(1, run.now, &mut run.events);
    ctl.add_candidate(2, run.now, &mut run.events);
    run.advance(3.0, &mut ctl, &field, &mut movement);

    assert!(movement.is_enabled());
    assert_eq!(ctl.phase(), CyclePhase::RetreatingUnlocked);
    assert_eq!(ctl.stats().shots_fired, 0);
    assert!(ctl.stats().scans >= 3);
    assert_eq!(run.count(|e| matches!(e, CombatEvent::MovementLocked { .. })), 0);
}

#[test]
fn test_target_out_of_engagement_radius_is_not_visible() {
    let mut field = StubField::default();
    field.place(1, Vec3::new(0.0, 0.0, 30.0));
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut run = Run::new();

    ctl.add_candidate(1, run.now, &mut run.events);
    run.advance(0.5, &mut ctl, &field, &mut movement);
    assert_eq!(ctl.current_target(), None);
}

#[test]
fn test_coincident_candidate_is_not_visible() {
    let mut field = StubField::default();
    field.place(1, Vec3::ZERO);
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut run = Run::new();

    ctl.add_candidate(1, run.now, &mut run.events);
    run.advance(0.5, &mut ctl, &field, &mut movement);
    assert_eq!(ctl.current_target(), None);
    assert_eq!(*field.probes.borrow(), 0);
}

// ---------------------------------------------------------------------------
// Recheck
// ---------------------------------------------------------------------------

#[test]
fn test_lost_target_unlocks_at_recheck() {
    let mut field = field_with(1);
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut run = Run::new();

    ctl.add_candidate(1, run.now, &mut run.events);
    run.advance(0.5, &mut ctl, &field, &mut movement);
    assert!(!movement.is_enabled());

    field.block(1, 99);
    run.advance(0.4, &mut ctl, &field, &mut movement);
    assert!(!movement.is_enabled());

    run.advance(0.1, &mut ctl, &field, &mut movement);
    assert!(movement.is_enabled());
    assert!(!ctl.is_movement_locked());
    assert_eq!(
        run.count(|e| matches!(e, CombatEvent::MovementReleased { .. })),
        1
    );
}

#[test]
fn test_reacquisition_emits_attack_started_again() {
    let mut field = field_with(1);
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut run = Run::new();

    ctl.add_candidate(1, run.now, &mut run.events);
    run.advance(0.5, &mut ctl, &field, &mut movement);
    field.block(1, 99);
    run.advance(1.0, &mut ctl, &field, &mut movement);
    assert_eq!(ctl.current_target(), None);

    field.clear(1);
    run.advance(1.0, &mut ctl, &field, &mut movement);
    assert_eq!(ctl.current_target(), Some(1));
    assert_eq!(run.count(|e| matches!(e, CombatEvent::AttackStarted { .. })), 2);
    assert_eq!(ctl.stats().acquisitions, 2);
}

#[test]
fn test_dead_candidates_purged_in_order() {
    let mut field = field_with(4);
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut run = Run::new();

    for n in 1..=4 {
        ctl.add_candidate(n, run.now, &mut run.events);
    }
    run.advance(0.5, &mut ctl, &field, &mut movement);
    field.dead.insert(1);
    field.dead.insert(3);
    run.advance(0.5, &mut ctl, &field, &mut movement);

    assert_eq!(ctl.targets().snapshot(), &[2, 4]);
    let purged: Vec<_> = run
        .events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::CandidateRemoved {
                candidate,
                cause: RemovalCause::Invalid,
                ..
            } => Some(*candidate),
            _ => None,
        })
        .collect();
    assert_eq!(purged, vec![1, 3]);
    assert_eq!(ctl.stats().purged, 2);
}

#[test]
fn test_all_candidates_dead_ends_cycle() {
    let mut field = field_with(1);
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut run = Run::new();

    ctl.add_candidate(1, run.now, &mut run.events);
    run.advance(0.5, &mut ctl, &field, &mut movement);
    assert!(!movement.is_enabled());

    field.dead.insert(1);
    run.advance(0.5, &mut ctl, &field, &mut movement);

    assert_eq!(ctl.phase(), CyclePhase::Idle);
    assert!(ctl.targets().is_empty());
    assert!(movement.is_enabled());
    assert_eq!(ctl.next_wake(), None);
    assert_eq!(
        run.events.last(),
        Some(&CombatEvent::CycleStopped {
            attacker: ATTACKER,
            reason: StopReason::TargetsExhausted
        })
    );
}

// ---------------------------------------------------------------------------
// Membership changes
// ---------------------------------------------------------------------------

#[test]
fn test_add_candidate_starts_cycle_once() {
    let mut ctl = controller(config());
    let mut events = Vec::new();

    assert!(ctl.add_candidate(1, 0.0, &mut events));
    assert!(ctl.add_candidate(2, 0.1, &mut events));
    assert!(!ctl.add_candidate(1, 0.2, &mut events));

    assert_eq!(ctl.targets().len(), 2);
    assert_eq!(ctl.stats().cycles, 1);
    assert_eq!(ctl.next_wake(), Some(0.5));
}

#[test]
fn test_last_candidate_leaving_stops_cycle() {
    let field = field_with(1);
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut run = Run::new();

    ctl.add_candidate(1, run.now, &mut run.events);
    run.advance(0.5, &mut ctl, &field, &mut movement);
    assert!(ctl.is_movement_locked());

    assert!(ctl.remove_candidate(1, &mut movement, &mut run.events));
    assert_eq!(ctl.phase(), CyclePhase::Idle);
    assert!(movement.is_enabled());
    assert!(!ctl.remove_candidate(1, &mut movement, &mut run.events));
}

#[test]
fn test_leaving_while_idle_unlocks_movement() {
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    movement.set_movement_enabled(false);
    let mut events = Vec::new();

    // Track without starting a cycle by stopping right after.
    ctl.add_candidate(1, 0.0, &mut events);
    ctl.add_candidate(2, 0.0, &mut events);
    ctl.stop(&mut movement, &mut events);
    movement.set_movement_enabled(false);

    assert!(ctl.remove_candidate(1, &mut movement, &mut events));
    assert!(movement.is_enabled());
}

#[test]
fn test_untracked_leave_while_idle_unlocks_movement() {
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    movement.set_movement_enabled(false);
    let mut events = Vec::new();

    assert!(!ctl.remove_candidate(7, &mut movement, &mut events));
    assert!(movement.is_enabled());
    assert!(events.is_empty());
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[test]
fn test_cancellation_token_stops_cycle() {
    let field = field_with(1);
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut run = Run::new();

    ctl.add_candidate(1, run.now, &mut run.events);
    run.advance(0.5, &mut ctl, &field, &mut movement);
    assert!(!movement.is_enabled());

    let token = ctl.cancellation_token();
    token.cancel();
    run.advance(DT, &mut ctl, &field, &mut movement);

    assert_eq!(ctl.phase(), CyclePhase::Idle);
    assert!(movement.is_enabled());
    assert!(run.events.contains(&CombatEvent::CycleStopped {
        attacker: ATTACKER,
        reason: StopReason::Cancelled
    }));

    // Candidate is still in range but nothing restarts on its own.
    run.advance(2.0, &mut ctl, &field, &mut movement);
    assert_eq!(ctl.stats().shots_fired, 1);
}

#[test]
fn test_stop_mid_cycle_unlocks() {
    let field = field_with(1);
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut run = Run::new();

    ctl.add_candidate(1, run.now, &mut run.events);
    run.advance(0.6, &mut ctl, &field, &mut movement);
    ctl.stop(&mut movement, &mut run.events);

    assert!(movement.is_enabled());
    assert!(!ctl.is_movement_locked());
    assert_eq!(ctl.current_target(), None);
}

#[test]
fn test_new_cycle_gets_fresh_token() {
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut events = Vec::new();

    ctl.start(0.0, &mut events).unwrap();
    let first = ctl.cancellation_token();
    ctl.stop(&mut movement, &mut events);
    assert!(first.is_cancelled());

    ctl.start(1.0, &mut events).unwrap();
    assert!(!ctl.cancellation_token().is_cancelled());
}

// ---------------------------------------------------------------------------
// Projectiles
// ---------------------------------------------------------------------------

#[test]
fn test_launched_projectile_configuration() {
    let field = field_with(1);
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut run = Run::new();

    ctl.add_candidate(1, run.now, &mut run.events);
    run.advance(0.5, &mut ctl, &field, &mut movement);

    let flying = ctl.projectiles_in_flight();
    assert_eq!(flying.len(), 1);
    let shot = flying[0].borrow();
    assert_eq!(shot.damage, 12.0);
    assert_eq!(shot.pose.position, Vec3::Y);
    assert!((shot.velocity - Vec3::Z * 20.0).length() < 1e-4);
    assert_eq!(shot.age_secs, 0.0);
}

#[test]
fn test_expiring_projectiles_keep_pool_at_presize() {
    let field = field_with(1);
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut run = Run::new();

    ctl.add_candidate(1, run.now, &mut run.events);
    for _ in 0..300 {
        for shot in ctl.projectiles_in_flight() {
            let flight = shot.borrow_mut().advance(DT);
            if flight == Flight::Expired {
                shot.deactivate();
            }
        }
        run.advance(DT, &mut ctl, &field, &mut movement);
    }

    assert!(ctl.stats().shots_fired >= 19);
    assert!(ctl.pool().len() <= 5, "pool grew to {}", ctl.pool().len());
}

#[test]
fn test_capped_pool_skips_then_recovers() {
    let field = field_with(1);
    let config = AttackConfig {
        pool_size: Some(1),
        pool_limit: Some(1),
        ..config()
    };
    let mut ctl = controller(config);
    let mut movement = RecordingToggle::default();
    let mut run = Run::new();

    ctl.add_candidate(1, run.now, &mut run.events);
    run.advance(0.5, &mut ctl, &field, &mut movement);
    assert_eq!(ctl.stats().shots_fired, 1);

    run.advance(0.5, &mut ctl, &field, &mut movement);
    assert_eq!(ctl.stats().shots_skipped, 1);
    assert_eq!(ctl.phase(), CyclePhase::Engaging);
    assert!(ctl.is_movement_locked());

    for shot in ctl.projectiles_in_flight() {
        shot.deactivate();
    }
    run.advance(0.5, &mut ctl, &field, &mut movement);
    assert_eq!(ctl.stats().shots_fired, 2);
    assert_eq!(ctl.pool().len(), 1);
}

#[test]
fn test_late_update_catches_up_on_schedule() {
    let field = field_with(1);
    let mut ctl = controller(config());
    let mut movement = RecordingToggle::default();
    let mut events = Vec::new();

    ctl.add_candidate(1, 0.0, &mut events);
    // One update at 2.0 runs every step due since 0.5: scans at 0.5, 1.0,
    // 1.5 and 2.0, each recheck sharing its instant with the next scan.
    ctl.update(2.0, &attacker_pose(), &field, &mut movement, &mut events);
    assert_eq!(ctl.stats().scans, 4);
    assert_eq!(ctl.stats().shots_fired, 4);
    assert_eq!(ctl.next_wake(), Some(2.5));
}
