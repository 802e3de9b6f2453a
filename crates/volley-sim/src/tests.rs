//! Tests for the arena engine: determinism, engagement flow, commands and
//! scenarios.

use glam::Vec3;
use hecs::Entity;
use volley_combat::CombatError;
use volley_core::commands::ArenaCommand;
use volley_core::components::{Attacker, Enabled, Health};
use volley_core::config::AttackConfig;
use volley_core::constants::{BODY_CENTER_HEIGHT, TICK_RATE};
use volley_core::enums::{CyclePhase, RemovalCause, StopReason};
use volley_core::events::CombatEvent;
use volley_core::state::ArenaSnapshot;
use volley_pool::PoolError;

use crate::engine::{ArenaEngine, SimConfig};
use crate::error::ScenarioError;
use crate::scenario::{AttackerSpec, Scenario};

fn id(entity: Entity) -> u64 {
    entity.to_bits().get()
}

fn run_secs(engine: &mut ArenaEngine, secs: f64) -> Vec<ArenaSnapshot> {
    let ticks = (secs * TICK_RATE as f64).round() as usize;
    (0..ticks).map(|_| engine.tick()).collect()
}

fn all_events(snapshots: &[ArenaSnapshot]) -> Vec<CombatEvent<u64>> {
    snapshots
        .iter()
        .flat_map(|snap| snap.events.iter().cloned())
        .collect()
}

/// Attacker at the origin facing +Z with default config.
fn arena_with_attacker() -> (ArenaEngine, Entity) {
    let mut engine = ArenaEngine::new(SimConfig::default());
    let attacker = engine.spawn_attacker(&AttackerSpec::at(Vec3::ZERO)).unwrap();
    (engine, attacker)
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = ArenaEngine::new(SimConfig { seed: 12345 });
    let mut engine_b = ArenaEngine::new(SimConfig { seed: 12345 });
    engine_a.load_scenario(&Scenario::skirmish()).unwrap();
    engine_b.load_scenario(&Scenario::skirmish()).unwrap();

    for _ in 0..300 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = ArenaEngine::new(SimConfig { seed: 111 });
    let mut engine_b = ArenaEngine::new(SimConfig { seed: 222 });
    engine_a.load_scenario(&Scenario::skirmish()).unwrap();
    engine_b.load_scenario(&Scenario::skirmish()).unwrap();

    // Scattered candidates land in different places.
    let snap_a = engine_a.tick();
    let snap_b = engine_b.tick();
    let positions = |snap: &ArenaSnapshot| -> Vec<Vec3> {
        snap.candidates.iter().map(|c| c.position).collect()
    };
    assert_ne!(positions(&snap_a), positions(&snap_b));
}

// ---- Engagement ----

#[test]
fn test_attacker_kills_visible_candidate() {
    let (mut engine, attacker) = arena_with_attacker();
    let candidate = engine.spawn_candidate(Vec3::new(0.0, 0.0, 6.0), Vec3::ZERO, 25.0, 0.5);

    let snapshots = run_secs(&mut engine, 3.0);
    let events = all_events(&snapshots);

    assert!(events.contains(&CombatEvent::AttackStarted {
        attacker: id(attacker),
        target: id(candidate),
    }));
    let hits = events
        .iter()
        .filter(|e| matches!(e, CombatEvent::ProjectileHit { .. }))
        .count();
    assert_eq!(hits, 3);
    assert!(events.contains(&CombatEvent::CandidateKilled {
        target: id(candidate)
    }));

    assert!(!engine.world().get::<&Enabled>(candidate).unwrap().0);
    assert_eq!(engine.world().get::<&Health>(candidate).unwrap().current, 0.0);

    let last = snapshots.last().unwrap();
    let view = &last.attackers[0];
    assert_eq!(view.phase, CyclePhase::Idle);
    assert!(view.movement_enabled);
    assert!(view.candidates.is_empty());
    assert_eq!(view.shots_fired, 3);
    assert!(events.contains(&CombatEvent::CandidateRemoved {
        attacker: id(attacker),
        candidate: id(candidate),
        cause: RemovalCause::Invalid,
    }));
}

#[test]
fn test_movement_locked_while_engaging() {
    let mut engine = ArenaEngine::new(SimConfig::default());
    let spec = AttackerSpec::at(Vec3::ZERO).with_goal(Vec3::new(0.0, 0.0, 50.0));
    engine.spawn_attacker(&spec).unwrap();
    engine.spawn_candidate(Vec3::new(0.0, 0.0, 9.0), Vec3::ZERO, 1000.0, 0.5);

    // Walks until the first scan, then stands still while the target
    // stays visible.
    let snapshots = run_secs(&mut engine, 4.0);
    let early = &snapshots[20].attackers[0];
    let late = &snapshots.last().unwrap().attackers[0];

    assert!(early.position.z > 1.0);
    assert!(!early.movement_enabled);
    assert_eq!(early.phase, CyclePhase::Engaging);
    assert_eq!(early.position, late.position);
    assert!(!late.movement_enabled);
}

#[test]
fn test_obstacle_blocks_line_of_sight() {
    let (mut engine, attacker) = arena_with_attacker();
    engine.spawn_candidate(Vec3::new(0.0, 0.0, 8.0), Vec3::ZERO, 1000.0, 0.5);
    let pillar = engine.spawn_obstacle(Vec3::new(0.0, BODY_CENTER_HEIGHT, 4.0), 1.0);

    run_secs(&mut engine, 2.0);
    let controller = engine.controller(attacker).unwrap();
    assert_eq!(controller.phase(), CyclePhase::RetreatingUnlocked);
    assert_eq!(controller.stats().shots_fired, 0);
    assert!(controller.stats().scans >= 3);

    engine.queue_command(ArenaCommand::Despawn { id: id(pillar) });
    run_secs(&mut engine, 1.0);
    let controller = engine.controller(attacker).unwrap();
    assert_eq!(controller.phase(), CyclePhase::Engaging);
    assert!(controller.stats().shots_fired >= 1);
}

#[test]
fn test_first_visible_in_arrival_order() {
    let (mut engine, attacker) = arena_with_attacker();
    // Spawned first but hidden behind the pillar.
    engine.spawn_candidate(Vec3::new(0.0, 0.0, 8.0), Vec3::ZERO, 1000.0, 0.5);
    engine.spawn_obstacle(Vec3::new(0.0, BODY_CENTER_HEIGHT, 4.0), 1.0);
    let open = engine.spawn_candidate(Vec3::new(5.0, 0.0, 5.0), Vec3::ZERO, 1000.0, 0.5);
    let also_open = engine.spawn_candidate(Vec3::new(-5.0, 0.0, 5.0), Vec3::ZERO, 1000.0, 0.5);

    run_secs(&mut engine, 0.6);
    let controller = engine.controller(attacker).unwrap();
    assert_eq!(controller.targets().len(), 3);
    assert_eq!(controller.current_target(), Some(open));
    assert_ne!(controller.current_target(), Some(also_open));
}

#[test]
fn test_leaving_range_stops_cycle() {
    let (mut engine, attacker) = arena_with_attacker();
    let candidate = engine.spawn_candidate(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 1000.0, 0.5);

    run_secs(&mut engine, 0.6);
    assert!(engine.controller(attacker).unwrap().is_movement_locked());

    engine.queue_command(ArenaCommand::Teleport {
        id: id(candidate),
        position: Vec3::new(0.0, 0.0, 40.0),
    });
    let snapshots = run_secs(&mut engine, 0.1);
    let events = all_events(&snapshots);

    assert!(events.contains(&CombatEvent::CandidateRemoved {
        attacker: id(attacker),
        candidate: id(candidate),
        cause: RemovalCause::LeftRange,
    }));
    assert!(events.contains(&CombatEvent::CycleStopped {
        attacker: id(attacker),
        reason: StopReason::TargetsExhausted,
    }));
    let view = &snapshots.last().unwrap().attackers[0];
    assert_eq!(view.phase, CyclePhase::Idle);
    assert!(view.movement_enabled);
}

#[test]
fn test_disabled_candidate_purged_not_exited() {
    let (mut engine, attacker) = arena_with_attacker();
    let candidate = engine.spawn_candidate(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 1000.0, 0.5);

    run_secs(&mut engine, 0.6);
    engine.queue_command(ArenaCommand::Disable { id: id(candidate) });
    let snapshots = run_secs(&mut engine, 1.0);
    let events = all_events(&snapshots);

    let removals: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::CandidateRemoved { cause, .. } => Some(*cause),
            _ => None,
        })
        .collect();
    assert_eq!(removals, vec![RemovalCause::Invalid]);

    let controller = engine.controller(attacker).unwrap();
    assert_eq!(controller.phase(), CyclePhase::Idle);
    assert!(!controller.is_movement_locked());
}

#[test]
fn test_cancel_attack_command() {
    let (mut engine, attacker) = arena_with_attacker();
    engine.spawn_candidate(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 1000.0, 0.5);

    run_secs(&mut engine, 0.6);
    engine.queue_command(ArenaCommand::CancelAttack {
        attacker: id(attacker),
    });
    let snapshots = run_secs(&mut engine, 0.1);

    assert!(all_events(&snapshots).contains(&CombatEvent::CycleStopped {
        attacker: id(attacker),
        reason: StopReason::Cancelled,
    }));
    let view = &snapshots.last().unwrap().attackers[0];
    assert_eq!(view.phase, CyclePhase::Idle);
    assert!(view.movement_enabled);
    // Still tracked; only a new arrival restarts the cycle.
    assert_eq!(view.candidates.len(), 1);
}

#[test]
fn test_damage_command_kills() {
    let (mut engine, _attacker) = arena_with_attacker();
    let candidate = engine.spawn_candidate(Vec3::new(0.0, 0.0, 30.0), Vec3::ZERO, 10.0, 0.5);

    engine.queue_command(ArenaCommand::Damage {
        id: id(candidate),
        amount: 15.0,
    });
    let snap = engine.tick();
    assert!(snap.events.contains(&CombatEvent::CandidateKilled {
        target: id(candidate)
    }));
    assert!(!snap.candidates[0].enabled);
}

#[test]
fn test_unknown_entity_command_ignored() {
    let (mut engine, _attacker) = arena_with_attacker();
    engine.queue_command(ArenaCommand::Disable { id: u64::MAX });
    engine.queue_command(ArenaCommand::Disable { id: 0 });
    let snap = engine.tick();
    assert!(snap.events.is_empty());
}

// ---- Setup errors ----

#[test]
fn test_attacker_without_projectile_rejected() {
    let mut engine = ArenaEngine::new(SimConfig::default());
    let spec = AttackerSpec {
        projectile: None,
        ..AttackerSpec::at(Vec3::ZERO)
    };
    let err = engine.spawn_attacker(&spec).unwrap_err();
    assert!(matches!(err, CombatError::Pool(PoolError::InvalidPrototype)));
    assert_eq!(engine.world().query::<&Attacker>().iter().count(), 0);
    assert_eq!(engine.attackers().count(), 0);
}

#[test]
fn test_attacker_with_bad_config_rejected() {
    let mut engine = ArenaEngine::new(SimConfig::default());
    let spec = AttackerSpec::at(Vec3::ZERO).with_config(AttackConfig {
        attack_interval_secs: -1.0,
        ..AttackConfig::default()
    });
    assert!(matches!(
        engine.spawn_attacker(&spec),
        Err(CombatError::Config(_))
    ));
}

#[test]
fn test_scenario_unknown_timeline_target() {
    let json = r#"{
        "name": "broken",
        "timeline": [
            { "at_secs": 1.0, "target": "ghost", "command": { "type": "Disable", "id": 0 } }
        ]
    }"#;
    let scenario = Scenario::from_json(json).unwrap();
    let mut engine = ArenaEngine::new(SimConfig::default());
    let err = engine.load_scenario(&scenario).unwrap_err();
    assert!(matches!(err, ScenarioError::UnknownEntity(name) if name == "ghost"));
}

#[test]
fn test_scenario_malformed_json() {
    assert!(matches!(
        Scenario::from_json("{ \"attackers\": 3 }"),
        Err(ScenarioError::Json(_))
    ));
}

// ---- Snapshots ----

#[test]
fn test_snapshot_pool_statistics() {
    let (mut engine, attacker) = arena_with_attacker();
    let snap = engine.tick();

    let view = &snap.attackers[0];
    assert_eq!(view.id, id(attacker));
    // ceil(1 / 0.5 * 2.0)
    assert_eq!(view.pool.created, 4);
    assert_eq!(view.pool.available, 4);
    assert_eq!(view.pool.in_use, 0);
    assert_eq!(view.pool.limit, None);
    assert!((view.facing - Vec3::Z).length() < 1e-5);
}

#[test]
fn test_snapshot_lists_projectiles_in_flight() {
    let (mut engine, attacker) = arena_with_attacker();
    engine.spawn_candidate(Vec3::new(0.0, 0.0, 9.0), Vec3::ZERO, 1000.0, 0.5);

    let snapshots = run_secs(&mut engine, 0.6);
    let last = snapshots.last().unwrap();
    assert_eq!(last.projectiles.len(), 1);
    let shot = &last.projectiles[0];
    assert_eq!(shot.owner, id(attacker));
    assert!(shot.velocity.z > 0.0);
    assert!((shot.position.y - BODY_CENTER_HEIGHT).abs() < 1e-5);
    assert_eq!(last.attackers[0].pool.in_use, 1);
}

#[test]
fn test_tick_timing_30_ticks_one_second() {
    let mut engine = ArenaEngine::new(SimConfig::default());
    let snapshots = run_secs(&mut engine, 1.0);
    let last = snapshots.last().unwrap();
    assert_eq!(last.time.tick, 30);
    assert!((last.time.elapsed_secs - 1.0).abs() < 1e-9);
}
