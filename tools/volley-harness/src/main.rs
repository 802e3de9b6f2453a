//! volley-harness: run an arena scenario headless and report what happened.
//!
//! Usage:
//!   volley-harness run --scenario patrol.json --secs 20 --seed 7
//!   volley-harness run --json
//!   volley-harness skirmish

use std::path::PathBuf;
use std::process;

use tracing::info;
use volley_core::constants::TICK_RATE;
use volley_core::events::CombatEvent;
use volley_sim::{ArenaEngine, Scenario, SimConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "skirmish" => cmd_skirmish(),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "volley-harness: VOLLEY arena runner\n\
         \n\
         Commands:\n\
         \n\
         run       Run a scenario and print a summary\n\
         \n\
           --scenario <path>  Scenario JSON (default: built-in skirmish)\n\
           --secs <N>         Simulated seconds (default: 20)\n\
           --seed <N>         RNG seed (default: 42)\n\
           --json             Print the final snapshot as JSON instead\n\
         \n\
         skirmish  Print the built-in skirmish scenario as JSON\n\
         \n\
         Examples:\n\
         \n\
           volley-harness run --secs 30\n\
           volley-harness skirmish > skirmish.json && volley-harness run --scenario skirmish.json --json\n"
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_number<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    match flag_value(args, flag) {
        Some(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                eprintln!("Error: {flag} expects a number, got '{raw}'");
                process::exit(1);
            }
        },
        None => default,
    }
}

// --- Run command ---

fn cmd_run(args: &[String]) {
    let secs: f64 = parse_number(args, "--secs", 20.0);
    let seed: u64 = parse_number(args, "--seed", 42);
    let as_json = args.iter().any(|arg| arg == "--json");

    let scenario = match flag_value(args, "--scenario").map(PathBuf::from) {
        Some(path) => match Scenario::load(&path) {
            Ok(scenario) => scenario,
            Err(err) => {
                eprintln!("Error: {}: {err}", path.display());
                process::exit(1);
            }
        },
        None => Scenario::skirmish(),
    };

    let mut engine = ArenaEngine::new(SimConfig { seed });
    if let Err(err) = engine.load_scenario(&scenario) {
        eprintln!("Error: {err}");
        process::exit(1);
    }

    let ticks = (secs * TICK_RATE as f64).round().max(1.0) as u64;
    let mut shots = 0usize;
    let mut hits = 0usize;
    let mut kills = 0usize;
    let mut last = None;
    for _ in 0..ticks {
        let snap = engine.tick();
        for event in &snap.events {
            match event {
                CombatEvent::ShotFired { .. } => shots += 1,
                CombatEvent::ProjectileHit { .. } => hits += 1,
                CombatEvent::CandidateKilled { .. } => kills += 1,
                _ => {}
            }
        }
        last = Some(snap);
    }

    info!(scenario = %scenario.name, ticks, shots, hits, kills, "run complete");

    let Some(snap) = last else {
        return;
    };
    if as_json {
        match serde_json::to_string_pretty(&snap) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("Error: failed to serialize snapshot: {err}");
                process::exit(1);
            }
        }
        return;
    }

    println!(
        "{} after {:.1}s: {shots} shots, {hits} hits, {kills} kills",
        scenario.name, snap.time.elapsed_secs
    );
    for view in &snap.attackers {
        println!(
            "  attacker {}: {:?}, movement {}, fired {}, skipped {}, pool {}/{} in use (peak {}{})",
            view.id,
            view.phase,
            if view.movement_enabled { "on" } else { "locked" },
            view.shots_fired,
            view.shots_skipped,
            view.pool.in_use,
            view.pool.created,
            view.pool.high_water,
            view.pool
                .limit
                .map(|limit| format!(", cap {limit}"))
                .unwrap_or_default(),
        );
    }
    let alive = snap.candidates.iter().filter(|c| c.enabled).count();
    println!("  candidates: {alive}/{} standing", snap.candidates.len());
}

// --- Skirmish command ---

fn cmd_skirmish() {
    match serde_json::to_string_pretty(&Scenario::skirmish()) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("Error: failed to serialize scenario: {err}");
            process::exit(1);
        }
    }
}
