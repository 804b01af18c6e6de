//! Headless Skirmish Runner
//!
//! Runs a deterministic duel scenario through the melee pipeline and
//! outputs a JSON report of the per-tick telemetry. Two runs with the same
//! arguments produce byte-identical output, which makes this binary the
//! quickest replay-divergence check available.

use std::sync::Arc;

use arc_melee::actor::TemporalModifiers;
use arc_melee::combat::damage::{DamagePacket, DamageSchool};
use arc_melee::combat::defense::{DefenseTuning, RipostePolicy};
use arc_melee::combat::procs::{ProcEntry, ProcPayloadArgs, ProcPayloadKind};
use arc_melee::combat::request::AttackOptions;
use arc_melee::combat::telemetry::TelemetryKind;
use arc_melee::combat::weapons::{MultiAttackConfig, WeaponDef};
use arc_melee::dispatch::RecordingDispatcher;
use arc_melee::simulation::run_melee_tick;
use arc_melee::world::MeleeWorld;
use clap::Parser;
use glam::Vec3;
use serde::Serialize;

/// Headless Skirmish Runner - deterministic duel scenarios
#[derive(Parser, Debug)]
#[command(name = "skirmish_runner")]
#[command(about = "Run a deterministic melee skirmish and output telemetry")]
struct Args {
    /// Number of ticks to simulate
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Fixed tick length in seconds
    #[arg(long, default_value_t = 0.05)]
    delta: f32,

    /// Ticks between attack requests from each combatant
    #[arg(long, default_value_t = 20)]
    attack_interval: u64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// JSON output structure
#[derive(Serialize)]
struct SkirmishReport {
    ticks: u64,
    swings_began: usize,
    swings_rejected: usize,
    hits: usize,
    dodges: usize,
    parries: usize,
    blocks: usize,
    ripostes_queued: usize,
    procs_triggered: usize,
    cleaves_triggered: usize,
    total_damage: i64,
    payloads_dispatched: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("arc_melee=debug")
        .init();

    let args = Args::parse();

    let mut world = MeleeWorld::new(args.delta);
    let mut dispatcher = RecordingDispatcher::new();

    let sword = Arc::new(WeaponDef {
        weapon_id: "arming_sword".into(),
        base_damage: DamagePacket {
            school: DamageSchool::Physical,
            amount: 12,
            ..Default::default()
        },
        windup_seconds: 0.3,
        active_seconds: 0.15,
        recovery_seconds: 0.4,
        range: 2.5,
        baseline_arc_degrees: 120.0,
        penetration_count: 1,
        stamina_cost: 5,
        // Short enough that a next-tick chain follow-up clears the gate
        lockout_seconds: 0.05,
        default_cleave_arc_degrees: 90.0,
        default_cleave_max_targets: 3,
        proc_entries: vec![ProcEntry {
            proc_id: "sear".into(),
            chance_percent: 25.0,
            internal_cooldown_seconds: 1.0,
            payload_kind: ProcPayloadKind::ExtraDamage,
            payload_ref: "sear_burst".into(),
            payload: ProcPayloadArgs {
                int0: 4,
                int1: 1,
                ..Default::default()
            },
            ..Default::default()
        }],
        multi_attack: MultiAttackConfig {
            double_chance_percent: 15.0,
            max_chain_depth: 2,
            ..Default::default()
        },
    });

    let left = world.spawn_actor(Vec3::new(0.0, 0.0, 0.0));
    let right = world.spawn_actor(Vec3::new(0.0, 0.0, 1.5));

    {
        let actor = world.actor_mut(left).unwrap();
        actor.add_weapon_slot("main_hand", sword.clone());
        actor.stamina = 100;
        actor.defense = DefenseTuning {
            dodge_chance: 10.0,
            parry_chance: 10.0,
            block_chance: 20.0,
            block_flat: 2.0,
            block_percent: 0.4,
            riposte_policy: RipostePolicy::NextTick,
            riposte_weapon_slot: "main_hand".into(),
        };
    }
    {
        let actor = world.actor_mut(right).unwrap();
        actor.add_weapon_slot("main_hand", sword);
        actor.stamina = 100;
        actor.temporal = TemporalModifiers {
            haste_percent: 0.2,
            slow_percent: 0.0,
        };
        actor.defense = DefenseTuning {
            dodge_chance: 15.0,
            parry_chance: 5.0,
            block_chance: 10.0,
            block_flat: 0.0,
            block_percent: 0.3,
            riposte_policy: RipostePolicy::Immediate,
            riposte_weapon_slot: "main_hand".into(),
        };
    }

    let mut report = SkirmishReport {
        ticks: args.ticks,
        swings_began: 0,
        swings_rejected: 0,
        hits: 0,
        dodges: 0,
        parries: 0,
        blocks: 0,
        ripostes_queued: 0,
        procs_triggered: 0,
        cleaves_triggered: 0,
        total_damage: 0,
        payloads_dispatched: 0,
    };

    for tick in 0..args.ticks {
        if tick % args.attack_interval == 0 {
            let _ = world.queue_attack(left, AttackOptions::new("main_hand", Vec3::Z).with_target(right));
            let _ = world.queue_attack(right, AttackOptions::new("main_hand", Vec3::NEG_Z).with_target(left));
        }

        run_melee_tick(&mut world, &mut dispatcher);

        report.swings_began += world.telemetry.count(TelemetryKind::SwingBegan);
        report.swings_rejected += world.telemetry.count(TelemetryKind::SwingRejected);
        report.hits += world.telemetry.count(TelemetryKind::Hit);
        report.dodges += world.telemetry.count(TelemetryKind::Dodged);
        report.parries += world.telemetry.count(TelemetryKind::Parried);
        report.blocks += world.telemetry.count(TelemetryKind::Blocked);
        report.ripostes_queued += world.telemetry.count(TelemetryKind::RiposteQueued);
        report.procs_triggered += world.telemetry.count(TelemetryKind::ProcTriggered);
        report.cleaves_triggered += world.telemetry.count(TelemetryKind::CleaveTriggered);
        report.total_damage += world
            .telemetry
            .of_kind(TelemetryKind::Hit)
            .map(|e| e.value0 as i64)
            .sum::<i64>();
    }

    report.payloads_dispatched = dispatcher.records.len();

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report).unwrap());
        }
        "text" => {
            println!("Skirmish Report");
            println!("===============");
            println!("Ticks: {}", report.ticks);
            println!("Swings: {} began, {} rejected", report.swings_began, report.swings_rejected);
            println!(
                "Outcomes: {} hits, {} dodges, {} parries, {} blocks",
                report.hits, report.dodges, report.parries, report.blocks
            );
            println!("Ripostes queued: {}", report.ripostes_queued);
            println!("Procs triggered: {}", report.procs_triggered);
            println!("Cleaves triggered: {}", report.cleaves_triggered);
            println!("Total damage: {}", report.total_damage);
            println!("Payloads dispatched: {}", report.payloads_dispatched);
        }
        _ => {
            eprintln!("Unknown format '{}', defaulting to json", args.format);
            println!("{}", serde_json::to_string_pretty(&report).unwrap());
        }
    }
}
