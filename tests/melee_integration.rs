//! Full-pipeline tests driving `run_melee_tick` end to end
//!
//! Mitigation chances are pinned to 0 or 100 so no RNG draw is consumed
//! and every outcome is forced.

use std::sync::Arc;

use arc_melee::actor::StatSnapshot;
use arc_melee::combat::damage::DamagePacket;
use arc_melee::combat::defense::RipostePolicy;
use arc_melee::combat::procs::{ProcEntry, ProcPayloadArgs, ProcPayloadKind};
use arc_melee::combat::request::{AttackOptions, RequestFlags};
use arc_melee::combat::swing::SwingPhase;
use arc_melee::combat::telemetry::TelemetryKind;
use arc_melee::combat::wards::{DamageShieldState, WardState};
use arc_melee::combat::weapons::{MultiAttackConfig, WeaponDef};
use arc_melee::core::types::ActorId;
use arc_melee::dispatch::RecordingDispatcher;
use arc_melee::simulation::run_melee_tick;
use arc_melee::world::MeleeWorld;
use glam::Vec3;

fn duel_weapon() -> Arc<WeaponDef> {
    Arc::new(WeaponDef {
        weapon_id: "duel_blade".into(),
        base_damage: DamagePacket {
            amount: 20,
            ..Default::default()
        },
        windup_seconds: 0.0,
        active_seconds: 0.2,
        recovery_seconds: 0.1,
        range: 3.0,
        baseline_arc_degrees: 120.0,
        penetration_count: 1,
        stamina_cost: 0,
        lockout_seconds: 0.0,
        default_cleave_arc_degrees: 90.0,
        default_cleave_max_targets: 3,
        ..Default::default()
    })
}

/// Two actors 1.5 units apart, the first armed and aiming at the second
fn duel() -> (MeleeWorld, ActorId, ActorId) {
    let mut world = MeleeWorld::new(0.05);
    let attacker = world.spawn_actor(Vec3::ZERO);
    let defender = world.spawn_actor(Vec3::new(0.0, 0.0, 1.5));
    world
        .actor_mut(attacker)
        .unwrap()
        .add_weapon_slot("main_hand", duel_weapon());
    (world, attacker, defender)
}

fn strike(world: &mut MeleeWorld, attacker: ActorId, defender: ActorId) {
    world
        .queue_attack(attacker, AttackOptions::new("main_hand", Vec3::Z).with_target(defender))
        .unwrap();
}

#[test]
fn plain_hit_lands_damage_in_inbox() {
    let (mut world, attacker, defender) = duel();
    let mut dispatcher = RecordingDispatcher::new();

    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut dispatcher);

    assert_eq!(world.telemetry.count(TelemetryKind::Hit), 1);
    let inbox = &world.actor(defender).unwrap().damage_inbox;
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].packet.amount, 20);
    assert_eq!(inbox[0].packet.source, Some(attacker));
    assert_eq!(inbox[0].target, defender);
}

#[test]
fn dodge_preempts_the_entire_chain() {
    let (mut world, attacker, defender) = duel();
    world.actor_mut(defender).unwrap().defense.dodge_chance = 100.0;
    let mut dispatcher = RecordingDispatcher::new();

    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut dispatcher);

    assert_eq!(world.telemetry.count(TelemetryKind::Dodged), 1);
    assert_eq!(world.telemetry.count(TelemetryKind::Hit), 0);
    assert!(world.actor(defender).unwrap().damage_inbox.is_empty());
}

#[test]
fn parry_window_queues_riposte_that_strikes_back() {
    let (mut world, attacker, defender) = duel();
    {
        let d = world.actor_mut(defender).unwrap();
        d.add_weapon_slot("main_hand", duel_weapon());
        d.defense.riposte_policy = RipostePolicy::NextTick;
        d.defense.riposte_weapon_slot = "main_hand".into();
        d.arm_parry_window(10.0);
    }
    let mut dispatcher = RecordingDispatcher::new();

    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut dispatcher);

    assert_eq!(world.telemetry.count(TelemetryKind::Parried), 1);
    assert_eq!(world.telemetry.count(TelemetryKind::RiposteQueued), 1);
    assert!(world.actor(defender).unwrap().damage_inbox.is_empty());
    assert_eq!(world.actor(defender).unwrap().pending_ripostes.len(), 1);

    // Next tick the riposte drains into a swing and strikes the attacker.
    run_melee_tick(&mut world, &mut dispatcher);

    let riposte_swing = world
        .swings
        .iter()
        .find(|s| s.attacker == defender)
        .unwrap();
    assert!(riposte_swing.riposte_origin);
    assert_eq!(world.actor(attacker).unwrap().damage_inbox.len(), 1);
}

#[test]
fn block_applies_percent_then_flat() {
    let (mut world, attacker, defender) = duel();
    {
        let defense = &mut world.actor_mut(defender).unwrap().defense;
        defense.block_chance = 100.0;
        defense.block_percent = 0.5;
        defense.block_flat = 2.0;
    }
    let mut dispatcher = RecordingDispatcher::new();

    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut dispatcher);

    // floor(20 * 0.5) - 2 = 8
    let blocked: Vec<_> = world.telemetry.of_kind(TelemetryKind::Blocked).collect();
    assert_eq!(blocked.len(), 1);
    assert_eq!(blocked[0].value0, 8.0);
    assert_eq!(world.actor(defender).unwrap().damage_inbox[0].packet.amount, 8);
}

#[test]
fn ward_pool_absorbs_before_damage_lands() {
    let (mut world, attacker, defender) = duel();
    world.actor_mut(defender).unwrap().wards.push(WardState {
        ward_id: "barrier".into(),
        remaining_pool: 15,
        remaining_activations: 1,
        max_activations: 1,
        ..Default::default()
    });
    let mut dispatcher = RecordingDispatcher::new();

    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut dispatcher);

    let consumed: Vec<_> = world.telemetry.of_kind(TelemetryKind::WardConsumed).collect();
    assert_eq!(consumed.len(), 1);
    assert_eq!(consumed[0].value0, 15.0);
    // Ward events are defender-attributed.
    assert_eq!(consumed[0].attacker, defender);
    assert_eq!(consumed[0].target, Some(attacker));
    assert_eq!(world.actor(defender).unwrap().damage_inbox[0].packet.amount, 5);
}

#[test]
fn fully_absorbed_hit_still_records_the_hit() {
    let (mut world, attacker, defender) = duel();
    world.actor_mut(defender).unwrap().wards.push(WardState {
        ward_id: "bulwark".into(),
        absorb_flat: 100.0,
        ..Default::default()
    });
    let mut dispatcher = RecordingDispatcher::new();

    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut dispatcher);

    let hits: Vec<_> = world.telemetry.of_kind(TelemetryKind::Hit).collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].value0, 0.0);
    assert!(world.actor(defender).unwrap().damage_inbox.is_empty());
}

#[test]
fn shield_gating_preserved_for_plain_hits() {
    let (mut world, attacker, defender) = duel();
    {
        let d = world.actor_mut(defender).unwrap();
        // Blocks everything, so the hit resolves as blocked with 0 damage.
        d.defense.block_chance = 100.0;
        d.defense.block_percent = 1.0;
        d.damage_shields.push(DamageShieldState {
            shield_id: "thorns_plain".into(),
            payload_kind: ProcPayloadKind::ExtraDamage,
            payload_ref: "thorns_plain".into(),
            arg_int0: 7,
            trigger_on_block: false,
            ..Default::default()
        });
        d.damage_shields.push(DamageShieldState {
            shield_id: "thorns_guard".into(),
            payload_kind: ProcPayloadKind::ExtraDamage,
            payload_ref: "thorns_guard".into(),
            arg_int0: 7,
            trigger_on_block: true,
            ..Default::default()
        });
    }
    let mut dispatcher = RecordingDispatcher::new();

    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut dispatcher);

    // Only the block-enabled shield retaliates against a blocked hit.
    assert_eq!(world.telemetry.count(TelemetryKind::DamageShieldTriggered), 1);
    assert_eq!(dispatcher.records.len(), 1);
    assert_eq!(dispatcher.records[0].payload_ref, "thorns_guard");
    assert_eq!(dispatcher.records[0].target, attacker);

    // Against a plain damaging hit the flags gate nothing: both fire.
    world.actor_mut(defender).unwrap().defense.block_chance = 0.0;
    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut dispatcher);

    assert_eq!(world.telemetry.count(TelemetryKind::DamageShieldTriggered), 2);
    assert_eq!(dispatcher.records.len(), 3);
}

#[test]
fn shield_charges_and_cooldown_limit_retaliation() {
    let (mut world, attacker, defender) = duel();
    world.actor_mut(defender).unwrap().damage_shields.push(DamageShieldState {
        shield_id: "spikes".into(),
        payload_kind: ProcPayloadKind::ExtraDamage,
        payload_ref: "spikes".into(),
        arg_int0: 3,
        remaining_activations: 2,
        max_activations: 2,
        internal_cooldown_seconds: 0.3,
        ..Default::default()
    });
    let mut dispatcher = RecordingDispatcher::new();

    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut dispatcher);
    assert_eq!(dispatcher.records.len(), 1);

    // A second hit inside the cooldown does not retaliate.
    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut dispatcher);
    assert_eq!(dispatcher.records.len(), 1);

    // Once the cooldown elapses the last charge fires and the shield
    // is pruned.
    for _ in 0..5 {
        run_melee_tick(&mut world, &mut dispatcher);
    }
    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut dispatcher);

    assert_eq!(dispatcher.records.len(), 2);
    assert!(world.actor(defender).unwrap().damage_shields.is_empty());
}

fn proc_weapon(entries: Vec<ProcEntry>) -> Arc<WeaponDef> {
    let mut def = (*duel_weapon()).clone();
    def.proc_entries = entries;
    Arc::new(def)
}

#[test]
fn proc_dispatches_and_honors_its_cooldown() {
    let (mut world, attacker, defender) = duel();
    {
        let a = world.actor_mut(attacker).unwrap();
        a.weapon_slots.clear();
        a.add_weapon_slot(
            "main_hand",
            proc_weapon(vec![ProcEntry {
                proc_id: "sear".into(),
                chance_percent: 100.0,
                internal_cooldown_seconds: 10.0,
                payload_kind: ProcPayloadKind::ExtraDamage,
                payload_ref: "sear".into(),
                payload: ProcPayloadArgs {
                    int0: 4,
                    ..Default::default()
                },
                ..Default::default()
            }]),
        );
    }
    let mut dispatcher = RecordingDispatcher::new();

    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut dispatcher);

    assert_eq!(world.telemetry.count(TelemetryKind::ProcTriggered), 1);
    assert_eq!(dispatcher.records.len(), 1);
    assert_eq!(dispatcher.records[0].target, defender);
    assert_eq!(dispatcher.records[0].amount, 4);
    assert_eq!(world.actor(attacker).unwrap().proc_runtime.len(), 1);

    // The second swing hits but the proc is inside its cooldown.
    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut dispatcher);

    assert_eq!(world.telemetry.count(TelemetryKind::ProcTriggered), 0);
    assert_eq!(dispatcher.records.len(), 1);
}

#[test]
fn zero_damage_gates_procs_unless_flagged() {
    let (mut world, attacker, defender) = duel();
    {
        let a = world.actor_mut(attacker).unwrap();
        a.weapon_slots.clear();
        a.add_weapon_slot(
            "main_hand",
            proc_weapon(vec![
                ProcEntry {
                    proc_id: "needs_damage".into(),
                    chance_percent: 100.0,
                    payload_kind: ProcPayloadKind::ExtraDamage,
                    payload_ref: "needs_damage".into(),
                    payload: ProcPayloadArgs {
                        int0: 1,
                        ..Default::default()
                    },
                    ..Default::default()
                },
                ProcEntry {
                    proc_id: "fires_anyway".into(),
                    chance_percent: 100.0,
                    trigger_on_zero_damage: true,
                    payload_kind: ProcPayloadKind::ExtraDamage,
                    payload_ref: "fires_anyway".into(),
                    payload: ProcPayloadArgs {
                        int0: 1,
                        ..Default::default()
                    },
                    ..Default::default()
                },
            ]),
        );
    }
    {
        let defense = &mut world.actor_mut(defender).unwrap().defense;
        defense.block_chance = 100.0;
        defense.block_percent = 1.0;
    }
    let mut dispatcher = RecordingDispatcher::new();

    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut dispatcher);

    assert_eq!(world.telemetry.count(TelemetryKind::ProcTriggered), 1);
    assert_eq!(dispatcher.records.len(), 1);
    assert_eq!(dispatcher.records[0].payload_ref, "fires_anyway");
}

#[test]
fn refused_payload_leaves_proc_state_unstamped() {
    let (mut world, attacker, defender) = duel();
    {
        let a = world.actor_mut(attacker).unwrap();
        a.weapon_slots.clear();
        a.add_weapon_slot(
            "main_hand",
            proc_weapon(vec![ProcEntry {
                proc_id: "sear".into(),
                chance_percent: 100.0,
                internal_cooldown_seconds: 10.0,
                payload_kind: ProcPayloadKind::ExtraDamage,
                payload_ref: "sear".into(),
                payload: ProcPayloadArgs {
                    int0: 4,
                    ..Default::default()
                },
                ..Default::default()
            }]),
        );
    }

    let mut rejecting = RecordingDispatcher::rejecting();
    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut rejecting);

    // No cooldown was armed, so the very next hit may still trigger.
    assert_eq!(world.telemetry.count(TelemetryKind::ProcTriggered), 0);

    let mut accepting = RecordingDispatcher::new();
    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut accepting);

    assert_eq!(world.telemetry.count(TelemetryKind::ProcTriggered), 1);
    assert_eq!(accepting.records.len(), 1);
}

#[test]
fn double_attack_queues_a_chain_followup_next_tick() {
    let (mut world, attacker, defender) = duel();
    {
        let a = world.actor_mut(attacker).unwrap();
        a.weapon_slots.clear();
        let mut def = (*duel_weapon()).clone();
        def.stamina_cost = 5;
        def.multi_attack = MultiAttackConfig {
            double_chance_percent: 100.0,
            max_chain_depth: 1,
            ..Default::default()
        };
        a.add_weapon_slot("main_hand", Arc::new(def));
        a.stamina = 100;
    }
    let mut dispatcher = RecordingDispatcher::new();

    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut dispatcher);

    // The follow-up sits in the pending list until the next tick.
    {
        let pending = &world.actor(attacker).unwrap().pending_attacks;
        assert_eq!(pending.len(), 1);
        assert!(pending[0].flags.contains(RequestFlags::MULTI_ATTACK_CHAIN));
        assert_eq!(pending[0].chain_depth, 1);
    }

    run_melee_tick(&mut world, &mut dispatcher);

    assert_eq!(world.swings.iter().count(), 2);
    let chain_swing = world.swings.iter().find(|s| s.chain_depth == 1).unwrap();
    assert!(chain_swing.multi_attack_resolved);

    // Chain follow-ups skip the stamina cost; only the root swing spent.
    assert_eq!(world.actor(attacker).unwrap().stamina_outbox.len(), 1);
}

#[test]
fn cleave_strikes_every_target_in_the_arc() {
    let mut world = MeleeWorld::new(0.05);
    let attacker = world.spawn_actor(Vec3::ZERO);
    let left = world.spawn_actor(Vec3::new(-0.5, 0.0, 1.5));
    let mid = world.spawn_actor(Vec3::new(0.0, 0.0, 1.5));
    let right = world.spawn_actor(Vec3::new(0.5, 0.0, 1.5));
    {
        let a = world.actor_mut(attacker).unwrap();
        a.add_weapon_slot("main_hand", duel_weapon());
        a.stats = StatSnapshot {
            frontal_arc_chance: 100.0,
            frontal_arc_degrees: 180.0,
            frontal_arc_max_targets: 3,
            frontal_arc_penetration: 3,
            ..Default::default()
        };
    }
    let mut dispatcher = RecordingDispatcher::new();

    world
        .queue_attack(attacker, AttackOptions::new("main_hand", Vec3::Z))
        .unwrap();
    run_melee_tick(&mut world, &mut dispatcher);

    assert_eq!(world.telemetry.count(TelemetryKind::CleaveTriggered), 1);
    assert_eq!(world.telemetry.count(TelemetryKind::Hit), 3);
    for id in [left, mid, right] {
        assert_eq!(world.actor(id).unwrap().damage_inbox.len(), 1);
    }
}

#[test]
fn windup_swing_resolves_chains_before_it_can_strike() {
    let (mut world, attacker, defender) = duel();
    {
        let a = world.actor_mut(attacker).unwrap();
        a.weapon_slots.clear();
        let mut def = (*duel_weapon()).clone();
        def.windup_seconds = 0.2;
        def.multi_attack = MultiAttackConfig {
            double_chance_percent: 100.0,
            max_chain_depth: 1,
            ..Default::default()
        };
        a.add_weapon_slot("main_hand", Arc::new(def));
        a.stats.frontal_arc_chance = 100.0;
    }
    let mut dispatcher = RecordingDispatcher::new();

    strike(&mut world, attacker, defender);
    run_melee_tick(&mut world, &mut dispatcher);

    // Follow-ups are rolled while the swing still winds up; the cleave
    // decision and hit checks wait for the active phase.
    let swing = world.swings.iter().next().unwrap();
    assert_eq!(swing.phase, SwingPhase::Windup);
    assert!(swing.multi_attack_resolved);
    assert!(!swing.cleave_resolved);
    assert_eq!(world.telemetry.count(TelemetryKind::Hit), 0);
    assert_eq!(world.actor(attacker).unwrap().pending_attacks.len(), 1);

    for _ in 0..4 {
        run_melee_tick(&mut world, &mut dispatcher);
    }

    let root = world.swings.iter().find(|s| s.chain_depth == 0).unwrap();
    assert_eq!(root.phase, SwingPhase::Active);
    assert!(root.cleave_resolved);
    assert!(!world.actor(defender).unwrap().damage_inbox.is_empty());
}

#[test]
fn completed_swing_emits_one_event_and_the_log_resets_each_tick() {
    let (mut world, attacker, defender) = duel();
    let mut dispatcher = RecordingDispatcher::new();

    strike(&mut world, attacker, defender);

    // 0.3s of phases at 0.05s ticks, with margin past float edges.
    let mut completed = 0;
    let mut hits = 0;
    for _ in 0..12 {
        run_melee_tick(&mut world, &mut dispatcher);
        completed += world.telemetry.count(TelemetryKind::SwingCompleted);
        hits += world.telemetry.count(TelemetryKind::Hit);
    }

    assert_eq!(completed, 1);
    assert_eq!(hits, 1);
    assert!(world.swings.is_empty());
    // The log holds only the final tick's events, none of the above.
    assert_eq!(world.telemetry.count(TelemetryKind::Hit), 0);
    assert_eq!(world.telemetry.count(TelemetryKind::SwingCompleted), 0);
}
