//! Plan builder - turns queued attack requests into swing instances
//!
//! First stage of every tick. Drains due ripostes into the front of the
//! pending list, then validates each request against slot state, lockout,
//! and stamina. Accepted requests become swings with temporal-scaled phase
//! durations, a freshly seeded RNG, and the merged proc table from weapon,
//! equipment, and augment sources. Rejections are telemetry, never errors.

use std::sync::Arc;

use crate::actor::Actor;
use crate::combat::arcs;
use crate::combat::procs::MergedProcEntry;
use crate::combat::request::{AttackRequest, RequestFlags, RiposteRequest};
use crate::combat::swing::{Swing, SwingPhase};
use crate::combat::telemetry::{RejectReason, TelemetryKind, TelemetryLog};
use crate::combat::weapons::{ChainShape, WeaponDef};
use crate::core::types::{ActorId, SimTime};
use crate::rng::{compose_request_id, fnv1a, SwingRng};
use crate::world::MeleeWorld;

/// Run the plan builder over every actor, in spawn order
pub fn build_plans(world: &mut MeleeWorld) {
    world.telemetry.clear();

    let now = world.now;
    let frame_token = world.frame_token();
    let config = world.config.clone();
    let ids: Vec<ActorId> = world.roster.clone();

    for id in ids {
        let MeleeWorld {
            actors,
            swings,
            telemetry,
            ..
        } = world;
        let Some(actor) = actors.get_mut(&id) else {
            continue;
        };

        drain_due_ripostes(actor, now, frame_token);
        if actor.pending_attacks.is_empty() {
            continue;
        }

        let temporal_mul = actor.temporal.interval_multiplier(&config);
        let requests = std::mem::take(&mut actor.pending_attacks);

        for request in requests {
            let Some(slot) = actor.find_slot(&request.weapon_slot) else {
                reject(telemetry, actor.id, &request, RejectReason::UnknownSlot);
                continue;
            };

            let Some(definition) = slot.definition.clone().filter(|_| slot.enabled) else {
                reject(telemetry, actor.id, &request, RejectReason::SlotUnusable);
                continue;
            };

            let effective_lockout = if request.chain_lockout_seconds > 0.0 {
                request.chain_lockout_seconds
            } else {
                definition.lockout_seconds * temporal_mul
            };

            let ignore_global = request.flags.contains(RequestFlags::MULTI_ATTACK_CHAIN)
                && request.chain_lockout_seconds <= 0.0;

            if !actor.lockout.is_ready(now, effective_lockout, ignore_global) {
                reject(telemetry, actor.id, &request, RejectReason::LockoutActive);
                continue;
            }

            if !can_afford_stamina(actor, &definition, request.flags) {
                reject(telemetry, actor.id, &request, RejectReason::CannotAffordStamina);
                continue;
            }
            queue_stamina_spend(actor, &definition, request.flags);

            let swing_id = swings.allocate_id();
            let rng = SwingRng::from_seed(actor.id, &request.weapon_slot, request.request_id, frame_token);
            let mut swing = Swing {
                id: swing_id,
                attacker: actor.id,
                preferred_target: request.preferred_target,
                weapon_slot: request.weapon_slot.clone(),
                phase: SwingPhase::Windup,
                phase_timer: 0.0,
                windup_time: definition.windup_seconds.max(0.0) * temporal_mul,
                active_time: definition.active_seconds.max(0.0) * temporal_mul,
                recovery_time: definition.recovery_seconds.max(0.0) * temporal_mul,
                penetration_remaining: definition.penetration_count.max(1),
                aim_direction: arcs::normalize_aim(request.aim_direction),
                cleave_mode: false,
                cleave_arc_degrees: definition.default_cleave_arc_degrees,
                cleave_max_targets: definition.default_cleave_max_targets.max(1),
                rng_state: rng.serialize_state(),
                sequence_id: request.request_id,
                riposte_origin: request.flags.contains(RequestFlags::RIPOSTE),
                cleave_resolved: false,
                multi_attack_resolved: false,
                completed: false,
                chain_depth: request.chain_depth,
                chain_shape: request.chain_shape,
                chain_arc_degrees: request.chain_arc_degrees,
                chain_radius: request.chain_radius,
                chain_max_targets: request.chain_max_targets,
                chain_delay_seconds: request.chain_delay_seconds,
                chain_lockout_seconds: request.chain_lockout_seconds,
                victims: Vec::new(),
                merged_procs: Vec::new(),
                definition: definition.clone(),
            };

            apply_chain_shape(&mut swing, &request, &definition);

            merge_weapon_procs(&mut swing.merged_procs, &definition, &request.weapon_slot);
            merge_equipment_procs(&mut swing.merged_procs, actor, &request.weapon_slot);
            merge_augment_procs(&mut swing.merged_procs, actor, &request.weapon_slot, now);

            actor.lockout.last_swing_time = now;
            if effective_lockout > 0.0 {
                actor.lockout.next_ready_time_global = actor
                    .lockout
                    .next_ready_time_global
                    .max(now + effective_lockout as SimTime);
            }

            tracing::debug!(
                attacker = actor.id.0,
                slot = %request.weapon_slot,
                request_id = request.request_id,
                depth = request.chain_depth,
                "swing accepted"
            );
            telemetry.write(
                TelemetryKind::SwingBegan,
                actor.id,
                None,
                &request.weapon_slot,
                request.request_id,
                swing.windup_time,
                swing.active_time,
            );

            swings.insert(swing);
        }
    }
}

/// Move every due riposte to the front of the pending attack list
fn drain_due_ripostes(actor: &mut Actor, now: SimTime, frame_token: u32) {
    if actor.pending_ripostes.is_empty() {
        return;
    }

    let mut i = actor.pending_ripostes.len();
    while i > 0 {
        i -= 1;
        if actor.pending_ripostes[i].execute_at_time > now {
            continue;
        }

        let riposte: RiposteRequest = actor.pending_ripostes.remove(i);
        let request_id = compose_request_id(frame_token, actor.pending_attacks.len() as u32);
        let mut request = AttackRequest::basic(actor.id, riposte.weapon_slot, riposte.aim_direction, request_id);
        request.flags = RequestFlags::RIPOSTE | RequestFlags::SKIP_STAMINA_COST;
        actor.pending_attacks.insert(0, request);
    }
}

/// Explicit chain shapes bypass the cleave roll and pull their parameters
/// from the request, falling back to weapon defaults for zero values
fn apply_chain_shape(swing: &mut Swing, request: &AttackRequest, def: &WeaponDef) {
    match request.chain_shape {
        ChainShape::None => {}
        ChainShape::Arc => {
            swing.cleave_mode = true;
            swing.cleave_arc_degrees = if request.chain_arc_degrees > 0.0 {
                request.chain_arc_degrees
            } else {
                def.default_cleave_arc_degrees
            };
            swing.cleave_max_targets = if request.chain_max_targets > 0 {
                request.chain_max_targets
            } else {
                def.default_cleave_max_targets.max(1)
            };
            swing.cleave_resolved = true;
        }
        ChainShape::TrueArea => {
            swing.cleave_resolved = true;
            if swing.chain_radius <= 0.0 {
                swing.chain_radius = def.range;
            }
            if swing.chain_max_targets <= 0 {
                swing.chain_max_targets = def.default_cleave_max_targets.max(1);
            }
        }
        ChainShape::RearArc => {
            swing.cleave_resolved = true;
            swing.chain_arc_degrees = if request.chain_arc_degrees > 0.0 {
                request.chain_arc_degrees
            } else {
                def.default_cleave_arc_degrees
            };
            swing.chain_max_targets = if request.chain_max_targets > 0 {
                request.chain_max_targets
            } else {
                def.default_cleave_max_targets.max(1)
            };
        }
    }

    if request.chain_shape != ChainShape::None && request.chain_max_targets > 0 {
        swing.penetration_remaining = request.chain_max_targets.max(1);
    }
}

fn can_afford_stamina(actor: &Actor, def: &WeaponDef, flags: RequestFlags) -> bool {
    if flags.contains(RequestFlags::SKIP_STAMINA_COST) || def.stamina_cost <= 0 {
        return true;
    }
    actor.stamina >= def.stamina_cost
}

/// Spends are queued for the resource engine, never applied here
fn queue_stamina_spend(actor: &mut Actor, def: &WeaponDef, flags: RequestFlags) {
    if flags.contains(RequestFlags::SKIP_STAMINA_COST) || def.stamina_cost <= 0 {
        return;
    }
    actor.stamina_outbox.push(crate::actor::StaminaSpend {
        amount: -def.stamina_cost,
    });
}

fn merge_weapon_procs(buffer: &mut Vec<MergedProcEntry>, def: &Arc<WeaponDef>, slot_id: &str) {
    for entry in &def.proc_entries {
        let source_key = resolve_source_key(slot_id, &entry.source_key_hint, "", 0);
        buffer.push(MergedProcEntry {
            entry: entry.clone(),
            source_key,
            charge_consumed: false,
        });
    }
}

fn merge_equipment_procs(buffer: &mut Vec<MergedProcEntry>, actor: &Actor, slot_id: &str) {
    for equip in &actor.equipment_buffs {
        if equip.proc_table.entries.is_empty() {
            continue;
        }
        let source_key = resolve_source_key(slot_id, "", &equip.buff_id, 1);
        for entry in &equip.proc_table.entries {
            buffer.push(MergedProcEntry {
                entry: entry.clone(),
                source_key: source_key.clone(),
                charge_consumed: false,
            });
        }
    }
}

fn merge_augment_procs(buffer: &mut Vec<MergedProcEntry>, actor: &Actor, slot_id: &str, now: SimTime) {
    for augment in &actor.proc_augments {
        if augment.expire_time > 0.0 && now >= augment.expire_time {
            continue;
        }
        if augment.proc_table.entries.is_empty() {
            continue;
        }
        let source_key = resolve_source_key(slot_id, "", &augment.source_buff_id, 2);
        for entry in &augment.proc_table.entries {
            buffer.push(MergedProcEntry {
                entry: entry.clone(),
                source_key: source_key.clone(),
                charge_consumed: false,
            });
        }
    }
}

/// An authored hint wins; otherwise derive a stable key from the slot, the
/// granting source, and the source category (0 weapon / 1 equipment /
/// 2 augment)
fn resolve_source_key(slot_id: &str, hint: &str, external_id: &str, category: u32) -> String {
    if !hint.is_empty() {
        return hint.to_string();
    }

    let mut hash = fnv1a(slot_id.as_bytes());
    hash = hash.wrapping_mul(31).wrapping_add(fnv1a(external_id.as_bytes()));
    hash = hash.wrapping_mul(31).wrapping_add(category);
    format!("{hash:08x}")
}

fn reject(telemetry: &mut TelemetryLog, attacker: ActorId, request: &AttackRequest, reason: RejectReason) {
    tracing::debug!(
        attacker = attacker.0,
        slot = %request.weapon_slot,
        request_id = request.request_id,
        reason = reason as i32,
        "swing rejected"
    );
    telemetry.write(
        TelemetryKind::SwingRejected,
        attacker,
        None,
        &request.weapon_slot,
        request.request_id,
        reason as i32 as f32,
        0.0,
    );
}
