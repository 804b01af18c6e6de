//! Hit detection - target gathering, mitigation, and proc evaluation
//!
//! The heart of the pipeline. Swings in their Active phase gather
//! candidates against a position snapshot taken in spawn order, then walk
//! them while penetration budget remains. Per struck defender the
//! mitigation chain runs in fixed order: dodge, parry, block, wards,
//! damage shields. The RNG draw order is part of the replay contract, so
//! the chain never short-circuits a roll it would otherwise make.

use glam::Vec3;
use ordered_float::OrderedFloat;

use crate::actor::Actor;
use crate::combat::arcs;
use crate::combat::damage::DamageRequest;
use crate::combat::defense::{apply_block, DefenseTuning, DefenseWindowState, RipostePolicy};
use crate::combat::procs::{ProcChargeMode, ProcEntry, ProcPayloadArgs, ProcRuntimeState};
use crate::combat::request::RiposteRequest;
use crate::combat::swing::{Swing, SwingPhase};
use crate::combat::telemetry::{TelemetryKind, TelemetryLog};
use crate::combat::wards::absorb_with_wards;
use crate::core::config::EngineConfig;
use crate::core::types::{ActorId, SimTime};
use crate::dispatch::{resolve_target, route_payload, ProcDispatcher};
use crate::rng::SwingRng;
use crate::world::MeleeWorld;

/// Minimum squared distance for direction-dependent gathering; a target
/// sharing the attacker's position has no meaningful bearing
const MIN_BEARING_DIST_SQ: f32 = 0.001;

/// Run hit detection for every swing in its Active phase
pub fn detect_hits(world: &mut MeleeWorld, dispatcher: &mut dyn ProcDispatcher) {
    let now = world.now;
    let delta_time = world.delta_time;
    let frame_token = world.frame_token();

    let MeleeWorld {
        actors,
        roster,
        swings,
        telemetry,
        config,
        ..
    } = world;

    for swing in swings.iter_mut() {
        if swing.phase != SwingPhase::Active || swing.penetration_remaining <= 0 {
            continue;
        }

        let Some(attacker) = actors.get(&swing.attacker) else {
            continue;
        };
        let attacker_pos = attacker.position;

        let snapshot: Vec<(ActorId, Vec3)> = roster
            .iter()
            .filter(|id| **id != swing.attacker)
            .filter_map(|id| actors.get(id).map(|a| (*id, a.position)))
            .collect();

        let candidates = gather_candidates(swing, attacker_pos, &snapshot, config);
        if candidates.is_empty() {
            continue;
        }

        let mut rng = SwingRng::from_raw(swing.rng_state);

        for target in candidates {
            if swing.penetration_remaining <= 0 {
                break;
            }
            if target == swing.attacker || !actors.contains_key(&target) {
                continue;
            }
            if swing.already_victim(target, frame_token) {
                continue;
            }

            let (defense, window) = match actors.get(&target) {
                Some(defender) => (defender.defense.clone(), defender.defense_window),
                None => continue,
            };

            if rng.roll_percent(defense.dodge_chance.max(0.0)) {
                telemetry.write(
                    TelemetryKind::Dodged,
                    swing.attacker,
                    Some(target),
                    &swing.weapon_slot,
                    swing.sequence_id,
                    0.0,
                    0.0,
                );
                swing.mark_victim(target, frame_token);
                continue;
            }

            if parries(&mut rng, &defense, &window, now) {
                if let Some(defender) = actors.get_mut(&target) {
                    schedule_riposte(defender, swing.attacker, &defense, now, delta_time, telemetry);
                }
                telemetry.write(
                    TelemetryKind::Parried,
                    swing.attacker,
                    Some(target),
                    &swing.weapon_slot,
                    swing.sequence_id,
                    0.0,
                    0.0,
                );
                if let Some(defender) = actors.get_mut(&target) {
                    trigger_damage_shields(
                        defender,
                        swing.attacker,
                        &swing.weapon_slot,
                        swing.sequence_id,
                        now,
                        0,
                        false,
                        true,
                        dispatcher,
                        telemetry,
                    );
                }
                swing.mark_victim(target, frame_token);
                continue;
            }

            let blocked = rng.roll_percent(defense.block_chance.max(0.0));
            let mut final_damage = swing.definition.base_damage.amount;

            if blocked {
                final_damage = apply_block(final_damage, defense.block_percent, defense.block_flat);
                telemetry.write(
                    TelemetryKind::Blocked,
                    swing.attacker,
                    Some(target),
                    &swing.weapon_slot,
                    swing.sequence_id,
                    final_damage as f32,
                    0.0,
                );
            }
            final_damage = final_damage.max(0);

            if let Some(defender) = actors.get_mut(&target) {
                for absorb in absorb_with_wards(&mut defender.wards, now, &mut final_damage) {
                    telemetry.write(
                        TelemetryKind::WardConsumed,
                        target,
                        Some(swing.attacker),
                        &swing.weapon_slot,
                        swing.sequence_id,
                        absorb.absorbed as f32,
                        absorb.remaining_activations as f32,
                    );
                }
            }
            final_damage = final_damage.max(0);

            if final_damage > 0 {
                if let Some(defender) = actors.get_mut(&target) {
                    let mut packet = swing.definition.base_damage.clone();
                    packet.source = Some(swing.attacker);
                    packet.amount = final_damage;
                    defender.damage_inbox.push(DamageRequest { target, packet });
                }
            }

            if let Some(defender) = actors.get_mut(&target) {
                trigger_damage_shields(
                    defender,
                    swing.attacker,
                    &swing.weapon_slot,
                    swing.sequence_id,
                    now,
                    final_damage,
                    blocked,
                    false,
                    dispatcher,
                    telemetry,
                );
            }

            if let Some(attacker) = actors.get_mut(&swing.attacker) {
                evaluate_procs(swing, attacker, target, &mut rng, now, final_damage, dispatcher, telemetry);
            }

            telemetry.write(
                TelemetryKind::Hit,
                swing.attacker,
                Some(target),
                &swing.weapon_slot,
                swing.sequence_id,
                final_damage as f32,
                0.0,
            );
            tracing::trace!(
                attacker = swing.attacker.0,
                target = target.0,
                damage = final_damage,
                blocked,
                "hit landed"
            );

            swing.penetration_remaining -= 1;
            swing.mark_victim(target, frame_token);
        }

        swing.rng_state = rng.serialize_state();
    }
}

/// Pick candidate targets in snapshot order per the swing's shape
fn gather_candidates(
    swing: &Swing,
    attacker_pos: Vec3,
    snapshot: &[(ActorId, Vec3)],
    config: &EngineConfig,
) -> Vec<ActorId> {
    use crate::combat::weapons::ChainShape;

    match swing.chain_shape {
        ChainShape::TrueArea => gather_area(swing, attacker_pos, snapshot, config),
        ChainShape::RearArc => gather_rear_arc(swing, attacker_pos, snapshot),
        _ if swing.cleave_mode => gather_arc(swing, attacker_pos, snapshot, config),
        _ => gather_single(swing, attacker_pos, snapshot),
    }
}

/// Direction-independent radius around the attacker
fn gather_area(swing: &Swing, attacker_pos: Vec3, snapshot: &[(ActorId, Vec3)], config: &EngineConfig) -> Vec<ActorId> {
    let radius = if swing.chain_radius > 0.0 {
        swing.chain_radius
    } else {
        config.default_area_radius
    };
    let radius_sq = radius * radius;
    let cap = unbounded_cap(swing.chain_max_targets);

    let mut results = Vec::new();
    for (target, pos) in snapshot {
        if results.len() >= cap {
            break;
        }
        if (*pos - attacker_pos).length_squared() > radius_sq {
            continue;
        }
        results.push(*target);
    }
    results
}

/// Arc behind the attacker: target must sit in the rear hemisphere AND
/// inside the mirrored arc
fn gather_rear_arc(swing: &Swing, attacker_pos: Vec3, snapshot: &[(ActorId, Vec3)]) -> Vec<ActorId> {
    let def = &swing.definition;
    let max_range_sq = def.range * def.range;
    let arc_degrees = if swing.chain_arc_degrees > 0.0 {
        swing.chain_arc_degrees
    } else {
        def.baseline_arc_degrees
    };
    let arc_cos = (arc_degrees * 0.5).clamp(0.0, 180.0).to_radians().cos();
    let cap = unbounded_cap(swing.chain_max_targets);
    let forward = arcs::normalize_aim(swing.aim_direction);

    let mut results = Vec::new();
    for (target, pos) in snapshot {
        if results.len() >= cap {
            break;
        }
        let to_target = *pos - attacker_pos;
        let dist_sq = to_target.length_squared();
        if dist_sq > max_range_sq || dist_sq <= MIN_BEARING_DIST_SQ {
            continue;
        }

        let direction = to_target / dist_sq.sqrt();
        if forward.dot(direction) >= 0.0 {
            continue;
        }
        if (-forward).dot(direction) < arc_cos {
            continue;
        }
        results.push(*target);
    }
    results
}

/// Frontal cleave arc around the aim direction
fn gather_arc(swing: &Swing, attacker_pos: Vec3, snapshot: &[(ActorId, Vec3)], config: &EngineConfig) -> Vec<ActorId> {
    let max_range_sq = swing.definition.range * swing.definition.range;
    let cap = swing.cleave_max_targets.max(0) as usize;

    let mut results = Vec::new();
    for (target, pos) in snapshot {
        if results.len() >= cap {
            break;
        }
        let to_target = *pos - attacker_pos;
        let dist_sq = to_target.length_squared();
        if dist_sq > max_range_sq || dist_sq <= MIN_BEARING_DIST_SQ {
            continue;
        }
        if arcs::is_within_arc(swing.aim_direction, to_target, swing.cleave_arc_degrees, config.arc_epsilon) {
            results.push(*target);
        }
    }
    results
}

/// Single-target: the preferred target when it is in range, else the
/// nearest in range
fn gather_single(swing: &Swing, attacker_pos: Vec3, snapshot: &[(ActorId, Vec3)]) -> Vec<ActorId> {
    let max_range_sq = swing.definition.range * swing.definition.range;

    if let Some(preferred) = swing.preferred_target {
        let valid = snapshot
            .iter()
            .any(|(id, pos)| *id == preferred && (*pos - attacker_pos).length_squared() <= max_range_sq);
        if valid {
            return vec![preferred];
        }
    }

    snapshot
        .iter()
        .filter(|(_, pos)| (*pos - attacker_pos).length_squared() <= max_range_sq)
        .min_by_key(|(_, pos)| OrderedFloat((*pos - attacker_pos).length_squared()))
        .map(|(id, _)| vec![*id])
        .unwrap_or_default()
}

fn unbounded_cap(max_targets: i32) -> usize {
    if max_targets > 0 {
        max_targets as usize
    } else {
        usize::MAX
    }
}

/// An armed window guarantees the parry; otherwise roll. The window path
/// consumes no draw, matching the guarantee's replay semantics.
fn parries(rng: &mut SwingRng, defense: &DefenseTuning, window: &DefenseWindowState, now: SimTime) -> bool {
    if window.grants_parry(now) {
        return true;
    }
    rng.roll_percent(defense.parry_chance.max(0.0))
}

fn schedule_riposte(
    defender: &mut Actor,
    attacker: ActorId,
    defense: &DefenseTuning,
    now: SimTime,
    delta_time: f32,
    telemetry: &mut TelemetryLog,
) {
    if defense.riposte_policy == RipostePolicy::None {
        return;
    }

    let execute_at = match defense.riposte_policy {
        RipostePolicy::Immediate => now,
        _ => now + delta_time as SimTime,
    };

    defender.pending_ripostes.push(RiposteRequest {
        source_attacker: attacker,
        weapon_slot: defense.riposte_weapon_slot.clone(),
        aim_direction: Vec3::ZERO,
        execute_at_time: execute_at,
        source_request_id: 0,
    });

    telemetry.write(
        TelemetryKind::RiposteQueued,
        defender.id,
        Some(attacker),
        &defense.riposte_weapon_slot,
        0,
        0.0,
        0.0,
    );
}

/// Walk the defender's damage shields, dispatching payloads whose trigger
/// conditions match this hit's outcome
#[allow(clippy::too_many_arguments)]
fn trigger_damage_shields(
    defender: &mut Actor,
    attacker: ActorId,
    weapon_slot: &str,
    sequence_id: u32,
    now: SimTime,
    damage: i32,
    blocked: bool,
    parried: bool,
    dispatcher: &mut dyn ProcDispatcher,
    telemetry: &mut TelemetryLog,
) {
    let defender_id = defender.id;
    let shields = &mut defender.damage_shields;
    let mut i = 0;

    while i < shields.len() {
        let shield = &mut shields[i];

        if shield.expire_time > 0.0 && now >= shield.expire_time {
            shields.swap_remove(i);
            continue;
        }

        let finite_charges = shield.max_activations > 0;
        if finite_charges && shield.remaining_activations == 0 {
            shields.swap_remove(i);
            continue;
        }

        if now < shield.next_ready_time {
            i += 1;
            continue;
        }

        if parried && !shield.trigger_on_parry {
            i += 1;
            continue;
        }
        if !parried && blocked && !shield.trigger_on_block {
            i += 1;
            continue;
        }

        let parry_trigger = parried && shield.trigger_on_parry;
        let block_trigger = !parried && blocked && shield.trigger_on_block;
        let zero_allowed = shield.trigger_on_zero_damage || parry_trigger || block_trigger;
        if damage <= 0 && !zero_allowed {
            i += 1;
            continue;
        }

        let effect_target = resolve_target(shield.target_mode, defender_id, Some(attacker));
        let args = ProcPayloadArgs {
            int0: shield.arg_int0,
            int1: shield.arg_int1,
            float0: shield.arg_float0,
            float1: shield.arg_float1,
            duration_seconds: 0.0,
            interval_seconds: shield.interval_seconds,
            secondary_id: String::new(),
            tertiary_id: String::new(),
        };

        let dispatched = route_payload(
            dispatcher,
            shield.payload_kind,
            &shield.payload_ref,
            shield.target_mode,
            &args,
            defender_id,
            effect_target,
            damage,
        );
        if !dispatched {
            i += 1;
            continue;
        }

        if finite_charges && shield.remaining_activations > 0 {
            shield.remaining_activations -= 1;
        }
        shield.next_ready_time = now + shield.internal_cooldown_seconds as SimTime;

        let remaining = shield.remaining_activations;
        let icd = shield.internal_cooldown_seconds;
        if finite_charges && remaining == 0 {
            shields.swap_remove(i);
        } else {
            i += 1;
        }

        telemetry.write(
            TelemetryKind::DamageShieldTriggered,
            defender_id,
            Some(effect_target),
            weapon_slot,
            sequence_id,
            remaining as f32,
            icd,
        );
    }
}

/// Evaluate the swing's merged proc entries against one struck target
#[allow(clippy::too_many_arguments)]
fn evaluate_procs(
    swing: &mut Swing,
    attacker: &mut Actor,
    target: ActorId,
    rng: &mut SwingRng,
    now: SimTime,
    final_damage: i32,
    dispatcher: &mut dyn ProcDispatcher,
    telemetry: &mut TelemetryLog,
) {
    if swing.merged_procs.is_empty() {
        return;
    }

    let attacker_id = attacker.id;
    let runtime = &mut attacker.proc_runtime;

    for merged in swing.merged_procs.iter_mut() {
        let entry = &merged.entry;
        let source_key = if !merged.source_key.is_empty() {
            &merged.source_key
        } else {
            &entry.source_key_hint
        };

        if !entry.trigger_on_zero_damage && final_damage <= 0 {
            continue;
        }

        if !rng.roll_percent(entry.chance_percent) {
            continue;
        }

        let Some(state_index) = proc_ready_index(runtime, entry, source_key, now) else {
            continue;
        };

        let resolved_target = resolve_target(entry.target_mode, attacker_id, Some(target));
        let dispatched = route_payload(
            dispatcher,
            entry.payload_kind,
            &entry.payload_ref,
            entry.target_mode,
            &entry.payload,
            attacker_id,
            resolved_target,
            final_damage,
        );
        if !dispatched {
            continue;
        }

        let consume_charge =
            entry.charge_mode == ProcChargeMode::PerTargetApplied || !merged.charge_consumed;
        stamp_proc(runtime, state_index, entry, now, consume_charge);

        telemetry.write(
            TelemetryKind::ProcTriggered,
            attacker_id,
            Some(resolved_target),
            &swing.weapon_slot,
            swing.sequence_id,
            entry.chance_percent,
            entry.internal_cooldown_seconds,
        );

        if entry.charge_mode == ProcChargeMode::PerTriggerSuccess && !merged.charge_consumed {
            merged.charge_consumed = true;
        }
    }
}

/// Readiness check against the attacker's runtime table.
///
/// Returns the index of the (existing or freshly inserted) state when the
/// proc may fire. Expired entries are dropped on the way; an elapsed
/// trigger window resets the count instead of blocking.
fn proc_ready_index(
    runtime: &mut Vec<ProcRuntimeState>,
    entry: &ProcEntry,
    source_key: &str,
    now: SimTime,
) -> Option<usize> {
    let mut i = 0;
    while i < runtime.len() {
        if runtime[i].proc_id != entry.proc_id || runtime[i].source_key != source_key {
            i += 1;
            continue;
        }

        let state = &mut runtime[i];
        if state.expire_time > 0.0 && now >= state.expire_time {
            runtime.swap_remove(i);
            continue;
        }

        if entry.window_seconds > 0.0 && state.window_expiry > 0.0 && now >= state.window_expiry {
            state.trigger_count = 0;
            state.window_expiry = 0.0;
        }

        if entry.max_activations > 0 && state.remaining_activations == 0 {
            return None;
        }

        if now < state.next_ready_time {
            return None;
        }

        if entry.max_triggers > 0 && state.trigger_count >= entry.max_triggers {
            if entry.window_seconds <= 0.0 {
                return None;
            }
            if state.window_expiry == 0.0 || now >= state.window_expiry {
                state.trigger_count = 0;
                state.window_expiry = 0.0;
            } else {
                return None;
            }
        }

        return Some(i);
    }

    runtime.push(ProcRuntimeState {
        proc_id: entry.proc_id.clone(),
        source_key: source_key.to_string(),
        next_ready_time: now,
        window_expiry: 0.0,
        expire_time: if entry.duration_seconds > 0.0 {
            now + entry.duration_seconds as SimTime
        } else {
            0.0
        },
        trigger_count: 0,
        remaining_activations: entry.max_activations,
    });
    Some(runtime.len() - 1)
}

/// Record a successful trigger: bump counters, arm cooldown and window,
/// spend a charge when the charge mode says so
fn stamp_proc(runtime: &mut [ProcRuntimeState], index: usize, entry: &ProcEntry, now: SimTime, consume_charge: bool) {
    let Some(state) = runtime.get_mut(index) else {
        return;
    };

    state.trigger_count += 1;
    state.next_ready_time = now + entry.internal_cooldown_seconds as SimTime;

    if entry.window_seconds > 0.0 && state.window_expiry == 0.0 {
        state.window_expiry = now + entry.window_seconds as SimTime;
    }

    if entry.max_activations > 0 && consume_charge && state.remaining_activations > 0 {
        state.remaining_activations -= 1;
    }
}
