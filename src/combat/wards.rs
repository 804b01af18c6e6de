//! Wards and damage shields
//!
//! Both are defender-owned buffers populated by the (out-of-scope) buff
//! engine. A ward absorbs incoming damage; a damage shield retaliates with
//! a payload when its trigger conditions match the hit outcome. Charge
//! counts only ever decrease; exhausted or expired entries are pruned in
//! place as the buffers are walked.

use serde::{Deserialize, Serialize};

use crate::combat::procs::{ProcPayloadKind, ProcTargetMode};
use crate::core::types::SimTime;

/// Stacked damage-absorption effect on a defender
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WardState {
    pub ward_id: String,
    pub buff_id: String,
    pub remaining_activations: u8,
    /// 0 = unlimited charges
    pub max_activations: u8,
    /// 0 = never expires
    pub expire_time: SimTime,
    pub absorb_flat: f32,
    /// Fractional reduction, clamped to 0.99 at apply time
    pub absorb_percent: f32,
    /// Finite absorption pool drained before flat/percent
    pub remaining_pool: i32,
    /// Consume a charge even when the hit carried no damage
    pub trigger_on_zero_damage: bool,
}

/// Chargeable retaliation effect on a defender
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageShieldState {
    pub shield_id: String,
    pub buff_id: String,
    pub remaining_activations: u8,
    /// 0 = unlimited charges
    pub max_activations: u8,
    /// 0 = never expires
    pub expire_time: SimTime,
    pub next_ready_time: SimTime,
    pub internal_cooldown_seconds: f32,
    pub payload_kind: ProcPayloadKind,
    pub target_mode: ProcTargetMode,
    pub trigger_on_zero_damage: bool,
    pub trigger_on_block: bool,
    pub trigger_on_parry: bool,
    pub payload_ref: String,
    pub arg_int0: i32,
    pub arg_int1: i32,
    pub arg_float0: f32,
    pub arg_float1: f32,
    pub interval_seconds: f32,
}

/// One ward consumption, reported back for telemetry
#[derive(Debug, Clone, Copy)]
pub struct WardAbsorb {
    pub absorbed: i32,
    pub remaining_activations: u8,
}

/// Run the ward buffer against incoming damage.
///
/// Per ward, in buffer order: drain the finite pool, subtract the flat
/// amount, then apply the percent reduction. A ward is consumed (one charge)
/// if it reduced nonzero damage, or if its zero-damage flag is set and
/// nothing was left to absorb. Expired wards and finite-charge wards with
/// neither charges nor pool left are removed. Stops once damage reaches 0.
pub fn absorb_with_wards(wards: &mut Vec<WardState>, now: SimTime, damage: &mut i32) -> Vec<WardAbsorb> {
    let mut consumed = Vec::new();
    let mut i = 0;

    while i < wards.len() {
        let ward = &mut wards[i];

        if ward.expire_time > 0.0 && now >= ward.expire_time {
            wards.swap_remove(i);
            continue;
        }

        let finite_charges = ward.max_activations > 0;
        if finite_charges && ward.remaining_activations == 0 && ward.remaining_pool <= 0 {
            wards.swap_remove(i);
            continue;
        }

        if *damage <= 0 && !ward.trigger_on_zero_damage {
            i += 1;
            continue;
        }

        let original = *damage;
        let mut reduced = false;

        if *damage > 0 && ward.remaining_pool > 0 {
            let pool_absorb = (*damage).min(ward.remaining_pool);
            if pool_absorb > 0 {
                *damage -= pool_absorb;
                ward.remaining_pool -= pool_absorb;
                reduced = true;
            }
        }

        if *damage > 0 && ward.absorb_flat > 0.0 {
            let before = *damage;
            let reduction = ward.absorb_flat.round() as i32;
            if reduction > 0 {
                *damage = (*damage - reduction).max(0);
                reduced |= *damage != before;
            }
        }

        if *damage > 0 && ward.absorb_percent > 0.0 {
            let percent = ward.absorb_percent.clamp(0.0, 0.99);
            let before = *damage;
            *damage = (*damage as f32 * (1.0 - percent)).round() as i32;
            reduced |= *damage != before;
        }

        if !reduced && !(*damage <= 0 && ward.trigger_on_zero_damage) {
            i += 1;
            continue;
        }

        if finite_charges && ward.remaining_activations > 0 {
            ward.remaining_activations -= 1;
        }

        consumed.push(WardAbsorb {
            absorbed: (original - *damage).max(0),
            remaining_activations: ward.remaining_activations,
        });

        if finite_charges && ward.remaining_activations == 0 && ward.remaining_pool <= 0 {
            wards.swap_remove(i);
        } else {
            i += 1;
        }

        if *damage <= 0 {
            break;
        }
    }

    consumed
}
