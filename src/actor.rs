//! Per-actor combat state
//!
//! Everything an actor owns is an explicit record on this struct; no stage
//! reads ambient singletons. Attacker-side state (lockout, stamina, proc
//! runtime, pending queues) is mutated only while the actor attacks;
//! defender-side state (wards, shields, defense window, damage inbox) only
//! while it is hit. The split is what lets the stages run back-to-back in
//! one tick without aliasing.

use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::combat::arcs;
use crate::combat::damage::DamageRequest;
use crate::combat::defense::{DefenseTuning, DefenseWindowState};
use crate::combat::procs::{ProcRuntimeState, ProcTable};
use crate::combat::request::{AttackOptions, AttackRequest, RequestFlags, RiposteRequest};
use crate::combat::wards::{DamageShieldState, WardState};
use crate::combat::weapons::{ChainShape, WeaponDef};
use crate::core::config::EngineConfig;
use crate::core::error::{MeleeError, Result};
use crate::core::types::{ActorId, RequestId, SimTime, SlotId};

/// One equippable weapon slot
#[derive(Debug, Clone)]
pub struct WeaponSlot {
    pub slot_id: SlotId,
    pub enabled: bool,
    pub definition: Option<Arc<WeaponDef>>,
    /// Relative ordering for dual-wield swing alternation
    pub swing_order: u8,
}

/// Global swing lockout record
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Lockout {
    pub next_ready_time_global: SimTime,
    pub last_swing_time: SimTime,
}

impl Lockout {
    /// Lockout gate: the global gate unless bypassed, then the per-swing
    /// duration measured from the last swing. A record that never swung
    /// (last_swing_time still zero) passes the duration gate.
    pub fn is_ready(&self, now: SimTime, lockout_duration: f32, ignore_global: bool) -> bool {
        if !ignore_global && now < self.next_ready_time_global {
            return false;
        }

        if lockout_duration > 0.0 && self.last_swing_time > 0.0 {
            return now >= self.last_swing_time + lockout_duration as SimTime;
        }

        true
    }
}

/// Haste/slow modifiers from the temporal engine (fractions, not percents)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalModifiers {
    pub haste_percent: f32,
    pub slow_percent: f32,
}

impl TemporalModifiers {
    /// Multiplier applied to phase durations and lockouts: haste shortens,
    /// slow lengthens, clamped to the config bounds
    pub fn interval_multiplier(&self, config: &EngineConfig) -> f32 {
        let mut mul = 1.0;
        if self.haste_percent > 0.0 {
            mul *= 1.0 - self.haste_percent;
        }
        if self.slow_percent > 0.0 {
            mul *= 1.0 + self.slow_percent;
        }
        mul.clamp(config.min_temporal_multiplier, config.max_temporal_multiplier)
    }
}

/// Attacker-side stat snapshot, populated by the (external) stat engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatSnapshot {
    pub frontal_arc_chance: f32,
    pub frontal_arc_degrees: f32,
    pub frontal_arc_max_targets: i32,
    /// Positive values override swing penetration on a successful cleave
    pub frontal_arc_penetration: i32,
    pub multi_double_chance: f32,
    pub multi_triple_chance: f32,
    pub multi_flurry_chance: f32,
    pub multi_flurry_per_attack: f32,
    pub multi_flurry_max_extra: i32,
    pub multi_area_chance: f32,
    pub multi_area_shape: ChainShape,
    pub multi_area_arc_degrees: f32,
    pub multi_area_max_targets: i32,
    pub multi_area_radius: f32,
    pub multi_max_chain_depth: u8,
    pub multi_chain_lockout_seconds: f32,
    pub multi_chain_delay_seconds: f32,
}

/// An equipped item's buff carrying a proc table
#[derive(Debug, Clone)]
pub struct EquipmentBuff {
    pub buff_id: String,
    pub proc_table: Arc<ProcTable>,
    pub source_item_id: String,
    pub is_proc_carrier: bool,
    pub stack_count: u8,
}

/// A temporary proc-granting augment (from a buff/aura)
#[derive(Debug, Clone)]
pub struct ProcAugment {
    pub source_buff_id: String,
    pub proc_table: Arc<ProcTable>,
    /// 0 = never expires
    pub expire_time: SimTime,
    pub stack_index: u8,
}

/// Deferred stamina spend handed to the external resource engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaminaSpend {
    pub amount: i32,
}

/// A combat-capable entity
#[derive(Debug, Clone, Default)]
pub struct Actor {
    pub id: ActorId,
    pub position: Vec3,
    pub weapon_slots: Vec<WeaponSlot>,
    pub lockout: Lockout,
    pub stats: StatSnapshot,
    pub defense: DefenseTuning,
    pub defense_window: DefenseWindowState,
    pub temporal: TemporalModifiers,
    /// Current pool, mirrored from the resource engine
    pub stamina: i32,
    /// Spends queued on acceptance, drained by the resource engine
    pub stamina_outbox: Vec<StaminaSpend>,
    pub pending_attacks: Vec<AttackRequest>,
    pub pending_ripostes: Vec<RiposteRequest>,
    /// Next player/AI request id; 0 is never handed out
    pub request_sequence: RequestId,
    pub proc_runtime: Vec<ProcRuntimeState>,
    pub equipment_buffs: Vec<EquipmentBuff>,
    pub proc_augments: Vec<ProcAugment>,
    pub wards: Vec<WardState>,
    pub damage_shields: Vec<DamageShieldState>,
    /// Output: damage requests awaiting the damage-resolution engine
    pub damage_inbox: Vec<DamageRequest>,
}

impl Actor {
    pub fn new(id: ActorId, position: Vec3) -> Self {
        Self {
            id,
            position,
            request_sequence: 1,
            ..Default::default()
        }
    }

    /// Attach a weapon definition under a slot id
    pub fn add_weapon_slot(&mut self, slot_id: impl Into<SlotId>, definition: Arc<WeaponDef>) -> &mut Self {
        let swing_order = self.weapon_slots.len() as u8;
        self.weapon_slots.push(WeaponSlot {
            slot_id: slot_id.into(),
            enabled: true,
            definition: Some(definition),
            swing_order,
        });
        self
    }

    pub fn find_slot(&self, slot_id: &str) -> Option<&WeaponSlot> {
        self.weapon_slots.iter().find(|s| s.slot_id == slot_id)
    }

    /// The request factory: validate options, allocate an id, append to the
    /// pending list. The only fallible entry point into the engine.
    pub fn queue_attack(&mut self, options: AttackOptions) -> Result<RequestId> {
        if options.weapon_slot.is_empty() {
            return Err(MeleeError::EmptySlotId);
        }

        let request_id = if options.explicit_request_id != 0 {
            options.explicit_request_id
        } else {
            self.allocate_request_id()
        };

        let mut flags = RequestFlags::empty();
        if options.allow_riposte {
            flags |= RequestFlags::ALLOW_RIPOSTE;
        }
        if options.skip_stamina_cost {
            flags |= RequestFlags::SKIP_STAMINA_COST;
        }
        if options.mark_as_riposte {
            flags |= RequestFlags::RIPOSTE;
        }

        let mut request = AttackRequest {
            attacker: self.id,
            weapon_slot: options.weapon_slot,
            aim_direction: arcs::normalize_aim(options.aim_direction),
            preferred_target: options.preferred_target,
            flags,
            request_id,
            chain_depth: 0,
            chain_shape: ChainShape::None,
            chain_arc_degrees: 0.0,
            chain_radius: 0.0,
            chain_max_targets: 0,
            chain_delay_seconds: 0.0,
            chain_lockout_seconds: 0.0,
        };

        if let Some(chain) = options.chain_override {
            if chain.shape != ChainShape::None {
                request.chain_shape = chain.shape;
                request.chain_arc_degrees = chain.arc_degrees;
                request.chain_radius = chain.radius;
                request.chain_max_targets = chain.max_targets;
                request.chain_delay_seconds = chain.delay_seconds;
                request.chain_lockout_seconds = chain.lockout_seconds;
            }
        }

        self.pending_attacks.push(request);
        Ok(request_id)
    }

    fn allocate_request_id(&mut self) -> RequestId {
        let id = if self.request_sequence == 0 { 1 } else { self.request_sequence };
        self.request_sequence = id + 1;
        id
    }

    /// Grant a proc table from an equipped item
    pub fn add_equipment_buff(&mut self, buff_id: impl Into<String>, proc_table: Arc<ProcTable>, source_item_id: impl Into<String>) {
        self.equipment_buffs.push(EquipmentBuff {
            buff_id: buff_id.into(),
            proc_table,
            source_item_id: source_item_id.into(),
            is_proc_carrier: true,
            stack_count: 1,
        });
    }

    pub fn remove_equipment_buff(&mut self, buff_id: &str) {
        self.equipment_buffs.retain(|b| b.buff_id != buff_id);
    }

    /// Grant a temporary proc table from a buff/aura
    pub fn add_proc_augment(&mut self, source_buff_id: impl Into<String>, proc_table: Arc<ProcTable>, expire_time: SimTime) {
        let stack_index = self.proc_augments.len() as u8;
        self.proc_augments.push(ProcAugment {
            source_buff_id: source_buff_id.into(),
            proc_table,
            expire_time,
            stack_index,
        });
    }

    pub fn remove_proc_augment(&mut self, source_buff_id: &str) {
        self.proc_augments.retain(|a| a.source_buff_id != source_buff_id);
    }

    /// Arm a guaranteed-parry window until `expiry`
    pub fn arm_parry_window(&mut self, expiry: SimTime) {
        self.defense_window = DefenseWindowState {
            parry_window_active: true,
            window_expiry: expiry,
            window_id: self.defense_window.window_id + 1,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::request::ChainOverride;

    #[test]
    fn test_request_ids_are_monotonic_and_skip_zero() {
        let mut actor = Actor::new(ActorId(1), Vec3::ZERO);
        let a = actor.queue_attack(AttackOptions::new("main_hand", Vec3::Z)).unwrap();
        let b = actor.queue_attack(AttackOptions::new("main_hand", Vec3::Z)).unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);

        actor.request_sequence = 0;
        let c = actor.queue_attack(AttackOptions::new("main_hand", Vec3::Z)).unwrap();
        assert_eq!(c, 1);
    }

    #[test]
    fn test_empty_slot_is_rejected() {
        let mut actor = Actor::new(ActorId(1), Vec3::ZERO);
        assert!(actor.queue_attack(AttackOptions::new("", Vec3::Z)).is_err());
    }

    #[test]
    fn test_queue_attack_normalizes_aim() {
        let mut actor = Actor::new(ActorId(1), Vec3::ZERO);
        actor
            .queue_attack(AttackOptions::new("main_hand", Vec3::new(0.0, 0.0, 10.0)))
            .unwrap();
        let aim = actor.pending_attacks[0].aim_direction;
        assert!((aim.length() - 1.0).abs() < 1e-6);

        // Degenerate aim falls back to the canonical forward.
        actor.queue_attack(AttackOptions::new("main_hand", Vec3::ZERO)).unwrap();
        assert_eq!(actor.pending_attacks[1].aim_direction, Vec3::Z);
    }

    #[test]
    fn test_chain_override_copies_into_request() {
        let mut actor = Actor::new(ActorId(1), Vec3::ZERO);
        let chain = ChainOverride {
            shape: ChainShape::TrueArea,
            radius: 4.0,
            max_targets: 3,
            ..Default::default()
        };
        actor
            .queue_attack(AttackOptions::new("main_hand", Vec3::Z).with_chain_override(chain))
            .unwrap();

        let request = &actor.pending_attacks[0];
        assert_eq!(request.chain_shape, ChainShape::TrueArea);
        assert_eq!(request.chain_radius, 4.0);
        assert_eq!(request.chain_max_targets, 3);
    }

    #[test]
    fn test_lockout_gate() {
        let lockout = Lockout {
            next_ready_time_global: 10.0,
            last_swing_time: 8.0,
        };
        // Global gate blocks until 10.0.
        assert!(!lockout.is_ready(9.0, 0.0, false));
        assert!(lockout.is_ready(10.0, 0.0, false));
        // Chain requests bypass the global gate but still honor their own
        // lockout duration.
        assert!(lockout.is_ready(9.0, 0.0, true));
        assert!(!lockout.is_ready(9.0, 1.5, true));
        assert!(lockout.is_ready(9.5, 1.5, true));
    }

    #[test]
    fn test_fresh_lockout_passes_the_duration_gate() {
        let lockout = Lockout::default();
        // A record that never swung is not held back by the weapon lockout.
        assert!(lockout.is_ready(0.0, 1.0, false));
    }

    #[test]
    fn test_temporal_multiplier_clamps() {
        let config = EngineConfig::default();
        let neutral = TemporalModifiers::default();
        assert_eq!(neutral.interval_multiplier(&config), 1.0);

        let hasted = TemporalModifiers { haste_percent: 0.5, slow_percent: 0.0 };
        assert!((hasted.interval_multiplier(&config) - 0.5).abs() < 1e-6);

        let extreme = TemporalModifiers { haste_percent: 1.0, slow_percent: 0.0 };
        assert_eq!(extreme.interval_multiplier(&config), config.min_temporal_multiplier);
    }
}
