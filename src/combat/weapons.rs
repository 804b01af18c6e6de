//! Weapon definitions
//!
//! Externally authored, immutable, and shared: many actors reference one
//! `WeaponDef` through an `Arc`, and its lifetime is independent of any
//! swing spawned from it. The engine never mutates a definition.

use serde::{Deserialize, Serialize};

use crate::combat::damage::DamagePacket;
use crate::combat::procs::ProcEntry;

/// Shape of a chain/cleave attack's target gathering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainShape {
    /// Single-target swing (preferred target, else nearest in range)
    #[default]
    None,
    /// Angular arc around the aim direction
    Arc,
    /// Direction-independent radius around the attacker
    TrueArea,
    /// Angular arc behind the attacker
    RearArc,
}

/// Follow-up attack configuration baked into a weapon definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiAttackConfig {
    pub double_chance_percent: f32,
    pub triple_chance_percent: f32,
    pub flurry_chance_percent: f32,
    pub flurry_per_attack_percent: f32,
    pub flurry_max_extra_attacks: u8,
    pub max_chain_depth: u8,
    pub chain_lockout_seconds: f32,
    pub chain_delay_seconds: f32,
    pub area_chance_percent: f32,
    pub area_shape: ChainShape,
    pub area_arc_degrees: f32,
    pub area_max_targets: i32,
    pub area_radius: f32,
}

/// Immutable melee weapon definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponDef {
    pub weapon_id: String,
    pub base_damage: DamagePacket,
    pub windup_seconds: f32,
    pub active_seconds: f32,
    pub recovery_seconds: f32,
    pub range: f32,
    /// Default arc for rear-arc gathering when the swing carries none
    pub baseline_arc_degrees: f32,
    /// How many distinct targets one swing may damage
    pub penetration_count: i32,
    pub stamina_cost: i32,
    pub lockout_seconds: f32,
    pub default_cleave_arc_degrees: f32,
    pub default_cleave_max_targets: i32,
    pub proc_entries: Vec<ProcEntry>,
    pub multi_attack: MultiAttackConfig,
}
