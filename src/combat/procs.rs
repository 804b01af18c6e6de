//! Proc entries, tables, and per-actor runtime bookkeeping
//!
//! A proc is a chance-based secondary effect attached to a weapon, an
//! equipment buff, or a temporary augment. Entries are static authoring
//! data; readiness (cooldown, charges, trigger windows) lives per actor in
//! `ProcRuntimeState`, keyed by (proc id, source key) so the same entry
//! granted by two sources tracks state independently.

use serde::{Deserialize, Serialize};

use crate::core::types::SimTime;

/// What a triggered proc dispatches to the external factories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcPayloadKind {
    #[default]
    ExtraDamage,
    DamageOverTime,
    HealOverTime,
    Buff,
    Debuff,
    AreaEffect,
    ScriptFeature,
    Spell,
}

/// Who the payload lands on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcTargetMode {
    /// The proc's owner (the attacker for weapon procs)
    Self_,
    /// The struck defender
    #[default]
    Target,
    /// Reserved: every target in the gathered arc
    ArcSet,
    /// Reserved: the owner's group
    Group,
}

/// When an activation charge is spent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcChargeMode {
    /// At most one charge per swing, however many targets it hits
    #[default]
    PerTriggerSuccess,
    /// One charge per target the payload lands on
    PerTargetApplied,
}

/// Numeric/id arguments forwarded to the payload factory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcPayloadArgs {
    pub int0: i32,
    pub int1: i32,
    pub float0: f32,
    pub float1: f32,
    pub duration_seconds: f32,
    pub interval_seconds: f32,
    pub secondary_id: String,
    pub tertiary_id: String,
}

/// One authored proc entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcEntry {
    pub proc_id: String,
    /// Explicit source key; empty means derive one from slot + source id
    pub source_key_hint: String,
    pub chance_percent: f32,
    pub internal_cooldown_seconds: f32,
    /// Max triggers inside one window; 0 = uncapped
    pub max_triggers: u8,
    /// Trigger-count window length; 0 = no window
    pub window_seconds: f32,
    pub payload_kind: ProcPayloadKind,
    pub payload_ref: String,
    pub target_mode: ProcTargetMode,
    pub charge_mode: ProcChargeMode,
    /// Total activation charges; 0 = unlimited
    pub max_activations: u8,
    /// Lifetime of the runtime entry; 0 = no expiry
    pub duration_seconds: f32,
    pub trigger_on_zero_damage: bool,
    pub melee_only: bool,
    pub payload: ProcPayloadArgs,
}

/// A shareable list of proc entries (equipment buffs and augments carry one)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcTable {
    pub entries: Vec<ProcEntry>,
}

/// An entry merged onto a swing, tagged with its originating source key
#[derive(Debug, Clone)]
pub struct MergedProcEntry {
    pub entry: ProcEntry,
    pub source_key: String,
    /// Set once a PerTriggerSuccess charge has been spent for this swing
    pub charge_consumed: bool,
}

/// Per-actor proc bookkeeping, keyed by (proc id, source key)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcRuntimeState {
    pub proc_id: String,
    pub source_key: String,
    pub next_ready_time: SimTime,
    /// Trigger-window expiry; 0 = window not armed
    pub window_expiry: SimTime,
    /// Absolute entry expiry; 0 = never
    pub expire_time: SimTime,
    pub trigger_count: u8,
    pub remaining_activations: u8,
}
