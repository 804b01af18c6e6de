//! Defender-side tuning and block arithmetic

use serde::{Deserialize, Serialize};

use crate::core::types::{SimTime, SlotId};

/// When a parry's counter-attack executes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RipostePolicy {
    #[default]
    None,
    /// Drained by the plan builder in the same tick
    Immediate,
    /// Drained one tick later
    NextTick,
}

/// Per-defender mitigation chances, populated by the stat engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefenseTuning {
    pub parry_chance: f32,
    pub dodge_chance: f32,
    pub block_chance: f32,
    pub block_flat: f32,
    /// Fraction of damage removed by a successful block, clamped to [0, 1]
    pub block_percent: f32,
    pub riposte_policy: RipostePolicy,
    pub riposte_weapon_slot: SlotId,
}

/// Guaranteed-parry window state, armed by the defense-input layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DefenseWindowState {
    pub parry_window_active: bool,
    pub window_expiry: SimTime,
    pub window_id: u32,
}

impl DefenseWindowState {
    /// True while the window guarantees a parry
    pub fn grants_parry(&self, now: SimTime) -> bool {
        self.parry_window_active && self.window_expiry > now
    }
}

/// Block arithmetic: percent reduction first, then the flat amount,
/// floored and never negative
pub fn apply_block(incoming_damage: i32, block_percent: f32, block_flat: f32) -> i32 {
    if incoming_damage <= 0 {
        return 0;
    }

    let percent = block_percent.clamp(0.0, 1.0);
    let mut reduced = incoming_damage as f32 * (1.0 - percent);
    reduced -= block_flat.max(0.0);
    (reduced.floor() as i32).max(0)
}
