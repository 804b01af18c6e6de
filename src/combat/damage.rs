//! Damage packets handed off to the external damage-resolution engine
//!
//! This engine never applies damage itself: a resolved hit appends a
//! `DamageRequest` to the defender's inbox and moves on.

use serde::{Deserialize, Serialize};

use crate::core::types::ActorId;

/// Damage school carried on every packet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageSchool {
    #[default]
    Physical,
    Fire,
    Frost,
    Nature,
    Shadow,
    Holy,
    Arcane,
    Lightning,
}

impl DamageSchool {
    /// Clamp an externally authored index into the school range
    pub fn from_index(index: i32) -> Self {
        match index.clamp(0, 7) {
            0 => Self::Physical,
            1 => Self::Fire,
            2 => Self::Frost,
            3 => Self::Nature,
            4 => Self::Shadow,
            5 => Self::Holy,
            6 => Self::Arcane,
            _ => Self::Lightning,
        }
    }
}

/// One unit of damage on the wire
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DamagePacket {
    pub school: DamageSchool,
    pub amount: i32,
    /// Optional comma-separated tags
    pub tags: String,
    pub source: Option<ActorId>,
    /// 1.0 = no crit
    pub crit_mult: f32,
    pub ignore_armor: bool,
    pub ignore_resist: bool,
}

/// Entry appended to a defender's damage inbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageRequest {
    pub target: ActorId,
    pub packet: DamagePacket,
}
