//! Attack and riposte requests
//!
//! Requests are the engine's only input: the AI/player layer appends them to
//! an actor's pending list (via `Actor::queue_attack`), and the multi-attack
//! resolver appends its own chain follow-ups. The plan builder drains the
//! list every tick.

use bitflags::bitflags;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::combat::weapons::ChainShape;
use crate::core::types::{ActorId, RequestId, SimTime, SlotId};

bitflags! {
    /// Request modifier flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RequestFlags: u8 {
        /// A parry of this swing may schedule a counter-attack
        const ALLOW_RIPOSTE = 1 << 0;
        /// This request is itself a riposte counter-attack
        const RIPOSTE = 1 << 1;
        /// Bypass the stamina afford check and spend
        const SKIP_STAMINA_COST = 1 << 2;
        /// Generated by the multi-attack resolver
        const MULTI_ATTACK_CHAIN = 1 << 3;
    }
}

/// One queued attack request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackRequest {
    pub attacker: ActorId,
    pub weapon_slot: SlotId,
    pub aim_direction: Vec3,
    pub preferred_target: Option<ActorId>,
    pub flags: RequestFlags,
    pub request_id: RequestId,
    pub chain_depth: u8,
    pub chain_shape: ChainShape,
    pub chain_arc_degrees: f32,
    pub chain_radius: f32,
    pub chain_max_targets: i32,
    /// Carried for the animation layer; no resolution stage consumes it
    pub chain_delay_seconds: f32,
    /// Positive values override the weapon lockout for this request
    pub chain_lockout_seconds: f32,
}

impl AttackRequest {
    /// A plain single-target request with no chain parameters
    pub fn basic(attacker: ActorId, weapon_slot: impl Into<SlotId>, aim_direction: Vec3, request_id: RequestId) -> Self {
        Self {
            attacker,
            weapon_slot: weapon_slot.into(),
            aim_direction,
            preferred_target: None,
            flags: RequestFlags::empty(),
            request_id,
            chain_depth: 0,
            chain_shape: ChainShape::None,
            chain_arc_degrees: 0.0,
            chain_radius: 0.0,
            chain_max_targets: 0,
            chain_delay_seconds: 0.0,
            chain_lockout_seconds: 0.0,
        }
    }
}

/// A counter-attack scheduled by a successful parry, drained into the
/// pending attack list once its execute time arrives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiposteRequest {
    pub source_attacker: ActorId,
    pub weapon_slot: SlotId,
    pub aim_direction: Vec3,
    pub execute_at_time: SimTime,
    pub source_request_id: RequestId,
}

/// Explicit chain parameters for externally authored arc/area attacks
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChainOverride {
    pub shape: ChainShape,
    pub arc_degrees: f32,
    pub radius: f32,
    pub max_targets: i32,
    pub delay_seconds: f32,
    pub lockout_seconds: f32,
}

/// Builder-style options for `Actor::queue_attack`
#[derive(Debug, Clone, PartialEq)]
pub struct AttackOptions {
    pub weapon_slot: SlotId,
    pub aim_direction: Vec3,
    pub preferred_target: Option<ActorId>,
    pub allow_riposte: bool,
    pub skip_stamina_cost: bool,
    pub mark_as_riposte: bool,
    pub chain_override: Option<ChainOverride>,
    /// Nonzero value bypasses the actor's sequence counter
    pub explicit_request_id: RequestId,
}

impl AttackOptions {
    pub fn new(weapon_slot: impl Into<SlotId>, aim_direction: Vec3) -> Self {
        Self {
            weapon_slot: weapon_slot.into(),
            aim_direction,
            preferred_target: None,
            allow_riposte: true,
            skip_stamina_cost: false,
            mark_as_riposte: false,
            chain_override: None,
            explicit_request_id: 0,
        }
    }

    pub fn with_target(mut self, target: ActorId) -> Self {
        self.preferred_target = Some(target);
        self
    }

    pub fn with_chain_override(mut self, chain: ChainOverride) -> Self {
        self.chain_override = Some(chain);
        self
    }
}
