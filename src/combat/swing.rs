//! Swing instances and their arena
//!
//! A swing is one attack in flight, created by the plan builder and
//! destroyed by cleanup once Recovery has elapsed. The arena keeps swings in
//! creation order behind stable ids; stage iteration order is therefore
//! deterministic, which the per-swing RNG streams rely on.

use std::sync::Arc;

use glam::Vec3;

use crate::combat::procs::MergedProcEntry;
use crate::combat::weapons::{ChainShape, WeaponDef};
use crate::core::types::{ActorId, RequestId, SlotId, SwingId};

/// Timed phases of a swing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SwingPhase {
    #[default]
    Windup,
    Active,
    Recovery,
    Completed,
}

/// Dedup record: a swing damages a defender at most once per discrete tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VictimRecord {
    pub target: ActorId,
    pub last_hit_tick: u32,
}

/// One melee attack in flight
#[derive(Debug, Clone)]
pub struct Swing {
    pub id: SwingId,
    pub attacker: ActorId,
    pub preferred_target: Option<ActorId>,
    pub weapon_slot: SlotId,
    pub definition: Arc<WeaponDef>,
    pub phase: SwingPhase,
    pub phase_timer: f32,
    /// Temporal-scaled at creation; the scheduler never rescales
    pub windup_time: f32,
    pub active_time: f32,
    pub recovery_time: f32,
    pub penetration_remaining: i32,
    pub aim_direction: Vec3,
    pub cleave_mode: bool,
    pub cleave_arc_degrees: f32,
    pub cleave_max_targets: i32,
    /// Serialized RNG state, written back after every consuming stage
    pub rng_state: u32,
    /// The request id this swing was built from
    pub sequence_id: RequestId,
    pub riposte_origin: bool,
    pub cleave_resolved: bool,
    pub multi_attack_resolved: bool,
    pub completed: bool,
    pub chain_depth: u8,
    pub chain_shape: ChainShape,
    pub chain_arc_degrees: f32,
    pub chain_radius: f32,
    pub chain_max_targets: i32,
    pub chain_delay_seconds: f32,
    pub chain_lockout_seconds: f32,
    pub victims: Vec<VictimRecord>,
    /// Weapon + equipment + augment procs merged at plan time
    pub merged_procs: Vec<MergedProcEntry>,
}

impl Swing {
    pub fn already_victim(&self, target: ActorId, frame_token: u32) -> bool {
        self.victims
            .iter()
            .any(|v| v.target == target && v.last_hit_tick == frame_token)
    }

    pub fn mark_victim(&mut self, target: ActorId, frame_token: u32) {
        if let Some(existing) = self.victims.iter_mut().find(|v| v.target == target) {
            existing.last_hit_tick = frame_token;
        } else {
            self.victims.push(VictimRecord {
                target,
                last_hit_tick: frame_token,
            });
        }
    }
}

/// Creation-ordered arena of in-flight swings
#[derive(Debug, Default)]
pub struct SwingArena {
    swings: Vec<Swing>,
    next_id: u32,
}

impl SwingArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next stable swing id
    pub fn allocate_id(&mut self) -> SwingId {
        let id = SwingId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, swing: Swing) -> SwingId {
        let id = swing.id;
        self.swings.push(swing);
        id
    }

    pub fn get(&self, id: SwingId) -> Option<&Swing> {
        self.swings.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Swing> {
        self.swings.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Swing> {
        self.swings.iter_mut()
    }

    /// Remove completed swings, preserving creation order of the rest
    pub fn retain<F: FnMut(&Swing) -> bool>(&mut self, keep: F) {
        self.swings.retain(keep);
    }

    pub fn len(&self) -> usize {
        self.swings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swings.is_empty()
    }
}
