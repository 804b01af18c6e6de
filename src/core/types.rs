//! Core type definitions used throughout the engine

use serde::{Deserialize, Serialize};

/// Unique identifier for actors (attackers and defenders)
///
/// Deterministic u32 handles: the swing RNG seed is derived from this value,
/// so identity must survive save/restore bit-for-bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Stable handle for an in-flight swing in the swing arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwingId(pub u32);

/// Attacker-scoped attack request identifier
pub type RequestId = u32;

/// Simulation tick counter (discrete time unit)
pub type Tick = u64;

/// Absolute simulation time in seconds
pub type SimTime = f64;

/// Weapon slot identifier ("main_hand", "off_hand", ...)
pub type SlotId = String;
