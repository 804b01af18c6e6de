//! Deterministic per-swing PRNG
//!
//! A 32-bit xorshift generator whose entire state is one serializable word.
//! Every swing carries its own stream, seeded purely from
//! (attacker, weapon slot, request id, frame token), so the full sequence of
//! combat rolls is a function of recorded inputs and draw order. Nothing in
//! the engine may draw from a thread-local or global source.

use rand::RngCore;

/// Nonzero replacement for a zero seed (xorshift fixes the zero state)
const ZERO_SEED_REMAP: u32 = 0x9E37_79B9;

/// Serializable swing RNG with explicit 32-bit state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwingRng {
    state: u32,
}

impl SwingRng {
    /// Seed from the swing's identity tuple.
    ///
    /// The slot id is hashed with FNV-1a rather than a randomized-state
    /// hasher: replay across process restarts needs a stable value.
    pub fn from_seed(attacker: crate::core::types::ActorId, weapon_slot: &str, request_id: u32, frame_token: u32) -> Self {
        let mut seed = attacker.0.wrapping_mul(73_856_093);
        seed ^= fnv1a(weapon_slot.as_bytes());
        seed = hash_combine(seed, request_id);
        seed = hash_combine(seed, frame_token);
        Self::from_raw(seed)
    }

    /// Restore from a serialized state word
    pub fn from_raw(seed: u32) -> Self {
        let state = if seed == 0 { ZERO_SEED_REMAP } else { seed };
        Self { state }
    }

    /// Current state word, stored back into the swing after each
    /// consuming operation
    pub fn serialize_state(&self) -> u32 {
        self.state
    }

    fn advance(&mut self) -> u32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    /// Uniform draw in [0, 1) with 24 bits of precision
    pub fn next_float(&mut self) -> f32 {
        (self.advance() & 0x00FF_FFFF) as f32 / 16_777_216.0
    }

    /// Percent check: `p <= 0` never succeeds, `p >= 100` always does,
    /// anything between consumes exactly one draw
    pub fn roll_percent(&mut self, percent: f32) -> bool {
        if percent <= 0.0 {
            return false;
        }
        if percent >= 100.0 {
            return true;
        }
        self.next_float() * 100.0 < percent
    }
}

impl RngCore for SwingRng {
    fn next_u32(&mut self) -> u32 {
        self.advance()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.advance() as u64;
        let lo = self.advance() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let word = self.advance().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

fn hash_combine(seed: u32, value: u32) -> u32 {
    seed ^ value
        .wrapping_add(0x9E37_79B9)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

/// Stable FNV-1a used wherever a hash must survive process restarts
/// (RNG seeding, derived proc source keys)
pub(crate) fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 0x811C_9DC5;
    for &b in bytes {
        hash ^= b as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Request ids for engine-generated requests (riposte drain, chain
/// follow-ups) mix the frame token with the queue position
pub fn compose_request_id(frame_token: u32, local_index: u32) -> u32 {
    (frame_token << 12) ^ local_index.wrapping_mul(2_654_435_761)
}
