//! Per-tick resolution stages
//!
//! `run_melee_tick` advances the clock one fixed step and runs the stages
//! in their canonical order:
//! plan building -> multi-attack -> phase -> cleave roll -> hit detection
//! -> defense-window expiry -> proc-state pruning -> cleanup
//!
//! The order is load-bearing: it fixes which stage consumes which RNG
//! draws, so any reordering silently breaks replays.

pub mod cleave;
pub mod hit_detection;
pub mod multi_attack;
pub mod phase;
pub mod plan;
pub mod upkeep;

pub use cleave::roll_cleaves;
pub use hit_detection::detect_hits;
pub use multi_attack::resolve_multi_attacks;
pub use phase::advance_phases;
pub use plan::build_plans;
pub use upkeep::{cleanup_swings, expire_defense_windows, prune_proc_runtime};

use crate::dispatch::ProcDispatcher;
use crate::world::MeleeWorld;

/// Advance the world one tick through the full resolution pipeline
pub fn run_melee_tick(world: &mut MeleeWorld, dispatcher: &mut dyn ProcDispatcher) {
    world.advance_clock();

    build_plans(world);
    resolve_multi_attacks(world);
    advance_phases(world);
    roll_cleaves(world);
    detect_hits(world, dispatcher);
    expire_defense_windows(world);
    prune_proc_runtime(world);
    cleanup_swings(world);

    tracing::trace!(
        tick = world.current_tick,
        swings = world.swings.len(),
        events = world.telemetry.events().len(),
        "tick resolved"
    );
}
