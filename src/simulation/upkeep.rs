//! End-of-tick upkeep: defense windows, proc runtime pruning, cleanup

use crate::combat::telemetry::TelemetryKind;
use crate::world::MeleeWorld;

/// Clear parry windows whose expiry has passed. The window id survives so
/// the input layer can tell a fresh window from a cleared one.
pub fn expire_defense_windows(world: &mut MeleeWorld) {
    let now = world.now;
    for actor in world.actors.values_mut() {
        let window = &mut actor.defense_window;
        if window.parry_window_active && window.window_expiry <= now {
            window.parry_window_active = false;
            window.window_expiry = 0.0;
        }
    }
}

/// Prune per-actor proc runtime: elapsed trigger windows reset their
/// count, entries past their lifetime are removed
pub fn prune_proc_runtime(world: &mut MeleeWorld) {
    let now = world.now;
    for actor in world.actors.values_mut() {
        let runtime = &mut actor.proc_runtime;
        let mut i = 0;
        while i < runtime.len() {
            let state = &mut runtime[i];

            if state.window_expiry > 0.0 && now >= state.window_expiry {
                state.trigger_count = 0;
                state.window_expiry = 0.0;
            }

            if state.expire_time > 0.0 && now >= state.expire_time {
                runtime.swap_remove(i);
                continue;
            }

            i += 1;
        }
    }
}

/// Destroy completed swings, emitting one SwingCompleted event each
pub fn cleanup_swings(world: &mut MeleeWorld) {
    let MeleeWorld { swings, telemetry, .. } = world;

    for swing in swings.iter() {
        if swing.completed {
            telemetry.write(
                TelemetryKind::SwingCompleted,
                swing.attacker,
                None,
                &swing.weapon_slot,
                swing.sequence_id,
                0.0,
                0.0,
            );
        }
    }

    swings.retain(|s| !s.completed);
}
