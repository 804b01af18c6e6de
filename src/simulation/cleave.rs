//! Cleave roll - one chance per swing to widen into a frontal arc
//!
//! Rolls exactly once, in the tick the swing enters Active, before hit
//! detection gathers targets. A zero cleave chance resolves without
//! consuming an RNG draw so actors with and without the stat keep
//! identical streams for every other roll.

use crate::combat::swing::SwingPhase;
use crate::combat::telemetry::TelemetryKind;
use crate::rng::SwingRng;
use crate::world::MeleeWorld;

/// Resolve the frontal-arc cleave roll for swings entering Active
pub fn roll_cleaves(world: &mut MeleeWorld) {
    let MeleeWorld {
        actors,
        swings,
        telemetry,
        ..
    } = world;

    for swing in swings.iter_mut() {
        if swing.cleave_resolved || swing.phase != SwingPhase::Active {
            continue;
        }

        let Some(actor) = actors.get(&swing.attacker) else {
            continue;
        };

        let def = swing.definition.clone();
        let chance = actor.stats.frontal_arc_chance.max(0.0);
        if chance <= 0.0 {
            swing.cleave_mode = false;
            swing.cleave_arc_degrees = def.default_cleave_arc_degrees;
            swing.cleave_max_targets = def.default_cleave_max_targets.max(1);
            swing.cleave_resolved = true;
            continue;
        }

        let mut rng = SwingRng::from_raw(swing.rng_state);
        let cleave = rng.roll_percent(chance);
        swing.rng_state = rng.serialize_state();
        swing.cleave_resolved = true;

        if cleave {
            swing.cleave_mode = true;
            swing.cleave_arc_degrees = if actor.stats.frontal_arc_degrees > 0.0 {
                actor.stats.frontal_arc_degrees
            } else {
                def.default_cleave_arc_degrees
            };
            swing.cleave_max_targets = if actor.stats.frontal_arc_max_targets > 0 {
                actor.stats.frontal_arc_max_targets
            } else {
                def.default_cleave_max_targets
            };
            if actor.stats.frontal_arc_penetration > 0 {
                swing.penetration_remaining = actor.stats.frontal_arc_penetration;
            }

            telemetry.write(
                TelemetryKind::CleaveTriggered,
                swing.attacker,
                None,
                &swing.weapon_slot,
                swing.sequence_id,
                swing.cleave_arc_degrees,
                swing.cleave_max_targets as f32,
            );
        } else {
            swing.cleave_mode = false;
            swing.cleave_arc_degrees = def.default_cleave_arc_degrees;
            swing.cleave_max_targets = def.default_cleave_max_targets.max(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::combat::swing::{Swing, SwingPhase};
    use crate::combat::weapons::{ChainShape, WeaponDef};
    use crate::core::types::ActorId;
    use glam::Vec3;

    fn active_swing(world: &mut MeleeWorld, attacker: ActorId, def: WeaponDef) {
        let id = world.swings.allocate_id();
        world.swings.insert(Swing {
            id,
            attacker,
            preferred_target: None,
            weapon_slot: "main_hand".into(),
            definition: Arc::new(def),
            phase: SwingPhase::Active,
            phase_timer: 0.0,
            windup_time: 0.0,
            active_time: 0.1,
            recovery_time: 0.1,
            penetration_remaining: 1,
            aim_direction: Vec3::Z,
            cleave_mode: false,
            cleave_arc_degrees: 0.0,
            cleave_max_targets: 0,
            rng_state: 0x1234_5678,
            sequence_id: 1,
            riposte_origin: false,
            cleave_resolved: false,
            multi_attack_resolved: true,
            completed: false,
            chain_depth: 0,
            chain_shape: ChainShape::None,
            chain_arc_degrees: 0.0,
            chain_radius: 0.0,
            chain_max_targets: 0,
            chain_delay_seconds: 0.0,
            chain_lockout_seconds: 0.0,
            victims: Vec::new(),
            merged_procs: Vec::new(),
        });
    }

    #[test]
    fn test_zero_chance_resets_to_weapon_defaults_without_a_draw() {
        let mut world = MeleeWorld::new(0.05);
        let attacker = world.spawn_actor(Vec3::ZERO);
        let def = WeaponDef {
            default_cleave_arc_degrees: 90.0,
            default_cleave_max_targets: 0,
            ..Default::default()
        };
        active_swing(&mut world, attacker, def);

        roll_cleaves(&mut world);

        let swing = world.swings.iter().next().unwrap();
        assert!(swing.cleave_resolved);
        assert!(!swing.cleave_mode);
        assert_eq!(swing.cleave_arc_degrees, 90.0);
        assert_eq!(swing.cleave_max_targets, 1);
        // No draw consumed, so the stream is untouched.
        assert_eq!(swing.rng_state, 0x1234_5678);
    }

    #[test]
    fn test_guaranteed_roll_takes_stat_overrides() {
        let mut world = MeleeWorld::new(0.05);
        let attacker = world.spawn_actor(Vec3::ZERO);
        {
            let stats = &mut world.actor_mut(attacker).unwrap().stats;
            stats.frontal_arc_chance = 100.0;
            stats.frontal_arc_degrees = 150.0;
            stats.frontal_arc_max_targets = 4;
            stats.frontal_arc_penetration = 2;
        }
        active_swing(&mut world, attacker, WeaponDef::default());

        roll_cleaves(&mut world);

        let swing = world.swings.iter().next().unwrap();
        assert!(swing.cleave_mode);
        assert_eq!(swing.cleave_arc_degrees, 150.0);
        assert_eq!(swing.cleave_max_targets, 4);
        assert_eq!(swing.penetration_remaining, 2);
        assert_eq!(world.telemetry.count(TelemetryKind::CleaveTriggered), 1);
    }
}
