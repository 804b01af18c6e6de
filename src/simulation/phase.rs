//! Phase scheduler - advances swing timers through Windup/Active/Recovery
//!
//! The timer resets at each transition and the transition itself spends
//! the whole tick: a swing entering Active this tick is gathered by hit
//! detection this same tick, but a swing whose Recovery elapses only
//! flips `completed` here and is destroyed by cleanup afterwards.

use crate::combat::swing::SwingPhase;
use crate::world::MeleeWorld;

/// Advance every live swing's phase timer by one tick
pub fn advance_phases(world: &mut MeleeWorld) {
    let dt = world.delta_time;

    for swing in world.swings.iter_mut() {
        if swing.completed {
            continue;
        }

        swing.phase_timer += dt;
        match swing.phase {
            SwingPhase::Windup => {
                if swing.phase_timer >= swing.windup_time {
                    swing.phase = SwingPhase::Active;
                    swing.phase_timer = 0.0;
                }
            }
            SwingPhase::Active => {
                if swing.phase_timer >= swing.active_time {
                    swing.phase = SwingPhase::Recovery;
                    swing.phase_timer = 0.0;
                }
            }
            SwingPhase::Recovery => {
                if swing.phase_timer >= swing.recovery_time {
                    swing.completed = true;
                }
            }
            SwingPhase::Completed => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::weapons::WeaponDef;
    use crate::world::MeleeWorld;
    use glam::Vec3;
    use std::sync::Arc;

    fn world_with_swing(windup: f32, active: f32, recovery: f32) -> MeleeWorld {
        let mut world = MeleeWorld::new(0.1);
        let attacker = world.spawn_actor(Vec3::ZERO);
        let def = Arc::new(WeaponDef {
            windup_seconds: windup,
            active_seconds: active,
            recovery_seconds: recovery,
            range: 2.0,
            penetration_count: 1,
            ..Default::default()
        });
        world
            .actor_mut(attacker)
            .unwrap()
            .add_weapon_slot("main_hand", def);
        world
            .queue_attack(attacker, crate::combat::request::AttackOptions::new("main_hand", Vec3::Z))
            .unwrap();
        crate::simulation::plan::build_plans(&mut world);
        world
    }

    #[test]
    fn test_phase_progression() {
        let mut world = world_with_swing(0.2, 0.1, 0.2);

        // Two ticks of windup.
        advance_phases(&mut world);
        assert_eq!(world.swings.iter().next().unwrap().phase, SwingPhase::Windup);
        advance_phases(&mut world);
        assert_eq!(world.swings.iter().next().unwrap().phase, SwingPhase::Active);

        // One tick of active.
        advance_phases(&mut world);
        assert_eq!(world.swings.iter().next().unwrap().phase, SwingPhase::Recovery);

        // Two ticks of recovery, then completed.
        advance_phases(&mut world);
        assert!(!world.swings.iter().next().unwrap().completed);
        advance_phases(&mut world);
        assert!(world.swings.iter().next().unwrap().completed);
    }

    #[test]
    fn test_zero_windup_is_active_after_one_tick() {
        let mut world = world_with_swing(0.0, 0.5, 0.1);
        advance_phases(&mut world);
        assert_eq!(world.swings.iter().next().unwrap().phase, SwingPhase::Active);
    }
}
