//! Multi-attack resolver - rolls chain follow-ups for fresh swings
//!
//! Runs once per swing, right after plan building. Triple supersedes
//! double, flurry stacks on top, and an area follow-up rides alongside.
//! Generated requests land in the attacker's pending list and are picked
//! up by the plan builder on the NEXT tick, which is what spaces chain
//! attacks one tick apart.

use crate::combat::request::{AttackRequest, RequestFlags};
use crate::combat::weapons::ChainShape;
use crate::rng::{compose_request_id, SwingRng};
use crate::world::MeleeWorld;

struct ChainDescriptor {
    shape: ChainShape,
    arc_degrees: f32,
    radius: f32,
    max_targets: i32,
}

impl ChainDescriptor {
    fn plain() -> Self {
        Self {
            shape: ChainShape::None,
            arc_degrees: 0.0,
            radius: 0.0,
            max_targets: 0,
        }
    }
}

/// Roll double/triple/flurry/area follow-ups for every unresolved swing
pub fn resolve_multi_attacks(world: &mut MeleeWorld) {
    let frame_token = world.frame_token();
    let MeleeWorld { actors, swings, .. } = world;

    for swing in swings.iter_mut() {
        if swing.multi_attack_resolved {
            continue;
        }

        let Some(actor) = actors.get_mut(&swing.attacker) else {
            swing.multi_attack_resolved = true;
            continue;
        };

        let config = swing.definition.multi_attack.clone();
        let stats = &actor.stats;

        let allowed_depth = (config.max_chain_depth as i32).max(stats.multi_max_chain_depth as i32);
        if allowed_depth > 0 && (swing.chain_depth as i32) >= allowed_depth {
            swing.multi_attack_resolved = true;
            continue;
        }

        let mut rng = SwingRng::from_raw(swing.rng_state);

        let double_chance = (config.double_chance_percent + stats.multi_double_chance).clamp(0.0, 100.0);
        let triple_chance = (config.triple_chance_percent + stats.multi_triple_chance).clamp(0.0, 100.0);
        let flurry_chance = (config.flurry_chance_percent + stats.multi_flurry_chance).clamp(0.0, 100.0);
        let flurry_per_attack =
            (config.flurry_per_attack_percent + stats.multi_flurry_per_attack).clamp(0.0, 100.0);
        let flurry_max = (config.flurry_max_extra_attacks as i32).max(stats.multi_flurry_max_extra);
        let area_chance = (config.area_chance_percent + stats.multi_area_chance).clamp(0.0, 100.0);
        let chain_lockout_seconds = if stats.multi_chain_lockout_seconds > 0.0 {
            stats.multi_chain_lockout_seconds
        } else {
            config.chain_lockout_seconds
        };
        let chain_delay_seconds = if stats.multi_chain_delay_seconds > 0.0 {
            stats.multi_chain_delay_seconds
        } else {
            config.chain_delay_seconds
        };

        let next_depth = swing.chain_depth + 1;
        if allowed_depth > 0 && (next_depth as i32) > allowed_depth {
            swing.multi_attack_resolved = true;
            swing.rng_state = rng.serialize_state();
            continue;
        }

        let mut descriptors: Vec<ChainDescriptor> = Vec::new();

        // Triple supersedes double; its roll comes first in the stream.
        if triple_chance > 0.0 && rng.roll_percent(triple_chance) {
            descriptors.push(ChainDescriptor::plain());
            descriptors.push(ChainDescriptor::plain());
        } else if double_chance > 0.0 && rng.roll_percent(double_chance) {
            descriptors.push(ChainDescriptor::plain());
        }

        if flurry_max > 0 && flurry_chance > 0.0 && rng.roll_percent(flurry_chance) {
            for _ in 0..flurry_max {
                if flurry_per_attack <= 0.0 || !rng.roll_percent(flurry_per_attack) {
                    break;
                }
                descriptors.push(ChainDescriptor::plain());
            }
        }

        let area_shape = if stats.multi_area_shape != ChainShape::None {
            stats.multi_area_shape
        } else {
            config.area_shape
        };
        if area_shape != ChainShape::None && area_chance > 0.0 && rng.roll_percent(area_chance) {
            descriptors.push(ChainDescriptor {
                shape: area_shape,
                arc_degrees: if area_shape == ChainShape::TrueArea {
                    0.0
                } else if stats.multi_area_arc_degrees > 0.0 {
                    stats.multi_area_arc_degrees
                } else {
                    config.area_arc_degrees
                },
                radius: if stats.multi_area_radius > 0.0 {
                    stats.multi_area_radius
                } else {
                    config.area_radius
                },
                max_targets: if stats.multi_area_max_targets > 0 {
                    stats.multi_area_max_targets
                } else {
                    config.area_max_targets
                },
            });
        }

        if descriptors.is_empty() {
            swing.multi_attack_resolved = true;
            swing.rng_state = rng.serialize_state();
            continue;
        }

        let generated = descriptors.len();
        for descriptor in descriptors {
            let request_id = compose_request_id(frame_token, actor.pending_attacks.len() as u32);
            actor.pending_attacks.push(AttackRequest {
                attacker: swing.attacker,
                weapon_slot: swing.weapon_slot.clone(),
                aim_direction: swing.aim_direction,
                preferred_target: swing.preferred_target,
                flags: RequestFlags::MULTI_ATTACK_CHAIN | RequestFlags::SKIP_STAMINA_COST,
                request_id,
                chain_depth: next_depth,
                chain_shape: descriptor.shape,
                chain_arc_degrees: descriptor.arc_degrees,
                chain_radius: descriptor.radius,
                chain_max_targets: descriptor.max_targets,
                chain_delay_seconds,
                chain_lockout_seconds,
            });
        }

        tracing::debug!(
            attacker = swing.attacker.0,
            slot = %swing.weapon_slot,
            depth = next_depth,
            generated,
            "multi-attack chain generated"
        );

        swing.multi_attack_resolved = true;
        swing.rng_state = rng.serialize_state();
    }
}
