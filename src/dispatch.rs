//! Proc payload dispatch boundary
//!
//! Triggered procs and damage-shield retaliations hand their payloads to
//! external factories (damage, DOT/HOT, buffs, area effects, scripting,
//! spell casting). `ProcDispatcher` is that seam: one method per payload
//! kind, each returning whether the factory accepted the payload. A refusal
//! is silently absorbed - the proc does not stamp cooldown/charge state and
//! no telemetry is written.

use crate::combat::damage::{DamagePacket, DamageSchool};
use crate::combat::procs::{ProcPayloadArgs, ProcPayloadKind, ProcTargetMode};
use crate::core::types::ActorId;

/// External payload factories, one call per payload kind
pub trait ProcDispatcher {
    fn extra_damage(&mut self, target: ActorId, packet: DamagePacket) -> bool;

    fn damage_over_time(&mut self, target: ActorId, payload_ref: &str, dps: i32, interval_seconds: f32, duration_seconds: f32, source: ActorId) -> bool;

    fn heal_over_time(&mut self, target: ActorId, payload_ref: &str, hps: i32, interval_seconds: f32, duration_seconds: f32, source: ActorId) -> bool;

    fn buff(&mut self, target: ActorId, payload_ref: &str, duration_seconds: f32, stacks: i32) -> bool;

    fn debuff(&mut self, target: ActorId, payload_ref: &str, duration_seconds: f32, stacks: i32) -> bool;

    fn area_effect(&mut self, center: ActorId, payload_ref: &str, radius: f32, lifetime_seconds: f32) -> bool;

    fn script_feature(&mut self, caster: ActorId, target: ActorId, payload_ref: &str) -> bool;

    fn cast_spell(&mut self, caster: ActorId, target: ActorId, payload_ref: &str) -> bool;
}

/// Pick who a payload lands on. `Self_` is the proc's owner; the arc-set
/// and group modes fall back to the struck target until their factories
/// grow multi-target entry points.
pub fn resolve_target(mode: ProcTargetMode, owner: ActorId, struck: Option<ActorId>) -> ActorId {
    match mode {
        ProcTargetMode::Self_ => owner,
        ProcTargetMode::Target | ProcTargetMode::ArcSet | ProcTargetMode::Group => struck.unwrap_or(owner),
    }
}

/// Route one payload to its factory, filling defaulted arguments.
///
/// Unknown combinations cannot arise (the kind enum is closed); a factory
/// returning false is the documented no-op path.
#[allow(clippy::too_many_arguments)]
pub fn route_payload(
    dispatcher: &mut dyn ProcDispatcher,
    kind: ProcPayloadKind,
    payload_ref: &str,
    target_mode: ProcTargetMode,
    args: &ProcPayloadArgs,
    owner: ActorId,
    target: ActorId,
    damage_dealt: i32,
) -> bool {
    match kind {
        ProcPayloadKind::ExtraDamage => {
            let amount = if args.int0 != 0 {
                args.int0
            } else {
                damage_dealt.max(1)
            };
            let packet = DamagePacket {
                school: DamageSchool::from_index(args.int1),
                amount,
                tags: payload_ref.to_string(),
                source: Some(owner),
                crit_mult: if args.float0 > 0.0 { args.float0 } else { 1.0 },
                ignore_armor: args.float1 > 0.0,
                ignore_resist: args.float1 < 0.0,
            };
            dispatcher.extra_damage(target, packet)
        }
        ProcPayloadKind::DamageOverTime => {
            let dps = if args.int0 != 0 { args.int0 } else { damage_dealt.max(1) };
            let interval = if args.interval_seconds > 0.0 { args.interval_seconds } else { 1.0 };
            let duration = if args.duration_seconds > 0.0 { args.duration_seconds } else { interval * 3.0 };
            dispatcher.damage_over_time(target, payload_ref, dps, interval, duration, owner)
        }
        ProcPayloadKind::HealOverTime => {
            let hps = if args.int0 != 0 { args.int0 } else { 1 };
            let interval = if args.interval_seconds > 0.0 { args.interval_seconds } else { 1.0 };
            let duration = if args.duration_seconds > 0.0 { args.duration_seconds } else { interval * 3.0 };
            dispatcher.heal_over_time(target, payload_ref, hps, interval, duration, owner)
        }
        ProcPayloadKind::Buff => {
            let stacks = if args.int0 > 0 { args.int0 } else { 1 };
            dispatcher.buff(target, payload_ref, args.duration_seconds.max(0.0), stacks)
        }
        ProcPayloadKind::Debuff => {
            let stacks = if args.int0 > 0 { args.int0 } else { 1 };
            dispatcher.debuff(target, payload_ref, args.duration_seconds.max(0.0), stacks)
        }
        ProcPayloadKind::AreaEffect => {
            let radius = if args.float0 > 0.0 { args.float0 } else { 3.0 };
            let lifetime = if args.duration_seconds > 0.0 { args.duration_seconds } else { 5.0 };
            dispatcher.area_effect(target, payload_ref, radius, lifetime)
        }
        ProcPayloadKind::ScriptFeature => {
            let resolved = if target_mode == ProcTargetMode::Self_ { owner } else { target };
            dispatcher.script_feature(owner, resolved, payload_ref)
        }
        ProcPayloadKind::Spell => {
            let resolved = if target_mode == ProcTargetMode::Self_ { owner } else { target };
            dispatcher.cast_spell(owner, resolved, payload_ref)
        }
    }
}

/// One recorded dispatch, for assertions and reports
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRecord {
    pub kind: ProcPayloadKind,
    pub payload_ref: String,
    pub target: ActorId,
    pub amount: i32,
}

/// Dispatcher that records every call; used by tests and the skirmish
/// runner. `reject_all` simulates factories refusing every payload.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    pub records: Vec<DispatchRecord>,
    pub reject_all: bool,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            records: Vec::new(),
            reject_all: true,
        }
    }

    fn record(&mut self, kind: ProcPayloadKind, payload_ref: &str, target: ActorId, amount: i32) -> bool {
        if self.reject_all {
            return false;
        }
        self.records.push(DispatchRecord {
            kind,
            payload_ref: payload_ref.to_string(),
            target,
            amount,
        });
        true
    }
}

impl ProcDispatcher for RecordingDispatcher {
    fn extra_damage(&mut self, target: ActorId, packet: DamagePacket) -> bool {
        let tags = packet.tags.clone();
        self.record(ProcPayloadKind::ExtraDamage, &tags, target, packet.amount)
    }

    fn damage_over_time(&mut self, target: ActorId, payload_ref: &str, dps: i32, _interval_seconds: f32, _duration_seconds: f32, _source: ActorId) -> bool {
        self.record(ProcPayloadKind::DamageOverTime, payload_ref, target, dps)
    }

    fn heal_over_time(&mut self, target: ActorId, payload_ref: &str, hps: i32, _interval_seconds: f32, _duration_seconds: f32, _source: ActorId) -> bool {
        self.record(ProcPayloadKind::HealOverTime, payload_ref, target, hps)
    }

    fn buff(&mut self, target: ActorId, payload_ref: &str, _duration_seconds: f32, stacks: i32) -> bool {
        self.record(ProcPayloadKind::Buff, payload_ref, target, stacks)
    }

    fn debuff(&mut self, target: ActorId, payload_ref: &str, _duration_seconds: f32, stacks: i32) -> bool {
        self.record(ProcPayloadKind::Debuff, payload_ref, target, stacks)
    }

    fn area_effect(&mut self, center: ActorId, payload_ref: &str, radius: f32, _lifetime_seconds: f32) -> bool {
        self.record(ProcPayloadKind::AreaEffect, payload_ref, center, radius as i32)
    }

    fn script_feature(&mut self, _caster: ActorId, target: ActorId, payload_ref: &str) -> bool {
        self.record(ProcPayloadKind::ScriptFeature, payload_ref, target, 0)
    }

    fn cast_spell(&mut self, _caster: ActorId, target: ActorId, payload_ref: &str) -> bool {
        self.record(ProcPayloadKind::Spell, payload_ref, target, 0)
    }
}
