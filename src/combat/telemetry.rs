//! Write-only telemetry
//!
//! Every stage appends structured events; nothing in the engine reads them
//! back. The log is cleared at the start of each tick, so consumers
//! (observability, tests, the skirmish runner) see exactly one tick's worth
//! of events at a time.

use serde::{Deserialize, Serialize};

use crate::core::types::{ActorId, RequestId, SlotId};

/// Telemetry event kinds emitted by the resolution stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TelemetryKind {
    SwingBegan,
    SwingRejected,
    SwingCompleted,
    Hit,
    Dodged,
    Parried,
    Blocked,
    RiposteQueued,
    ProcTriggered,
    CleaveTriggered,
    WardConsumed,
    DamageShieldTriggered,
}

/// Reason codes carried on `SwingRejected` events (in `value0`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    UnknownSlot = 1,
    SlotUnusable = 2,
    LockoutActive = 3,
    CannotAffordStamina = 4,
}

/// One append-only telemetry record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub kind: TelemetryKind,
    pub attacker: ActorId,
    pub target: Option<ActorId>,
    pub weapon_slot: SlotId,
    pub request_id: RequestId,
    pub value0: f32,
    pub value1: f32,
    pub flags: u8,
}

/// The per-tick event log
#[derive(Debug, Default)]
pub struct TelemetryLog {
    events: Vec<TelemetryEvent>,
}

impl TelemetryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dropped at the start of every tick
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn write(
        &mut self,
        kind: TelemetryKind,
        attacker: ActorId,
        target: Option<ActorId>,
        weapon_slot: &str,
        request_id: RequestId,
        value0: f32,
        value1: f32,
    ) {
        self.events.push(TelemetryEvent {
            kind,
            attacker,
            target,
            weapon_slot: weapon_slot.to_string(),
            request_id,
            value0,
            value1,
            flags: 0,
        });
    }

    pub fn events(&self) -> &[TelemetryEvent] {
        &self.events
    }

    /// Events of one kind, in emission order
    pub fn of_kind(&self, kind: TelemetryKind) -> impl Iterator<Item = &TelemetryEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    pub fn count(&self, kind: TelemetryKind) -> usize {
        self.of_kind(kind).count()
    }
}
