pub mod arcs;
pub mod damage;
pub mod defense;
pub mod procs;
pub mod request;
pub mod swing;
pub mod telemetry;
pub mod wards;
pub mod weapons;

pub use damage::{DamagePacket, DamageRequest, DamageSchool};
pub use defense::{apply_block, DefenseTuning, DefenseWindowState, RipostePolicy};
pub use procs::{
    MergedProcEntry, ProcChargeMode, ProcEntry, ProcPayloadArgs, ProcPayloadKind,
    ProcRuntimeState, ProcTable, ProcTargetMode,
};
pub use request::{AttackOptions, AttackRequest, ChainOverride, RequestFlags, RiposteRequest};
pub use swing::{Swing, SwingArena, SwingPhase, VictimRecord};
pub use telemetry::{RejectReason, TelemetryEvent, TelemetryKind, TelemetryLog};
pub use wards::{absorb_with_wards, DamageShieldState, WardAbsorb, WardState};
pub use weapons::{ChainShape, MultiAttackConfig, WeaponDef};
