use thiserror::Error;

/// Errors surfaced at the request-factory boundary.
///
/// The per-tick resolution path never returns errors: rejected requests are
/// dropped with telemetry, missing targets resolve to empty candidate sets.
#[derive(Error, Debug)]
pub enum MeleeError {
    #[error("Actor not found: {0:?}")]
    UnknownActor(crate::core::types::ActorId),

    #[error("Weapon slot id must not be empty")]
    EmptySlotId,

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MeleeError>;
