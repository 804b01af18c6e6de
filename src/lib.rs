//! Arc Melee - Deterministic Melee Combat Resolution Engine

pub mod actor;
pub mod combat;
pub mod core;
pub mod dispatch;
pub mod rng;
pub mod simulation;
pub mod world;
