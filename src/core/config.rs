//! Engine configuration with documented constants
//!
//! The magic numbers of the resolution pipeline are collected here with
//! explanations of their purpose. Changing them changes replay streams, so
//! saved swings are only replayable against the config they were built with.

/// Tuning constants for the melee resolution engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fallback radius (world units) for TrueArea gathering when a swing
    /// carries no explicit chain radius.
    ///
    /// Plan building substitutes weapon range for zero-radius TrueArea
    /// requests, so this only applies to swings spawned by other paths.
    pub default_area_radius: f32,

    /// Tolerance added to the arc half-angle test.
    ///
    /// Targets sitting exactly on the arc boundary must resolve the same
    /// way on every platform despite acos rounding.
    pub arc_epsilon: f32,

    /// Lower clamp on the temporal interval multiplier.
    ///
    /// Matches the temporal engine's own clamp; a fully hasted actor still
    /// has nonzero windup so phase transitions stay ordered.
    pub min_temporal_multiplier: f32,

    /// Upper clamp on the temporal interval multiplier.
    pub max_temporal_multiplier: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_area_radius: 3.0,
            arc_epsilon: 1e-5,
            min_temporal_multiplier: 0.1,
            max_temporal_multiplier: 10.0,
        }
    }
}
