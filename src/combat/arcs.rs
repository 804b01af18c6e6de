//! Angular arc math for cleave and rear-arc target gathering

use glam::Vec3;

/// Fallback forward direction when an aim vector degenerates
pub const DEFAULT_AIM: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// Normalize an aim direction, falling back to `DEFAULT_AIM` for
/// zero-length input
pub fn normalize_aim(direction: Vec3) -> Vec3 {
    direction.try_normalize().unwrap_or(DEFAULT_AIM)
}

/// Test whether `to_target` lies within `arc_degrees` centered on `forward`.
///
/// Zero-length offsets count as inside (the target is on top of the
/// attacker). The epsilon keeps boundary targets platform-stable despite
/// acos rounding.
pub fn is_within_arc(forward: Vec3, to_target: Vec3, arc_degrees: f32, epsilon: f32) -> bool {
    if to_target.length_squared() <= 1e-6 {
        return true;
    }

    let forward = normalize_aim(forward);
    let dir = to_target.normalize();
    let half_radians = (arc_degrees * 0.5).clamp(0.0, 180.0).to_radians();
    let angle = forward.dot(dir).clamp(-1.0, 1.0).acos();
    angle <= half_radians + epsilon
}
