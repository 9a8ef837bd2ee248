//! Per-frame animation as pure functions of elapsed time
//!
//! Each frame the renderer recomputes an object's transform from its base
//! transform, its animation record, and the elapsed wall-clock time. No
//! incremental state is carried between frames, so rendering the same
//! document twice can never drift.

use crate::document::Animation;

/// Reference frame rate the service's per-frame rotation rates assume.
/// Angles advance by `rate * ROTATION_RATE_HZ` radians per second, making
/// rotation speed independent of the display refresh rate.
pub const ROTATION_RATE_HZ: f32 = 60.0;

/// Peak vertical offset of the float animation, in scene units
pub const FLOAT_AMPLITUDE: f32 = 0.2;

/// Peak relative scale change of the pulse animation
pub const PULSE_AMPLITUDE: f32 = 0.1;

/// Pulse oscillates at twice the float frequency
pub const PULSE_FREQUENCY: f32 = 2.0;

/// Euler XYZ rotation (radians) at `elapsed` seconds
pub fn animated_rotation(base: [f32; 3], animation: &Animation, elapsed: f32) -> [f32; 3] {
    let advance = |rate: Option<f32>| rate.unwrap_or(0.0) * ROTATION_RATE_HZ * elapsed;
    [
        base[0] + advance(animation.rotate_x),
        base[1] + advance(animation.rotate_y),
        base[2] + advance(animation.rotate_z),
    ]
}

/// Position at `elapsed` seconds; floating overrides the vertical axis
pub fn animated_position(base: [f32; 3], animation: &Animation, elapsed: f32) -> [f32; 3] {
    if animation.float == Some(true) {
        [base[0], base[1] + elapsed.sin() * FLOAT_AMPLITUDE, base[2]]
    } else {
        base
    }
}

/// Scale at `elapsed` seconds; pulsing scales all axes together
pub fn animated_scale(base: [f32; 3], animation: &Animation, elapsed: f32) -> [f32; 3] {
    if animation.pulse == Some(true) {
        let factor = 1.0 + (elapsed * PULSE_FREQUENCY).sin() * PULSE_AMPLITUDE;
        [base[0] * factor, base[1] * factor, base[2] * factor]
    } else {
        base
    }
}
