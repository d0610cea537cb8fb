//! Key code to velocity mapping

use super::grid::Velocity;

pub const KEY_LEFT: i64 = 37;
pub const KEY_UP: i64 = 38;
pub const KEY_RIGHT: i64 = 39;
pub const KEY_DOWN: i64 = 40;
pub const KEY_A: i64 = 65;
pub const KEY_D: i64 = 68;
pub const KEY_S: i64 = 83;
pub const KEY_W: i64 = 87;

/// Direction bound to a browser key code, if any
pub fn direction_for_key(code: i64) -> Option<Velocity> {
    match code {
        KEY_LEFT | KEY_A => Some(Velocity::LEFT),
        KEY_UP | KEY_W => Some(Velocity::UP),
        KEY_RIGHT | KEY_D => Some(Velocity::RIGHT),
        KEY_DOWN | KEY_S => Some(Velocity::DOWN),
        _ => None,
    }
}

/// New velocity after a key press.
///
/// Unmapped keys and direct reversals leave `current` unchanged.
pub fn velocity_for_input(code: i64, current: Velocity) -> Velocity {
    match direction_for_key(code) {
        Some(dir) if current.is_none() || dir != current.opposite() => dir,
        _ => current,
    }
}
