//! Unit and basis conversion between the geometry engine (Y-up, metres)
//! and the host (Z-up, centimetres, left-handed rotations).
use bevy::math::{EulerRot, Quat, Vec3};

/// Engine metres to host centimetres.
pub const POSITION_SCALE_TO_HOST: f32 = 100.0;

/// Host centimetres to engine metres.
pub const POSITION_SCALE_TO_ENGINE: f32 = 0.01;

/// Convert an engine position tuple to a host position.
/// Swaps Y and Z and scales to host units.
pub fn position_to_host(p: [f32; 3]) -> Vec3 {
    Vec3::new(p[0], p[2], p[1]) * POSITION_SCALE_TO_HOST
}

/// Convert a host position to an engine position tuple.
pub fn position_to_engine(p: Vec3) -> [f32; 3] {
    let p = p * POSITION_SCALE_TO_ENGINE;
    [p.x, p.z, p.y]
}

/// Convert an engine quaternion tuple `(x, y, z, w)` to a host rotation.
/// The axis swap flips handedness, so w is negated.
pub fn quat_to_host(q: [f32; 4]) -> Quat {
    Quat::from_xyzw(q[0], q[2], q[1], -q[3])
}

/// Convert a host rotation to an engine quaternion tuple.
pub fn quat_to_engine(q: Quat) -> [f32; 4] {
    [q.x, q.z, q.y, -q.w]
}

/// Convert engine Euler angles in radians to a host rotation.
/// Engine X is host pitch, engine Z is host yaw and engine Y is host roll.
pub fn euler_to_host(r: [f32; 3]) -> Quat {
    rotator_to_quat(r[0].to_degrees(), r[2].to_degrees(), r[1].to_degrees())
}

/// Build a host quaternion from pitch, yaw and roll in degrees.
/// Host rotators apply roll about X, then pitch about Y, then yaw about Z,
/// with pitch measured in the opposite sense to a right-handed Y rotation.
pub fn rotator_to_quat(pitch: f32, yaw: f32, roll: f32) -> Quat {
    Quat::from_euler(
        EulerRot::ZYX,
        yaw.to_radians(),
        -pitch.to_radians(),
        -roll.to_radians(),
    )
}
