mod vector;
mod rotation;
mod ray;

pub use vector::Vector3;
pub use rotation::{Quaternion, Rotation};
pub use ray::Ray;

/// Constant for a very small number, used for comparisons
pub const EPSILON: f32 = 1.0e-6;

/// Metres per second in one mile per hour
pub const MPH_TO_MS: f32 = 0.44704;

/// Returns true if the two floating point values are approximately equal
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Returns true if the value is approximately zero
#[inline]
pub fn approx_zero(a: f32) -> bool {
    a.abs() < EPSILON
}

/// Linearly interpolates between two values
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Converts miles per hour to metres per second
#[inline]
pub fn mph_to_ms(mph: f32) -> f32 {
    mph * MPH_TO_MS
}

/// Converts revolutions per minute to radians per second
#[inline]
pub fn rpm_to_rad_per_sec(rpm: f32) -> f32 {
    rpm * std::f32::consts::TAU / 60.0
}
