use crate::math::Vector3;

/// Magnus coefficient of a sphere: the lift scale times the ball volume
pub fn magnus_coefficient(radius: f32, air_coefficient: f32) -> f32 {
    air_coefficient * 4.0 / 3.0 * std::f32::consts::PI * radius.powi(3)
}

/// Spin lift on a ball, `coefficient · (ω × v)`.
///
/// Zero spin or zero velocity gives a zero force. Non-finite inputs or a
/// non-finite result also give a zero force so nothing bogus reaches the
/// solver.
pub fn compute_magnus_force(
    angular_velocity: Vector3,
    linear_velocity: Vector3,
    coefficient: f32,
) -> Vector3 {
    let force = angular_velocity.cross(&linear_velocity) * coefficient;
    if force.is_finite() {
        force
    } else {
        log::warn!(
            "discarding non-finite Magnus force (ω = {}, v = {}, c = {})",
            angular_velocity,
            linear_velocity,
            coefficient
        );
        Vector3::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn spin_about_x_lifts_a_ball_travelling_towards_the_net() {
        let force = compute_magnus_force(Vector3::new(10.0, 0.0, 0.0), Vector3::new(0.0, 0.0, -20.0), 0.5);
        assert_relative_eq!(force, Vector3::new(0.0, 100.0, 0.0));
    }

    #[test]
    fn zero_spin_gives_zero_force() {
        let force = compute_magnus_force(Vector3::zero(), Vector3::new(3.0, -4.0, 12.0), 1.0);
        assert_eq!(force, Vector3::zero());
    }

    #[test]
    fn nan_gives_zero_force() {
        let force = compute_magnus_force(Vector3::new(f32::NAN, 0.0, 0.0), Vector3::unit_z(), 1.0);
        assert_eq!(force, Vector3::zero());
        let force = compute_magnus_force(Vector3::unit_x(), Vector3::unit_z(), f32::INFINITY);
        assert_eq!(force, Vector3::zero());
    }

    #[test]
    fn coefficient_scales_with_volume() {
        let small = magnus_coefficient(0.5, 1.0);
        let large = magnus_coefficient(1.0, 1.0);
        assert_relative_eq!(large / small, 8.0, epsilon = 1.0e-5);
    }
}
