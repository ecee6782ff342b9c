use crate::error::TennisError;
use crate::math::{self, Vector3};
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Ground-proximity threshold on the probe's time-of-impact
pub const GROUND_PROBE_THRESHOLD: f32 = 0.15;

/// Maximum distance covered by a ground probe
pub const GROUND_PROBE_DISTANCE: f32 = 10.0;

/// Top-level configuration for the tennis core
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TennisConfig {
    /// Distance from the net to each baseline along z
    pub baseline_z: f32,

    /// Linear damping of the ball
    pub linear_damping: f32,

    /// Angular damping of the ball
    pub angular_damping: f32,

    /// Serve velocity in miles per hour, per axis
    pub serve_velocity: Vector3,

    /// Serve spin in revolutions per minute; positive is topspin
    pub serve_spin_rpm: f32,

    /// Density of the ball (kg/m^3)
    pub ball_density: f32,

    /// Empirical lift scale multiplied by ball volume to give the Magnus coefficient
    pub air_coefficient: f32,

    /// Remaining ball parameters
    pub ball: BallConfig,

    /// Player avatar parameters
    pub avatar: AvatarConfig,

    /// Camera rig parameters
    pub camera: CameraConfig,
}

impl Default for TennisConfig {
    fn default() -> Self {
        Self {
            baseline_z: 13.0,
            linear_damping: 0.05,
            angular_damping: 0.1,
            serve_velocity: Vector3::new(-2.0, 18.0, 50.0),
            serve_spin_rpm: 1800.0,
            ball_density: 360.0,
            air_coefficient: 0.6125, // half the sea-level air density
            ball: BallConfig::default(),
            avatar: AvatarConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl TennisConfig {
    /// Checks every value the controllers rely on
    pub fn validate(&self) -> Result<()> {
        require_finite("baseline_z", self.baseline_z)?;
        require_non_negative("linear_damping", self.linear_damping)?;
        require_non_negative("angular_damping", self.angular_damping)?;
        if !self.serve_velocity.is_finite() {
            return Err(TennisError::InvalidParameter(
                "serve_velocity must be finite".to_string(),
            ));
        }
        require_finite("serve_spin_rpm", self.serve_spin_rpm)?;
        require_positive("ball_density", self.ball_density)?;
        require_non_negative("air_coefficient", self.air_coefficient)?;

        self.ball.validate()?;
        self.avatar.validate()?;
        self.camera.validate()
    }

    /// World-space position the ball is re-homed to on reset
    pub fn ball_home(&self) -> Vector3 {
        Vector3::new(0.0, self.ball.serve_height, -self.baseline_z)
    }

    /// World-space position the avatar's root is re-homed to on reset
    pub fn avatar_home(&self) -> Vector3 {
        Vector3::new(0.0, self.avatar.spawn_height, self.baseline_z)
    }
}

/// Ball parameters not covered by the top-level options
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct BallConfig {
    /// Ball diameter in metres
    pub diameter: f32,

    /// Coefficient of restitution against the court
    pub restitution: f32,

    /// Coefficient of friction against the court
    pub friction: f32,

    /// Converts a desired velocity change into an impulse (`Δv · mass · contact_duration`)
    pub contact_duration: f32,

    /// Height the ball is re-homed to on reset
    pub serve_height: f32,

    /// Height below which the ball is out of play
    pub out_of_bounds_y: f32,

    /// Distance below the ball centre the ground probe starts from
    pub probe_offset: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            diameter: 0.067,
            restitution: 0.75,
            friction: 0.5,
            contact_duration: 1.0,
            serve_height: 2.0,
            out_of_bounds_y: -1.0,
            probe_offset: 0.03,
        }
    }
}

impl BallConfig {
    fn validate(&self) -> Result<()> {
        require_positive("ball.diameter", self.diameter)?;
        require_non_negative("ball.restitution", self.restitution)?;
        require_non_negative("ball.friction", self.friction)?;
        require_positive("ball.contact_duration", self.contact_duration)?;
        require_finite("ball.serve_height", self.serve_height)?;
        require_finite("ball.out_of_bounds_y", self.out_of_bounds_y)?;
        require_non_negative("ball.probe_offset", self.probe_offset)
    }
}

/// Player avatar parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct AvatarConfig {
    /// Height of the root body when re-homed
    pub spawn_height: f32,

    /// Vertical offset of the hip above the root
    pub hip_offset: f32,

    /// Vertical offset of the head above the root
    pub head_offset: f32,

    /// Per-second impulse strength for walking
    pub move_strength: f32,

    /// Per-second impulse strength while chopping
    pub chop_strength: f32,

    /// Per-second braking factor applied to the root's velocity while chopping
    pub chop_brake: f32,

    /// Upward impulse applied by a jump
    pub jump_impulse: f32,

    /// Distance below the root centre the jump probe starts from
    pub jump_probe_offset: f32,

    /// Hip z below which the rally ends
    pub end_boundary_z: f32,

    /// Hip height below which the avatar has fallen off the court
    pub fall_threshold: f32,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            spawn_height: 1.0,
            hip_offset: 0.6,
            head_offset: 1.3,
            move_strength: 400.0,
            chop_strength: 200.0,
            chop_brake: 500.0,
            jump_impulse: 200.0,
            jump_probe_offset: 0.31,
            end_boundary_z: -42.0,
            fall_threshold: -1.0,
        }
    }
}

impl AvatarConfig {
    fn validate(&self) -> Result<()> {
        require_finite("avatar.spawn_height", self.spawn_height)?;
        require_finite("avatar.hip_offset", self.hip_offset)?;
        require_finite("avatar.head_offset", self.head_offset)?;
        require_non_negative("avatar.move_strength", self.move_strength)?;
        require_non_negative("avatar.chop_strength", self.chop_strength)?;
        require_non_negative("avatar.chop_brake", self.chop_brake)?;
        require_non_negative("avatar.jump_impulse", self.jump_impulse)?;
        require_non_negative("avatar.jump_probe_offset", self.jump_probe_offset)?;
        require_finite("avatar.end_boundary_z", self.end_boundary_z)?;
        require_finite("avatar.fall_threshold", self.fall_threshold)
    }
}

/// Third-person camera parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CameraConfig {
    /// Offset of the ideal camera position from the root
    pub offset: Vector3,

    /// Height of the look-at target above the root
    pub target_height: f32,

    /// Exponential smoothing rate, per second
    pub smoothing: f32,

    /// Smoothed camera position before the first frame
    pub initial_position: Vector3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            offset: Vector3::new(0.0, 1.75, 4.25),
            target_height: 0.5,
            smoothing: 5.0,
            initial_position: Vector3::new(10.0, 10.0, 10.0),
        }
    }
}

impl CameraConfig {
    fn validate(&self) -> Result<()> {
        if !self.offset.is_finite() || !self.initial_position.is_finite() {
            return Err(TennisError::InvalidParameter(
                "camera vectors must be finite".to_string(),
            ));
        }
        require_finite("camera.target_height", self.target_height)?;
        require_non_negative("camera.smoothing", self.smoothing)
    }
}

/// Ball constants derived once from the configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallConstants {
    /// Ball radius in metres
    pub radius: f32,

    /// Ball mass in kilograms
    pub mass: f32,

    /// Moment of inertia of the ball as a solid sphere (`2/5 · m · r²`)
    pub inertia: f32,

    /// Magnus coefficient (`air_coefficient · ball volume`)
    pub magnus_coefficient: f32,

    /// Impulse scale (`Δv · mass · contact_duration`, `Δω · inertia · contact_duration`)
    pub contact_duration: f32,

    /// Coefficient of restitution
    pub restitution: f32,
}

impl BallConstants {
    /// Derives the constants from a configuration
    pub fn from_config(config: &TennisConfig) -> Self {
        let radius = config.ball.diameter * 0.5;
        let volume = 4.0 / 3.0 * std::f32::consts::PI * radius.powi(3);
        let mass = volume * config.ball_density;

        Self {
            radius,
            mass,
            inertia: 0.4 * mass * radius * radius,
            magnus_coefficient: crate::ball::magnus_coefficient(radius, config.air_coefficient),
            contact_duration: config.ball.contact_duration,
            restitution: config.ball.restitution,
        }
    }

    /// Serve velocity converted to metres per second
    pub fn serve_velocity_ms(config: &TennisConfig) -> Vector3 {
        config.serve_velocity.map(math::mph_to_ms)
    }
}

fn require_finite(name: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TennisError::InvalidParameter(format!("{name} must be finite, got {value}")))
    }
}

fn require_non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TennisError::InvalidParameter(format!("{name} must be non-negative, got {value}")))
    }
}

fn require_positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TennisError::InvalidParameter(format!("{name} must be positive, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(TennisConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_density() {
        let config = TennisConfig {
            ball_density: 0.0,
            ..TennisConfig::default()
        };
        assert!(matches!(config.validate(), Err(TennisError::InvalidParameter(_))));
    }

    #[test]
    fn rejects_nan_serve_velocity() {
        let config = TennisConfig {
            serve_velocity: Vector3::new(f32::NAN, 0.0, 0.0),
            ..TennisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn ball_home_sits_behind_far_baseline() {
        let config = TennisConfig::default();
        assert_eq!(config.ball_home(), Vector3::new(0.0, 2.0, -13.0));
        assert_eq!(config.avatar_home(), Vector3::new(0.0, 1.0, 13.0));
    }

    #[test]
    fn ball_mass_follows_density_and_diameter() {
        let config = TennisConfig::default();
        let constants = BallConstants::from_config(&config);
        let expected = 4.0 / 3.0 * std::f32::consts::PI * 0.0335f32.powi(3) * 360.0;
        assert!((constants.mass - expected).abs() < 1e-6);
        assert!((constants.radius - 0.0335).abs() < 1e-6);
    }
}
