use crate::error::TennisError;
use crate::math::Vector3;
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Configuration of the sandbox world
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SandboxConfig {
    /// The fixed time step for the simulation
    pub time_step: f32,

    /// The maximum number of substeps per call to `step`
    pub max_substeps: u32,

    /// Constant gravity acceleration
    pub gravity: Vector3,

    /// Height of the infinite ground plane, or `None` for no ground
    pub ground_height: Option<f32>,

    /// The number of iterations to run for solving joint velocities
    pub velocity_iterations: u32,

    /// Fraction of joint anchor drift corrected per substep (Baumgarte stabilization)
    pub joint_bias_factor: f32,

    /// Impact speed below which a body stops bouncing on the ground
    pub restitution_velocity_threshold: f32,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            time_step: 1.0 / 60.0,
            max_substeps: 10,
            gravity: Vector3::new(0.0, -9.81, 0.0),
            ground_height: Some(0.0),
            velocity_iterations: 8,
            joint_bias_factor: 0.2,
            restitution_velocity_threshold: 0.5,
        }
    }
}

impl SandboxConfig {
    /// A world with no gravity and no ground
    pub fn weightless() -> Self {
        Self {
            gravity: Vector3::zero(),
            ground_height: None,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(TennisError::InvalidParameter(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }
        if self.max_substeps == 0 {
            return Err(TennisError::InvalidParameter("max_substeps must be at least 1".to_string()));
        }
        if !self.gravity.is_finite() || !self.ground_height.map_or(true, f32::is_finite) {
            return Err(TennisError::InvalidParameter("gravity and ground height must be finite".to_string()));
        }
        if !(0.0..=1.0).contains(&self.joint_bias_factor) {
            return Err(TennisError::InvalidParameter(format!(
                "joint_bias_factor must be within [0, 1], got {}",
                self.joint_bias_factor
            )));
        }
        Ok(())
    }
}
