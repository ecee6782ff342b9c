use crate::config::{BallConstants, TennisConfig};
use crate::engine::{is_grounded, BodyHandle, PhysicsEngine};
use crate::math::{self, Vector3};
use crate::Result;

/// The pair of impulses a serve applies to the ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServeImpulse {
    pub linear: Vector3,
    pub torque: Vector3,
}

impl ServeImpulse {
    /// Converts a serve velocity (mph) and spin (rpm) into impulses.
    ///
    /// The linear impulse is `Δv · mass · contact_duration` and the torque
    /// impulse `Δω · inertia · contact_duration`, so a ball at rest leaves
    /// with exactly the configured speed and spin.
    ///
    /// Returns `None` if either impulse would be non-finite. A purely vertical
    /// serve has no horizontal spin axis and carries no torque.
    pub fn from_serve(velocity_mph: Vector3, spin_rpm: f32, constants: &BallConstants) -> Option<Self> {
        let velocity = velocity_mph.map(math::mph_to_ms);
        let linear = velocity * (constants.mass * constants.contact_duration);

        let direction = velocity.horizontal();
        let torque = if direction.is_zero() {
            Vector3::zero()
        } else {
            // Positive spin is topspin along the serve direction.
            let axis = Vector3::unit_y().cross(&direction).normalize();
            axis * (math::rpm_to_rad_per_sec(spin_rpm) * constants.inertia * constants.contact_duration)
        };

        if linear.is_finite() && torque.is_finite() {
            Some(Self { linear, torque })
        } else {
            None
        }
    }
}

/// Applies a serve when the ball is resting on the court
#[derive(Debug, Clone)]
pub struct ServeController {
    impulse: Option<ServeImpulse>,
    probe_offset: f32,
}

impl ServeController {
    pub fn new(config: &TennisConfig) -> Self {
        let constants = BallConstants::from_config(config);
        Self {
            impulse: ServeImpulse::from_serve(config.serve_velocity, config.serve_spin_rpm, &constants),
            probe_offset: config.ball.probe_offset,
        }
    }

    /// Impulses applied by a successful serve
    pub fn impulse(&self) -> Option<ServeImpulse> {
        self.impulse
    }

    /// Probes the ground below `ball` and serves if it is close enough.
    ///
    /// Returns whether the serve was applied. Being airborne is not an error.
    pub fn attempt_serve<E: PhysicsEngine>(&self, engine: &mut E, ball: BodyHandle) -> Result<bool> {
        let position = engine.translation(ball)?;
        let probe = position - Vector3::new(0.0, self.probe_offset, 0.0);
        if !is_grounded(&*engine, probe) {
            log::debug!("serve ignored, ball at {} is airborne", position);
            return Ok(false);
        }

        let impulse = match self.impulse {
            Some(impulse) => impulse,
            None => {
                log::warn!("serve ignored, configured impulse is not finite");
                return Ok(false);
            }
        };

        engine.apply_impulse(ball, impulse.linear)?;
        if !impulse.torque.is_zero() {
            engine.apply_torque_impulse(ball, impulse.torque)?;
        }
        log::debug!("serve from {} with impulse {} and spin {}", position, impulse.linear, impulse.torque);
        Ok(true)
    }
}
