use crate::config::{BallConstants, TennisConfig};
use crate::core::{MatchPhase, PhaseStore, SubscriptionId};
use crate::engine::{BodyHandle, PhysicsEngine};
use crate::math::Vector3;
use crate::Result;

use super::aerodynamics::compute_magnus_force;
use super::serve::ServeController;

/// Whether the ball is parked on its baseline or in play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlightState {
    /// Re-homed and at rest, no aerodynamic force applied
    #[default]
    Idle,
    /// Served or in a rally; spin lift applied every step
    InFlight,
}

/// Per-step orchestration of the ball body
#[derive(Debug, Clone)]
pub struct BallFlightController {
    ball: BodyHandle,
    subscription: SubscriptionId,
    state: FlightState,
    serve: ServeController,
    magnus_coefficient: f32,
    home: Vector3,
    out_of_bounds_y: f32,
}

impl BallFlightController {
    pub fn new(ball: BodyHandle, subscription: SubscriptionId, config: &TennisConfig) -> Self {
        Self {
            ball,
            subscription,
            state: FlightState::Idle,
            serve: ServeController::new(config),
            magnus_coefficient: BallConstants::from_config(config).magnus_coefficient,
            home: config.ball_home(),
            out_of_bounds_y: config.ball.out_of_bounds_y,
        }
    }

    pub fn ball(&self) -> BodyHandle {
        self.ball
    }

    pub fn state(&self) -> FlightState {
        self.state
    }

    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    pub fn serve_controller(&self) -> &ServeController {
        &self.serve
    }

    /// Reads every pending phase change: `ready` re-homes the ball,
    /// `playing` puts it in flight.
    pub fn handle_phase<E: PhysicsEngine>(&mut self, engine: &mut E, phases: &mut PhaseStore) -> Result<()> {
        while let Some(transition) = phases.next_transition(self.subscription) {
            match transition.to {
                MatchPhase::Ready => self.reset(engine)?,
                MatchPhase::Playing => self.state = FlightState::InFlight,
                MatchPhase::Ended => {}
            }
        }
        Ok(())
    }

    /// Parks the ball on its baseline with no velocity and no force
    pub fn reset<E: PhysicsEngine>(&mut self, engine: &mut E) -> Result<()> {
        engine.reset_forces(self.ball)?;
        engine.set_translation(self.ball, self.home)?;
        engine.set_linear_velocity(self.ball, Vector3::zero())?;
        engine.set_angular_velocity(self.ball, Vector3::zero())?;
        self.state = FlightState::Idle;
        log::debug!("ball re-homed to {}", self.home);
        Ok(())
    }

    /// Serves if the ball is on the ground. Returns whether it served.
    pub fn serve<E: PhysicsEngine>(&mut self, engine: &mut E) -> Result<bool> {
        let served = self.serve.attempt_serve(engine, self.ball)?;
        if served {
            self.state = FlightState::InFlight;
        }
        Ok(served)
    }

    /// Replaces last step's spin lift with the one for the current velocities
    pub fn apply_aerodynamics<E: PhysicsEngine>(&self, engine: &mut E) -> Result<Vector3> {
        let angular = engine.angular_velocity(self.ball)?;
        let linear = engine.linear_velocity(self.ball)?;
        let force = compute_magnus_force(angular, linear, self.magnus_coefficient);

        // Forces accumulate in the engine until cleared.
        engine.reset_forces(self.ball)?;
        engine.add_force(self.ball, force)?;
        Ok(force)
    }

    /// One physics tick for the ball
    pub fn step<E: PhysicsEngine>(
        &mut self,
        engine: &mut E,
        phases: &mut PhaseStore,
        serve_pressed: bool,
    ) -> Result<()> {
        self.handle_phase(engine, phases)?;

        if serve_pressed {
            self.serve(engine)?;
        }

        if self.state == FlightState::InFlight {
            self.apply_aerodynamics(engine)?;
        }

        let position = engine.translation(self.ball)?;
        if position.y < self.out_of_bounds_y && phases.restart() {
            log::debug!("ball out of bounds at {}", position);
        }
        Ok(())
    }
}
