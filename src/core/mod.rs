//! Per-tick orchestration of the player, the ball and the camera.

mod phase;
mod camera;

pub use self::phase::{MatchPhase, PhaseStore, PhaseTransition, PhaseTrigger, SubscriptionId};
pub use self::camera::{CameraFollow, CameraPose};

use crate::ball::{BallFlightController, FlightState};
use crate::config::TennisConfig;
use crate::engine::{BodyDesc, BodyHandle, BodyShape, Material, PhysicsEngine};
use crate::player::{BodyRig, Locomotion, RigBlueprint, SwingIntent, SwingStateMachine};
use crate::Result;

/// Decoded input for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputFrame {
    /// Keys held down this tick
    pub held: SwingIntent,

    /// Keys that went down this tick; only `JUMP` and `SERVE` are read
    pub pressed: SwingIntent,
}

impl InputFrame {
    pub fn new(held: SwingIntent, pressed: SwingIntent) -> Self {
        Self { held, pressed }
    }

    /// Input with only held keys
    pub fn holding(held: SwingIntent) -> Self {
        Self::new(held, SwingIntent::empty())
    }

    /// Returns true if no key is held or pressed
    pub fn is_empty(&self) -> bool {
        self.held.is_empty() && self.pressed.is_empty()
    }
}

/// The running game core: the avatar rig, the ball and the camera.
///
/// Created by [`TennisCore::init`] and torn down by [`TennisCore::shutdown`].
/// The engine and the phase store are borrowed by every call and never owned.
#[derive(Debug)]
pub struct TennisCore {
    config: TennisConfig,
    rig: BodyRig,
    swing: SwingStateMachine,
    locomotion: Locomotion,
    ball: BallFlightController,
    camera: CameraFollow,
    player_subscription: SubscriptionId,
}

impl TennisCore {
    /// Creates the ball and the avatar and subscribes both controllers.
    ///
    /// On error every body already created is removed again and no
    /// subscription is left behind.
    pub fn init<E: PhysicsEngine>(engine: &mut E, config: TennisConfig, phases: &mut PhaseStore) -> Result<Self> {
        config.validate()?;

        let ball_desc = BodyDesc::dynamic(BodyShape::Ball {
            radius: config.ball.diameter * 0.5,
        })
        .with_material(Material::new(
            config.ball_density,
            config.ball.friction,
            config.ball.restitution,
        ))
        .with_damping(config.linear_damping, config.angular_damping)
        .with_translation(config.ball_home());
        let ball = engine.create_rigid_body(&ball_desc)?;

        let rig = match BodyRig::build(engine, &RigBlueprint::humanoid(&config)) {
            Ok(rig) => rig,
            Err(err) => {
                if let Err(cleanup) = engine.remove_rigid_body(ball) {
                    log::warn!("failed to remove ball during rollback: {}", cleanup);
                }
                return Err(err);
            }
        };

        let player_subscription = phases.subscribe();
        let ball_subscription = phases.subscribe();

        log::info!("tennis core ready, {} bodies created", 1 + crate::player::BodySlot::COUNT);

        Ok(Self {
            rig,
            swing: SwingStateMachine::new(),
            locomotion: Locomotion::new(&config),
            ball: BallFlightController::new(ball, ball_subscription, &config),
            camera: CameraFollow::new(&config),
            player_subscription,
            config,
        })
    }

    pub fn config(&self) -> &TennisConfig {
        &self.config
    }

    pub fn rig(&self) -> &BodyRig {
        &self.rig
    }

    pub fn ball(&self) -> BodyHandle {
        self.ball.ball()
    }

    pub fn ball_state(&self) -> FlightState {
        self.ball.state()
    }

    pub fn camera(&self) -> CameraPose {
        self.camera.pose()
    }

    /// Advances the controllers by one physics tick. Call before the
    /// engine steps.
    pub fn physics_step<E: PhysicsEngine>(
        &mut self,
        engine: &mut E,
        phases: &mut PhaseStore,
        input: InputFrame,
        delta: f32,
    ) -> Result<()> {
        if !input.is_empty() {
            phases.start();
        }

        while let Some(transition) = phases.next_transition(self.player_subscription) {
            if transition.to == MatchPhase::Ready {
                self.locomotion.rehome(engine, &self.rig)?;
            }
        }

        self.swing.apply(engine, &mut self.rig, input.held, delta)?;

        self.locomotion.drive(engine, &self.rig, input.held, delta)?;
        if input.pressed.jump() {
            self.locomotion.jump(engine, &self.rig)?;
        }

        let root = self.rig.sync_followers(engine)?;

        self.ball.step(engine, phases, input.pressed.serve())?;

        if let Some(trigger) = self.locomotion.check_bounds(&self.rig, root) {
            phases.fire(trigger);
        }
        Ok(())
    }

    /// Updates the camera from the root's final transform for this frame
    pub fn render_frame<E: PhysicsEngine>(&mut self, engine: &E, delta: f32) -> Result<CameraPose> {
        let root = engine.translation(self.rig.root())?;
        Ok(self.camera.update(root, delta))
    }

    /// Unsubscribes both controllers and removes every body and joint the
    /// core created
    pub fn shutdown<E: PhysicsEngine>(self, engine: &mut E, phases: &mut PhaseStore) -> Result<()> {
        let unsubscribed = phases
            .unsubscribe(self.player_subscription)
            .and(phases.unsubscribe(self.ball.subscription()));
        let released = self.rig.release(engine);
        let removed = engine.remove_rigid_body(self.ball.ball());
        log::info!("tennis core shut down");
        unsubscribed.and(released).and(removed)
    }
}
