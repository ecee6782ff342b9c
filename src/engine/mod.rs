//! The physics-engine boundary.
//!
//! The controllers in this crate never own bodies. They hold `Copy` handles
//! and borrow an engine implementing [`PhysicsEngine`] for the duration of a
//! single call. With the `rapier` feature (on by default), [`RapierWorld`]
//! implements the trait on `rapier3d`. The [`crate::sandbox`] module is a
//! small deterministic stand-in used by tests.

mod body_type;
mod material;
mod desc;
#[cfg(feature = "rapier")]
mod rapier;

pub use self::body_type::RigidBodyType;
pub use self::material::Material;
pub use self::desc::{BodyDesc, BodyShape};
#[cfg(feature = "rapier")]
pub use self::rapier::{RapierConfig, RapierWorld};

use crate::error::TennisError;
use crate::math::{Quaternion, Ray, Vector3};
use crate::Result;

/// A unique identifier for a body owned by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u32);

/// A unique identifier for a joint owned by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointHandle(pub u32);

/// The result of a successful ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The body that was hit, or `None` for static world geometry
    pub body: Option<BodyHandle>,

    /// Hit parameter in units of the ray direction length
    pub time_of_impact: f32,
}

/// Operations the controllers need from a rigid-body/joint solver.
///
/// Writes take effect immediately on the body's velocity (impulses) or are
/// held until the next solver step (forces, kinematic targets). Forces added
/// with [`PhysicsEngine::add_force`] persist across steps until
/// [`PhysicsEngine::reset_forces`] is called.
pub trait PhysicsEngine {
    /// Creates a rigid body and returns its handle
    fn create_rigid_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle>;

    /// Removes a body together with any joint attached to it
    fn remove_rigid_body(&mut self, body: BodyHandle) -> Result<()>;

    /// Connects two bodies with a revolute joint rotating about `axis`
    /// (expressed in `body_a`'s local frame)
    fn attach_joint(
        &mut self,
        body_a: BodyHandle,
        body_b: BodyHandle,
        anchor_a: Vector3,
        anchor_b: Vector3,
        axis: Vector3,
    ) -> Result<JointHandle>;

    /// Removes a joint
    fn remove_joint(&mut self, joint: JointHandle) -> Result<()>;

    /// Drives the joint towards a target angle
    fn configure_motor_position(
        &mut self,
        joint: JointHandle,
        target: f32,
        stiffness: f32,
        damping: f32,
    ) -> Result<()>;

    /// Drives the joint towards a target angular velocity
    fn configure_motor_velocity(
        &mut self,
        joint: JointHandle,
        target_velocity: f32,
        damping: f32,
    ) -> Result<()>;

    /// Applies a linear impulse at the centre of mass
    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vector3) -> Result<()>;

    /// Applies a linear impulse at a world-space point
    fn apply_impulse_at_point(
        &mut self,
        body: BodyHandle,
        impulse: Vector3,
        point: Vector3,
    ) -> Result<()>;

    /// Applies an angular impulse
    fn apply_torque_impulse(&mut self, body: BodyHandle, torque_impulse: Vector3) -> Result<()>;

    /// Casts a ray against static and kinematic geometry and returns the
    /// closest hit within `max_distance`. Dynamic bodies are transparent, so
    /// a probe starting inside the body it belongs to still sees the ground.
    fn cast_ray(&self, ray: &Ray, max_distance: f32) -> Option<RayHit>;

    /// World-space translation of the body
    fn translation(&self, body: BodyHandle) -> Result<Vector3>;

    /// Linear velocity of the body
    fn linear_velocity(&self, body: BodyHandle) -> Result<Vector3>;

    /// Angular velocity of the body
    fn angular_velocity(&self, body: BodyHandle) -> Result<Vector3>;

    /// World-space orientation of the body
    fn rotation(&self, body: BodyHandle) -> Result<Quaternion>;

    /// Teleports the body
    fn set_translation(&mut self, body: BodyHandle, translation: Vector3) -> Result<()>;

    /// Overwrites the orientation
    fn set_rotation(&mut self, body: BodyHandle, rotation: Quaternion) -> Result<()>;

    /// Overwrites the linear velocity
    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vector3) -> Result<()>;

    /// Overwrites the angular velocity
    fn set_angular_velocity(&mut self, body: BodyHandle, velocity: Vector3) -> Result<()>;

    /// Sets the translation a kinematic body reaches at the end of the next step
    fn set_next_kinematic_translation(&mut self, body: BodyHandle, translation: Vector3) -> Result<()>;

    /// Clears every force accumulated on the body
    fn reset_forces(&mut self, body: BodyHandle) -> Result<()>;

    /// Adds a force that persists until the next [`PhysicsEngine::reset_forces`]
    fn add_force(&mut self, body: BodyHandle, force: Vector3) -> Result<()>;

    /// Keeps the body from sleeping
    fn wake_up(&mut self, body: BodyHandle) -> Result<()>;
}

/// Rejects vectors carrying NaN or infinity before they reach a solver
pub(crate) fn require_finite(name: &str, value: Vector3) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TennisError::InvalidParameter(format!("{name} must be finite, got {value}")))
    }
}

/// Casts a ground probe straight down from `origin` and returns its time of impact
pub fn probe_ground<E: PhysicsEngine + ?Sized>(engine: &E, origin: Vector3) -> Option<f32> {
    engine
        .cast_ray(&Ray::downward(origin), crate::config::GROUND_PROBE_DISTANCE)
        .map(|hit| hit.time_of_impact)
}

/// Returns true if a probe from `origin` hits within the ground threshold
pub fn is_grounded<E: PhysicsEngine + ?Sized>(engine: &E, origin: Vector3) -> bool {
    probe_ground(engine, origin)
        .map_or(false, |toi| toi < crate::config::GROUND_PROBE_THRESHOLD)
}
