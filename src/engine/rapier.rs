//! [`PhysicsEngine`] backed by `rapier3d`.
//!
//! Crate handles map onto rapier's arena handles through two tables; rapier
//! types never leave this module.

use std::collections::HashMap;

use rapier3d::na::{Quaternion as RapierQuaternion, UnitQuaternion};
use rapier3d::parry::query::RayCast;
use rapier3d::prelude::*;

use crate::engine::{require_finite, BodyDesc, BodyHandle, BodyShape, JointHandle, PhysicsEngine, RayHit, RigidBodyType as BodyKind};
use crate::error::TennisError;
use crate::math::{Quaternion, Ray, Vector3, EPSILON};
use crate::Result;

/// Configuration of a [`RapierWorld`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct RapierConfig {
    /// Fixed solver step
    pub time_step: f32,

    /// Maximum number of solver steps per call to [`RapierWorld::step`]
    pub max_substeps: u32,

    /// Constant gravity acceleration
    pub gravity: Vector3,

    /// Height of the court half-space, or `None` for no ground
    pub ground_height: Option<f32>,

    /// Friction of the court surface
    pub ground_friction: f32,

    /// Restitution of the court surface
    pub ground_restitution: f32,

    /// Solver iterations per step
    pub solver_iterations: u32,
}

impl Default for RapierConfig {
    fn default() -> Self {
        Self {
            time_step: 1.0 / 60.0,
            max_substeps: 10,
            gravity: Vector3::new(0.0, -9.81, 0.0),
            ground_height: Some(0.0),
            ground_friction: 1.0,
            ground_restitution: 0.5,
            solver_iterations: 4,
        }
    }
}

impl RapierConfig {
    /// No gravity and no ground
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
        if self.max_substeps == 0 || self.solver_iterations == 0 {
            return Err(TennisError::InvalidParameter(
                "max_substeps and solver_iterations must be at least 1".to_string(),
            ));
        }
        require_finite("gravity", self.gravity)?;
        if !self.ground_height.map_or(true, f32::is_finite) {
            return Err(TennisError::InvalidParameter("ground height must be finite".to_string()));
        }
        if !(self.ground_friction >= 0.0 && self.ground_restitution >= 0.0) {
            return Err(TennisError::InvalidParameter(
                "ground friction and restitution must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// A joint as rapier knows it, plus the bodies it connects
#[derive(Debug, Clone, Copy)]
struct JointEntry {
    handle: ImpulseJointHandle,
    body_a: BodyHandle,
    body_b: BodyHandle,
}

/// A `rapier3d` pipeline with an optional court half-space
pub struct RapierWorld {
    config: RapierConfig,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,

    handle_to_body: HashMap<BodyHandle, RigidBodyHandle>,
    body_to_handle: HashMap<RigidBodyHandle, BodyHandle>,
    joints: HashMap<JointHandle, JointEntry>,
    next_body_handle: u32,
    next_joint_handle: u32,
    time: f32,
}

impl RapierWorld {
    /// Creates a world with default settings
    pub fn new() -> Self {
        Self::build(RapierConfig::default())
    }

    /// Creates a world with the given configuration
    pub fn with_config(config: RapierConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: RapierConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.time_step;
        if let Some(iterations) = std::num::NonZeroUsize::new(config.solver_iterations as usize) {
            integration_parameters.num_solver_iterations = iterations;
        }

        let mut collider_set = ColliderSet::new();
        if let Some(height) = config.ground_height {
            let ground = ColliderBuilder::halfspace(Vector::y_axis())
                .translation(vector![0.0, height, 0.0])
                .friction(config.ground_friction)
                .restitution(config.ground_restitution)
                .build();
            collider_set.insert(ground);
        }

        Self {
            gravity: to_rapier(config.gravity),
            config,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set,
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            handle_to_body: HashMap::new(),
            body_to_handle: HashMap::new(),
            joints: HashMap::new(),
            next_body_handle: 1,
            next_joint_handle: 1,
            time: 0.0,
        }
    }

    pub fn config(&self) -> &RapierConfig {
        &self.config
    }

    /// Total simulated time
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn body_count(&self) -> usize {
        self.handle_to_body.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Force currently accumulated on a body
    pub fn accumulated_force(&self, body: BodyHandle) -> Result<Vector3> {
        Ok(from_rapier(&self.body(body)?.user_force()))
    }

    /// Advances the world by `time_step`, split into fixed solver steps
    pub fn step(&mut self, time_step: f32) {
        if !(time_step.is_finite() && time_step > 0.0) {
            log::debug!("ignoring rapier step of {time_step}");
            return;
        }

        let mut remaining_time = time_step;
        let mut steps = 0;
        while remaining_time > 0.0 && steps < self.config.max_substeps {
            self.integration_parameters.dt = self.config.time_step.min(remaining_time);
            self.physics_pipeline.step(
                &self.gravity,
                &self.integration_parameters,
                &mut self.island_manager,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.rigid_body_set,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                &mut self.ccd_solver,
                None,
                &(),
                &(),
            );
            remaining_time -= self.integration_parameters.dt;
            steps += 1;
        }
        if remaining_time > 0.0 {
            log::debug!("substep budget exhausted, dropping {remaining_time}s");
        }

        self.time += time_step;
    }

    fn rapier_handle(&self, body: BodyHandle) -> Result<RigidBodyHandle> {
        self.handle_to_body
            .get(&body)
            .copied()
            .ok_or_else(|| TennisError::ResourceNotFound(format!("{:?} not found", body)))
    }

    fn body(&self, body: BodyHandle) -> Result<&RigidBody> {
        let handle = self.rapier_handle(body)?;
        self.rigid_body_set
            .get(handle)
            .ok_or_else(|| TennisError::ResourceNotFound(format!("{:?} not found", body)))
    }

    fn body_mut(&mut self, body: BodyHandle) -> Result<&mut RigidBody> {
        let handle = self.rapier_handle(body)?;
        self.rigid_body_set
            .get_mut(handle)
            .ok_or_else(|| TennisError::ResourceNotFound(format!("{:?} not found", body)))
    }

    fn joint_mut(&mut self, joint: JointHandle) -> Result<&mut ImpulseJoint> {
        let entry = self
            .joints
            .get(&joint)
            .copied()
            .ok_or_else(|| TennisError::ResourceNotFound(format!("{:?} not found", joint)))?;
        self.impulse_joint_set
            .get_mut(entry.handle)
            .ok_or_else(|| TennisError::ResourceNotFound(format!("{:?} not found", joint)))
    }
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RapierWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("RapierWorld")
            .field("config", &self.config)
            .field("bodies", &self.handle_to_body.len())
            .field("joints", &self.joints.len())
            .field("time", &self.time)
            .finish()
    }
}

fn to_rapier(v: Vector3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn from_rapier(v: &Vector<Real>) -> Vector3 {
    Vector3::new(v.x, v.y, v.z)
}

fn collider_for(desc: &BodyDesc) -> Collider {
    let builder = match desc.shape {
        BodyShape::Ball { radius } => ColliderBuilder::ball(radius),
        BodyShape::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
    };
    let builder = builder
        .density(desc.material.density)
        .friction(desc.material.friction)
        .restitution(desc.material.restitution);

    match desc.collision_group {
        Some(group) => {
            let member = Group::from_bits_truncate(1u32 << (group % 32));
            builder
                .collision_groups(InteractionGroups::new(member, Group::ALL.difference(member)))
                .build()
        }
        None => builder.build(),
    }
}

impl PhysicsEngine for RapierWorld {
    fn create_rigid_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle> {
        if !desc.shape.is_valid() {
            return Err(TennisError::InvalidParameter(format!("invalid body shape {:?}", desc.shape)));
        }
        require_finite("translation", desc.translation)?;

        let body_type = match desc.body_type {
            BodyKind::Dynamic => RigidBodyType::Dynamic,
            BodyKind::Kinematic => RigidBodyType::KinematicPositionBased,
            BodyKind::Static => RigidBodyType::Fixed,
        };
        let body = RigidBodyBuilder::new(body_type)
            .translation(to_rapier(desc.translation))
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .build();

        let rapier_handle = self.rigid_body_set.insert(body);
        self.collider_set
            .insert_with_parent(collider_for(desc), rapier_handle, &mut self.rigid_body_set);
        // Impulses applied before the first step need the collider's mass.
        if let Some(body) = self.rigid_body_set.get_mut(rapier_handle) {
            body.recompute_mass_properties_from_colliders(&self.collider_set);
        }

        let handle = BodyHandle(self.next_body_handle);
        self.next_body_handle += 1;
        self.handle_to_body.insert(handle, rapier_handle);
        self.body_to_handle.insert(rapier_handle, handle);
        Ok(handle)
    }

    fn remove_rigid_body(&mut self, body: BodyHandle) -> Result<()> {
        let rapier_handle = self.rapier_handle(body)?;
        self.rigid_body_set.remove(
            rapier_handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
        self.handle_to_body.remove(&body);
        self.body_to_handle.remove(&rapier_handle);
        // Rapier drops attached joints together with the body.
        self.joints
            .retain(|_, entry| entry.body_a != body && entry.body_b != body);
        Ok(())
    }

    fn attach_joint(
        &mut self,
        body_a: BodyHandle,
        body_b: BodyHandle,
        anchor_a: Vector3,
        anchor_b: Vector3,
        axis: Vector3,
    ) -> Result<JointHandle> {
        let rapier_a = self.rapier_handle(body_a)?;
        let rapier_b = self.rapier_handle(body_b)?;
        if body_a == body_b {
            return Err(TennisError::InvalidParameter("cannot join a body to itself".to_string()));
        }
        require_finite("anchor", anchor_a)?;
        require_finite("anchor", anchor_b)?;
        if !axis.is_finite() || axis.length() < EPSILON {
            return Err(TennisError::InvalidParameter(format!("joint axis {axis} is degenerate")));
        }

        let joint = RevoluteJointBuilder::new(UnitVector::new_normalize(to_rapier(axis)))
            .local_anchor1(point![anchor_a.x, anchor_a.y, anchor_a.z])
            .local_anchor2(point![anchor_b.x, anchor_b.y, anchor_b.z])
            .contacts_enabled(false)
            .build();
        let rapier_handle = self.impulse_joint_set.insert(rapier_a, rapier_b, joint, true);

        let handle = JointHandle(self.next_joint_handle);
        self.next_joint_handle += 1;
        self.joints.insert(
            handle,
            JointEntry {
                handle: rapier_handle,
                body_a,
                body_b,
            },
        );
        Ok(handle)
    }

    fn remove_joint(&mut self, joint: JointHandle) -> Result<()> {
        let entry = self
            .joints
            .remove(&joint)
            .ok_or_else(|| TennisError::ResourceNotFound(format!("{:?} not found", joint)))?;
        self.impulse_joint_set.remove(entry.handle, true);
        Ok(())
    }

    fn configure_motor_position(&mut self, joint: JointHandle, target: f32, stiffness: f32, damping: f32) -> Result<()> {
        self.joint_mut(joint)?.data.set_motor_position(
            JointAxis::AngX,
            target,
            stiffness.max(0.0),
            damping.max(0.0),
        );
        Ok(())
    }

    fn configure_motor_velocity(&mut self, joint: JointHandle, target_velocity: f32, damping: f32) -> Result<()> {
        self.joint_mut(joint)?
            .data
            .set_motor_velocity(JointAxis::AngX, target_velocity, damping.max(0.0));
        Ok(())
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vector3) -> Result<()> {
        require_finite("impulse", impulse)?;
        self.body_mut(body)?.apply_impulse(to_rapier(impulse), true);
        Ok(())
    }

    fn apply_impulse_at_point(&mut self, body: BodyHandle, impulse: Vector3, point: Vector3) -> Result<()> {
        require_finite("impulse", impulse)?;
        require_finite("point", point)?;
        self.body_mut(body)?
            .apply_impulse_at_point(to_rapier(impulse), point![point.x, point.y, point.z], true);
        Ok(())
    }

    fn apply_torque_impulse(&mut self, body: BodyHandle, torque_impulse: Vector3) -> Result<()> {
        require_finite("torque impulse", torque_impulse)?;
        self.body_mut(body)?.apply_torque_impulse(to_rapier(torque_impulse), true);
        Ok(())
    }

    fn cast_ray(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        let length = ray.direction.length();
        if !(length > EPSILON && ray.origin.is_finite() && max_distance >= 0.0) {
            return None;
        }
        let rapier_ray = rapier3d::prelude::Ray::new(
            point![ray.origin.x, ray.origin.y, ray.origin.z],
            to_rapier(ray.direction),
        );
        let max_toi = max_distance / length;

        // Poses are read from the bodies so teleports show up before the next step.
        let mut closest: Option<RayHit> = None;
        for (_, collider) in self.collider_set.iter() {
            let (pose, owner) = match collider.parent() {
                Some(parent) => {
                    let Some(body) = self.rigid_body_set.get(parent) else {
                        continue;
                    };
                    if body.is_dynamic() {
                        continue;
                    }
                    (*body.position(), self.body_to_handle.get(&parent).copied())
                }
                None => (*collider.position(), None),
            };

            if let Some(toi) = collider.shape().cast_ray(&pose, &rapier_ray, max_toi, true) {
                if closest.map_or(true, |hit| toi < hit.time_of_impact) {
                    closest = Some(RayHit {
                        body: owner,
                        time_of_impact: toi,
                    });
                }
            }
        }
        closest
    }

    fn translation(&self, body: BodyHandle) -> Result<Vector3> {
        Ok(from_rapier(self.body(body)?.translation()))
    }

    fn linear_velocity(&self, body: BodyHandle) -> Result<Vector3> {
        Ok(from_rapier(self.body(body)?.linvel()))
    }

    fn angular_velocity(&self, body: BodyHandle) -> Result<Vector3> {
        Ok(from_rapier(self.body(body)?.angvel()))
    }

    fn rotation(&self, body: BodyHandle) -> Result<Quaternion> {
        let rotation = self.body(body)?.rotation();
        Ok(Quaternion::new(rotation.w, rotation.i, rotation.j, rotation.k))
    }

    fn set_translation(&mut self, body: BodyHandle, translation: Vector3) -> Result<()> {
        require_finite("translation", translation)?;
        self.body_mut(body)?.set_translation(to_rapier(translation), true);
        Ok(())
    }

    fn set_rotation(&mut self, body: BodyHandle, rotation: Quaternion) -> Result<()> {
        if !rotation.is_finite() {
            return Err(TennisError::InvalidParameter(format!("rotation must be finite, got {rotation}")));
        }
        let rotation = rotation.normalize();
        let unit = UnitQuaternion::from_quaternion(RapierQuaternion::new(rotation.w, rotation.x, rotation.y, rotation.z));
        self.body_mut(body)?.set_rotation(unit, true);
        Ok(())
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vector3) -> Result<()> {
        require_finite("velocity", velocity)?;
        self.body_mut(body)?.set_linvel(to_rapier(velocity), true);
        Ok(())
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, velocity: Vector3) -> Result<()> {
        require_finite("angular velocity", velocity)?;
        self.body_mut(body)?.set_angvel(to_rapier(velocity), true);
        Ok(())
    }

    fn set_next_kinematic_translation(&mut self, body: BodyHandle, translation: Vector3) -> Result<()> {
        require_finite("kinematic target", translation)?;
        let body = self.body_mut(body)?;
        if !body.is_kinematic() {
            return Err(TennisError::InvalidParameter(
                "kinematic targets only apply to kinematic bodies".to_string(),
            ));
        }
        body.set_next_kinematic_translation(to_rapier(translation));
        Ok(())
    }

    fn reset_forces(&mut self, body: BodyHandle) -> Result<()> {
        self.body_mut(body)?.reset_forces(true);
        Ok(())
    }

    fn add_force(&mut self, body: BodyHandle, force: Vector3) -> Result<()> {
        require_finite("force", force)?;
        self.body_mut(body)?.add_force(to_rapier(force), true);
        Ok(())
    }

    fn wake_up(&mut self, body: BodyHandle) -> Result<()> {
        self.body_mut(body)?.wake_up(true);
        Ok(())
    }
}
