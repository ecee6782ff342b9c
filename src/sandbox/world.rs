use crate::engine::{require_finite, BodyDesc, BodyHandle, JointHandle, PhysicsEngine, RayHit};
use crate::error::TennisError;
use crate::math::{Quaternion, Ray, Vector3};
use crate::Result;

use super::body::SandboxBody;
use super::config::SandboxConfig;
use super::joint::{JointDrive, RevoluteJoint};
use super::storage::Storage;

/// A minimal rigid-body world: gravity, damping, a ground plane and
/// motorized revolute joints. Bodies only collide with the ground.
#[derive(Debug, Clone)]
pub struct SandboxWorld {
    bodies: Storage<BodyHandle, SandboxBody>,
    joints: Storage<JointHandle, RevoluteJoint>,
    config: SandboxConfig,
    time: f32,
}

impl Default for SandboxWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxWorld {
    /// Creates a world with default settings
    pub fn new() -> Self {
        Self {
            bodies: Storage::new(),
            joints: Storage::new(),
            config: SandboxConfig::default(),
            time: 0.0,
        }
    }

    /// Creates a world with the given configuration
    pub fn with_config(config: SandboxConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Total simulated time
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn body(&self, handle: BodyHandle) -> Result<&SandboxBody> {
        self.bodies.get(handle)
    }

    pub fn joint(&self, handle: JointHandle) -> Result<&RevoluteJoint> {
        self.joints.get(handle)
    }

    /// Current hinge angle of a joint
    pub fn joint_angle(&self, handle: JointHandle) -> Result<f32> {
        Ok(self.joints.get(handle)?.angle)
    }

    /// Relative angular velocity of a joint's bodies about its hinge axis
    pub fn joint_velocity(&self, handle: JointHandle) -> Result<f32> {
        let joint = self.joints.get(handle)?;
        Ok(joint.relative_velocity(self.bodies.get(joint.body_a)?, self.bodies.get(joint.body_b)?))
    }

    /// Pending kinematic target of a body, if one was set since the last step
    pub fn kinematic_target(&self, handle: BodyHandle) -> Result<Option<Vector3>> {
        Ok(self.bodies.get(handle)?.kinematic_target)
    }

    /// Accumulated force on a body
    pub fn accumulated_force(&self, handle: BodyHandle) -> Result<Vector3> {
        Ok(self.bodies.get(handle)?.force)
    }

    /// Advances the world by `time_step`, split into fixed substeps
    pub fn step(&mut self, time_step: f32) {
        if !(time_step.is_finite() && time_step > 0.0) {
            log::debug!("ignoring sandbox step of {time_step}");
            return;
        }

        // Kinematic bodies move linearly to their target over the whole step.
        for (_, body) in self.bodies.iter_mut() {
            if let Some(target) = body.kinematic_target {
                body.linear_velocity = (target - body.position) / time_step;
            }
        }

        let fixed_step = self.config.time_step;
        let mut remaining_time = time_step;
        let mut steps = 0;
        while remaining_time > 0.0 && steps < self.config.max_substeps {
            let dt = fixed_step.min(remaining_time);
            self.step_simulation(dt);
            remaining_time -= dt;
            steps += 1;
        }
        if remaining_time > 0.0 {
            log::debug!("substep budget exhausted, dropping {remaining_time}s");
        }

        for (_, body) in self.bodies.iter_mut() {
            if let Some(target) = body.kinematic_target.take() {
                body.position = target;
                body.linear_velocity = Vector3::zero();
            }
        }

        self.time += time_step;
    }

    fn step_simulation(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        for (_, body) in self.bodies.iter_mut() {
            body.integrate_forces(gravity, dt);
        }

        for _ in 0..self.config.velocity_iterations {
            for (_, joint) in self.joints.iter() {
                solve_joint(&mut self.bodies, joint, dt, self.config.joint_bias_factor);
            }
        }

        for (_, body) in self.bodies.iter_mut() {
            body.integrate_velocity(dt);
            if let Some(ground) = self.config.ground_height {
                body.resolve_ground(ground, self.config.restitution_velocity_threshold);
            }
        }

        self.refresh_joint_angles();
    }

    fn refresh_joint_angles(&mut self) {
        for (_, joint) in self.joints.iter_mut() {
            if let (Ok(a), Ok(b)) = (self.bodies.get(joint.body_a), self.bodies.get(joint.body_b)) {
                joint.angle = joint.twist_angle(a, b);
            }
        }
    }
}

fn solve_joint(bodies: &mut Storage<BodyHandle, SandboxBody>, joint: &RevoluteJoint, dt: f32, bias_factor: f32) {
    let (mut a, mut b) = match (bodies.get(joint.body_a), bodies.get(joint.body_b)) {
        (Ok(a), Ok(b)) => (*a, *b),
        _ => return,
    };
    joint.solve_velocity(&mut a, &mut b, dt, bias_factor);
    if let Ok(body) = bodies.get_mut(joint.body_a) {
        body.linear_velocity = a.linear_velocity;
        body.angular_velocity = a.angular_velocity;
    }
    if let Ok(body) = bodies.get_mut(joint.body_b) {
        body.linear_velocity = b.linear_velocity;
        body.angular_velocity = b.angular_velocity;
    }
}

impl PhysicsEngine for SandboxWorld {
    fn create_rigid_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle> {
        if !desc.shape.is_valid() {
            return Err(TennisError::InvalidParameter(format!("invalid body shape {:?}", desc.shape)));
        }
        require_finite("translation", desc.translation)?;
        Ok(self.bodies.add(SandboxBody::from_desc(desc)))
    }

    fn remove_rigid_body(&mut self, body: BodyHandle) -> Result<()> {
        self.bodies.remove(body)?;
        let attached: Vec<JointHandle> = self
            .joints
            .iter()
            .filter(|(_, joint)| joint.involves(body))
            .map(|(handle, _)| handle)
            .collect();
        for handle in attached {
            self.joints.remove(handle)?;
        }
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
        self.bodies.get(body_a)?;
        self.bodies.get(body_b)?;
        if body_a == body_b {
            return Err(TennisError::InvalidParameter("cannot join a body to itself".to_string()));
        }
        require_finite("anchor", anchor_a)?;
        require_finite("anchor", anchor_b)?;
        if !axis.is_finite() || axis.is_zero() {
            return Err(TennisError::InvalidParameter(format!("joint axis {axis} is degenerate")));
        }
        Ok(self.joints.add(RevoluteJoint::new(body_a, body_b, anchor_a, anchor_b, axis)))
    }

    fn remove_joint(&mut self, joint: JointHandle) -> Result<()> {
        self.joints.remove(joint).map(|_| ())
    }

    fn configure_motor_position(&mut self, joint: JointHandle, target: f32, stiffness: f32, damping: f32) -> Result<()> {
        self.joints.get_mut(joint)?.drive = Some(JointDrive::Position {
            target,
            stiffness: stiffness.max(0.0),
            damping: damping.max(0.0),
        });
        Ok(())
    }

    fn configure_motor_velocity(&mut self, joint: JointHandle, target_velocity: f32, damping: f32) -> Result<()> {
        self.joints.get_mut(joint)?.drive = Some(JointDrive::Velocity {
            target_velocity,
            damping: damping.max(0.0),
        });
        Ok(())
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vector3) -> Result<()> {
        require_finite("impulse", impulse)?;
        self.bodies.get_mut(body)?.apply_impulse(impulse);
        Ok(())
    }

    fn apply_impulse_at_point(&mut self, body: BodyHandle, impulse: Vector3, point: Vector3) -> Result<()> {
        require_finite("impulse", impulse)?;
        require_finite("point", point)?;
        let body = self.bodies.get_mut(body)?;
        let r = point - body.position;
        body.apply_impulse_at(impulse, r);
        Ok(())
    }

    fn apply_torque_impulse(&mut self, body: BodyHandle, torque_impulse: Vector3) -> Result<()> {
        require_finite("torque impulse", torque_impulse)?;
        self.bodies.get_mut(body)?.apply_torque_impulse(torque_impulse);
        Ok(())
    }

    fn cast_ray(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        let ground = self.config.ground_height?;

        // The ground is a solid half-space.
        let toi = if ray.origin.y <= ground && ray.direction.y < 0.0 {
            0.0
        } else {
            ray.intersect_horizontal_plane(ground)?
        };

        if toi * ray.direction.length() <= max_distance {
            Some(RayHit {
                body: None,
                time_of_impact: toi,
            })
        } else {
            None
        }
    }

    fn translation(&self, body: BodyHandle) -> Result<Vector3> {
        Ok(self.bodies.get(body)?.position)
    }

    fn linear_velocity(&self, body: BodyHandle) -> Result<Vector3> {
        Ok(self.bodies.get(body)?.linear_velocity)
    }

    fn angular_velocity(&self, body: BodyHandle) -> Result<Vector3> {
        Ok(self.bodies.get(body)?.angular_velocity)
    }

    fn rotation(&self, body: BodyHandle) -> Result<Quaternion> {
        Ok(self.bodies.get(body)?.rotation)
    }

    fn set_translation(&mut self, body: BodyHandle, translation: Vector3) -> Result<()> {
        require_finite("translation", translation)?;
        self.bodies.get_mut(body)?.position = translation;
        Ok(())
    }

    fn set_rotation(&mut self, body: BodyHandle, rotation: Quaternion) -> Result<()> {
        if !rotation.is_finite() {
            return Err(TennisError::InvalidParameter(format!("rotation must be finite, got {rotation}")));
        }
        self.bodies.get_mut(body)?.rotation = rotation.normalize();
        self.refresh_joint_angles();
        Ok(())
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vector3) -> Result<()> {
        require_finite("velocity", velocity)?;
        self.bodies.get_mut(body)?.linear_velocity = velocity;
        Ok(())
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, velocity: Vector3) -> Result<()> {
        require_finite("angular velocity", velocity)?;
        self.bodies.get_mut(body)?.angular_velocity = velocity;
        Ok(())
    }

    fn set_next_kinematic_translation(&mut self, body: BodyHandle, translation: Vector3) -> Result<()> {
        require_finite("kinematic target", translation)?;
        let body = self.bodies.get_mut(body)?;
        if !body.body_type.is_kinematic() {
            return Err(TennisError::InvalidParameter(
                "kinematic targets only apply to kinematic bodies".to_string(),
            ));
        }
        body.kinematic_target = Some(translation);
        Ok(())
    }

    fn reset_forces(&mut self, body: BodyHandle) -> Result<()> {
        self.bodies.get_mut(body)?.force = Vector3::zero();
        Ok(())
    }

    fn add_force(&mut self, body: BodyHandle, force: Vector3) -> Result<()> {
        require_finite("force", force)?;
        self.bodies.get_mut(body)?.force += force;
        Ok(())
    }

    fn wake_up(&mut self, body: BodyHandle) -> Result<()> {
        // Sandbox bodies never sleep.
        self.bodies.get(body).map(|_| ())
    }
}
