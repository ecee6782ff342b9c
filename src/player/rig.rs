use crate::engine::{BodyHandle, JointHandle, PhysicsEngine};
use crate::error::TennisError;
use crate::math::{Quaternion, Vector3};
use crate::Result;

use super::blueprint::{BodySlot, FollowerSpec, JointId, RigBlueprint};

/// Motor drive last written to a joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotorCommand {
    /// Spring towards a target angle
    Position {
        target: f32,
        stiffness: f32,
        damping: f32,
    },

    /// Damped drive towards a target angular velocity
    Velocity { target_velocity: f32, damping: f32 },
}

impl MotorCommand {
    /// Absolute value of the target angle or velocity
    pub fn target_magnitude(&self) -> f32 {
        match *self {
            MotorCommand::Position { target, .. } => target.abs(),
            MotorCommand::Velocity { target_velocity, .. } => target_velocity.abs(),
        }
    }

    fn is_finite(&self) -> bool {
        match *self {
            MotorCommand::Position {
                target,
                stiffness,
                damping,
            } => target.is_finite() && stiffness.is_finite() && damping.is_finite(),
            MotorCommand::Velocity {
                target_velocity,
                damping,
            } => target_velocity.is_finite() && damping.is_finite(),
        }
    }
}

/// A joint handle together with the drive last written to it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointMotor {
    pub handle: JointHandle,
    pub command: Option<MotorCommand>,
}

/// The avatar's bodies and joints as they live in the engine.
///
/// Slots are resolved once at build time; afterwards every access is an
/// array lookup by [`BodySlot`] or [`JointId`].
#[derive(Debug, Clone)]
pub struct BodyRig {
    bodies: [BodyHandle; BodySlot::COUNT],
    joints: [JointMotor; JointId::COUNT],
    followers: Vec<FollowerSpec>,
    /// Build-time translation of each body relative to the root
    placements: [Vector3; BodySlot::COUNT],
}

impl BodyRig {
    /// Validates the blueprint and creates its bodies and joints.
    ///
    /// Nothing is left behind in the engine when validation or creation fails.
    pub fn build<E: PhysicsEngine>(engine: &mut E, blueprint: &RigBlueprint) -> Result<Self> {
        blueprint.validate()?;

        let mut created: Vec<(BodySlot, BodyHandle)> = Vec::with_capacity(BodySlot::COUNT);
        let mut attached: Vec<(JointId, JointHandle)> = Vec::with_capacity(JointId::COUNT);

        let outcome = (|| -> Result<()> {
            for spec in &blueprint.bodies {
                let handle = engine.create_rigid_body(&spec.desc)?;
                created.push((spec.slot, handle));
            }
            let lookup = |slot: BodySlot| {
                created
                    .iter()
                    .find(|(bound, _)| *bound == slot)
                    .map(|(_, handle)| *handle)
                    .ok_or(TennisError::MissingBody(slot))
            };
            for joint in &blueprint.joints {
                let parent = lookup(joint.parent)?;
                let child = lookup(joint.child)?;
                let handle = engine.attach_joint(
                    parent,
                    child,
                    joint.anchor_parent,
                    joint.anchor_child,
                    joint.axis.normalize(),
                )?;
                attached.push((joint.id, handle));
            }
            Ok(())
        })();

        if let Err(err) = outcome {
            log::warn!("rig build failed, removing {} bodies: {}", created.len(), err);
            for (id, handle) in attached.iter().rev() {
                if let Err(cleanup) = engine.remove_joint(*handle) {
                    log::warn!("failed to remove joint `{}` during rollback: {}", id, cleanup);
                }
            }
            for (slot, handle) in created.iter().rev() {
                if let Err(cleanup) = engine.remove_rigid_body(*handle) {
                    log::warn!("failed to remove body `{}` during rollback: {}", slot, cleanup);
                }
            }
            return Err(err);
        }

        let mut bodies = [BodyHandle(0); BodySlot::COUNT];
        for (slot, handle) in created {
            bodies[slot.index()] = handle;
        }
        let root_at = blueprint
            .body(BodySlot::Legs)
            .map_or(Vector3::zero(), |spec| spec.desc.translation);
        let mut placements = [Vector3::zero(); BodySlot::COUNT];
        for spec in &blueprint.bodies {
            placements[spec.slot.index()] = spec.desc.translation - root_at;
        }
        for follower in &blueprint.followers {
            placements[follower.slot.index()] = follower.offset;
        }
        let mut joints = [JointMotor {
            handle: JointHandle(0),
            command: None,
        }; JointId::COUNT];
        for (id, handle) in attached {
            joints[id.index()].handle = handle;
        }

        log::debug!(
            "built rig with {} bodies and {} joints",
            BodySlot::COUNT,
            JointId::COUNT
        );

        Ok(Self {
            bodies,
            joints,
            followers: blueprint.followers.clone(),
            placements,
        })
    }

    /// Handle of the body bound to `slot`
    #[inline]
    pub fn body(&self, slot: BodySlot) -> BodyHandle {
        self.bodies[slot.index()]
    }

    /// The root body every follower tracks
    #[inline]
    pub fn root(&self) -> BodyHandle {
        self.body(BodySlot::Legs)
    }

    /// Handle of the joint `id`
    #[inline]
    pub fn joint(&self, id: JointId) -> JointHandle {
        self.joints[id.index()].handle
    }

    /// Drive last written to joint `id`, if any
    #[inline]
    pub fn motor(&self, id: JointId) -> Option<MotorCommand> {
        self.joints[id.index()].command
    }

    /// World-space offsets of the kinematic followers
    pub fn followers(&self) -> &[FollowerSpec] {
        &self.followers
    }

    /// Build-time offset of `slot` from the root
    #[inline]
    pub fn placement(&self, slot: BodySlot) -> Vector3 {
        self.placements[slot.index()]
    }

    fn is_follower(&self, slot: BodySlot) -> bool {
        self.followers.iter().any(|follower| follower.slot == slot)
    }

    /// Sets a position drive on joint `id`
    pub fn set_motor_position<E: PhysicsEngine>(
        &mut self,
        engine: &mut E,
        id: JointId,
        target: f32,
        stiffness: f32,
        damping: f32,
    ) -> Result<()> {
        self.drive(
            engine,
            id,
            MotorCommand::Position {
                target,
                stiffness,
                damping,
            },
        )
    }

    /// Sets a velocity drive on joint `id`
    pub fn set_motor_velocity<E: PhysicsEngine>(
        &mut self,
        engine: &mut E,
        id: JointId,
        target_velocity: f32,
        damping: f32,
    ) -> Result<()> {
        self.drive(
            engine,
            id,
            MotorCommand::Velocity {
                target_velocity,
                damping,
            },
        )
    }

    fn drive<E: PhysicsEngine>(
        &mut self,
        engine: &mut E,
        id: JointId,
        command: MotorCommand,
    ) -> Result<()> {
        if !command.is_finite() {
            return Err(TennisError::InvalidParameter(format!(
                "non-finite motor command for joint `{id}`"
            )));
        }

        let motor = &mut self.joints[id.index()];
        match command {
            MotorCommand::Position {
                target,
                stiffness,
                damping,
            } => engine.configure_motor_position(motor.handle, target, stiffness, damping)?,
            MotorCommand::Velocity {
                target_velocity,
                damping,
            } => engine.configure_motor_velocity(motor.handle, target_velocity, damping)?,
        }
        motor.command = Some(command);
        Ok(())
    }

    /// Moves every kinematic follower to the root's translation plus its
    /// offset and returns that root translation.
    pub fn sync_followers<E: PhysicsEngine>(&self, engine: &mut E) -> Result<Vector3> {
        let root = engine.translation(self.root())?;
        for follower in &self.followers {
            engine.set_next_kinematic_translation(self.body(follower.slot), root + follower.offset)?;
        }
        Ok(root)
    }

    /// Teleports the whole avatar back into its build-time pose around
    /// `home`: every body unrotated and at rest, followers retargeted.
    pub fn rehome<E: PhysicsEngine>(&self, engine: &mut E, home: Vector3) -> Result<()> {
        for slot in BodySlot::ALL {
            let body = self.body(slot);
            let at = home + self.placement(slot);
            engine.set_translation(body, at)?;
            engine.set_rotation(body, Quaternion::identity())?;
            if self.is_follower(slot) {
                engine.set_next_kinematic_translation(body, at)?;
            } else {
                engine.set_linear_velocity(body, Vector3::zero())?;
                engine.set_angular_velocity(body, Vector3::zero())?;
            }
        }
        Ok(())
    }

    /// Removes every joint and body of the rig from the engine.
    ///
    /// Every removal is attempted; the first failure is returned.
    pub fn release<E: PhysicsEngine>(self, engine: &mut E) -> Result<()> {
        let mut first_error = None;
        for (id, motor) in JointId::ALL.iter().zip(self.joints.iter()).rev() {
            if let Err(err) = engine.remove_joint(motor.handle) {
                log::warn!("failed to remove joint `{}`: {}", id, err);
                first_error.get_or_insert(err);
            }
        }
        for (slot, body) in BodySlot::ALL.iter().zip(self.bodies.iter()).rev() {
            if let Err(err) = engine.remove_rigid_body(*body) {
                log::warn!("failed to remove body `{}`: {}", slot, err);
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
