use crate::engine::BodyHandle;
use crate::math::{Rotation, Vector3};

use super::body::SandboxBody;

/// Drive of a revolute joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointDrive {
    Position {
        target: f32,
        stiffness: f32,
        damping: f32,
    },
    Velocity {
        target_velocity: f32,
        damping: f32,
    },
}

impl JointDrive {
    /// Relative angular velocity the drive asks for this substep, if any.
    ///
    /// The position drive is an implicit spring-damper, so it stays stable for
    /// any stiffness at the sandbox's step sizes.
    fn desired_velocity(&self, angle: f32, dt: f32) -> Option<f32> {
        match *self {
            JointDrive::Position {
                target,
                stiffness,
                damping,
            } => {
                let denominator = damping + dt * stiffness;
                if denominator > 0.0 {
                    Some(stiffness * (target - angle) / denominator)
                } else {
                    None
                }
            }
            JointDrive::Velocity {
                target_velocity,
                damping,
            } => (damping > 0.0).then_some(target_velocity),
        }
    }
}

/// A hinge between two sandbox bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevoluteJoint {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub local_anchor_a: Vector3,
    pub local_anchor_b: Vector3,
    /// Hinge axis in `body_a`'s frame, unit length
    pub local_axis: Vector3,
    pub drive: Option<JointDrive>,
    /// Rotation of `body_b` relative to `body_a` about the axis
    pub angle: f32,
}

impl RevoluteJoint {
    pub fn new(
        body_a: BodyHandle,
        body_b: BodyHandle,
        local_anchor_a: Vector3,
        local_anchor_b: Vector3,
        local_axis: Vector3,
    ) -> Self {
        Self {
            body_a,
            body_b,
            local_anchor_a,
            local_anchor_b,
            local_axis: local_axis.normalize(),
            drive: None,
            angle: 0.0,
        }
    }

    pub fn involves(&self, body: BodyHandle) -> bool {
        self.body_a == body || self.body_b == body
    }

    /// Hinge axis in world space
    pub fn world_axis(&self, a: &SandboxBody) -> Vector3 {
        a.rotation.rotate_vector(self.local_axis)
    }

    /// Relative angular velocity about the hinge axis
    pub fn relative_velocity(&self, a: &SandboxBody, b: &SandboxBody) -> f32 {
        (b.angular_velocity - a.angular_velocity).dot(&self.world_axis(a))
    }

    /// Rotation of `b` relative to `a` about the hinge axis, in `(-π, π]`.
    ///
    /// Both bodies are created unrotated, so the twist of their relative
    /// orientation is the hinge angle.
    pub fn twist_angle(&self, a: &SandboxBody, b: &SandboxBody) -> f32 {
        let relative = a.rotation.conjugate() * b.rotation;
        let along = Vector3::new(relative.x, relative.y, relative.z).dot(&self.local_axis);
        let (along, w) = if relative.w < 0.0 { (-along, -relative.w) } else { (along, relative.w) };
        2.0 * along.atan2(w)
    }

    /// One sequential-impulse pass over the anchor, the locked axes and the drive
    pub fn solve_velocity(&self, a: &mut SandboxBody, b: &mut SandboxBody, dt: f32, bias_factor: f32) {
        let (ima, imb) = (a.inv_mass(), b.inv_mass());
        let (iia, iib) = (a.inv_inertia(), b.inv_inertia());

        // Anchor points must move together.
        let ra = a.rotation.rotate_vector(self.local_anchor_a);
        let rb = b.rotation.rotate_vector(self.local_anchor_b);
        let k = ima + imb + iia * ra.length_squared() + iib * rb.length_squared();
        if k > 0.0 {
            let drift = (b.position + rb) - (a.position + ra);
            let relative = b.velocity_at(rb) - a.velocity_at(ra) + drift * (bias_factor / dt);
            let impulse = relative * (-1.0 / k);
            a.apply_impulse_at(-impulse, ra);
            b.apply_impulse_at(impulse, rb);
        }

        let angular_mass = iia + iib;
        if angular_mass <= 0.0 {
            return;
        }

        // Only rotation about the hinge axis is free.
        let axis = self.world_axis(a);
        let relative = b.angular_velocity - a.angular_velocity;
        let off_axis = relative - axis * relative.dot(&axis);
        let lock = off_axis * (-1.0 / angular_mass);
        a.angular_velocity -= lock * iia;
        b.angular_velocity += lock * iib;

        if let Some(desired) = self.drive.and_then(|drive| drive.desired_velocity(self.angle, dt)) {
            let lambda = (desired - self.relative_velocity(a, b)) / angular_mass;
            a.angular_velocity -= axis * (lambda * iia);
            b.angular_velocity += axis * (lambda * iib);
        }
    }
}
