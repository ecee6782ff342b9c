use crate::engine::{BodyDesc, BodyShape, RigidBodyType};
use crate::math::{Quaternion, Rotation, Vector3};

/// A rigid body simulated by the sandbox
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SandboxBody {
    pub body_type: RigidBodyType,
    pub shape: BodyShape,
    pub restitution: f32,
    pub position: Vector3,
    pub rotation: Quaternion,
    pub linear_velocity: Vector3,
    pub angular_velocity: Vector3,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Force accumulated until the next reset
    pub force: Vector3,
    /// Where a kinematic body must be at the end of the next step
    pub kinematic_target: Option<Vector3>,
    mass: f32,
    inv_mass: f32,
    inv_inertia: f32,
}

impl SandboxBody {
    pub fn from_desc(desc: &BodyDesc) -> Self {
        let mass = desc.mass();
        let (inv_mass, inv_inertia) = if desc.body_type.is_dynamic() && mass > 0.0 {
            (1.0 / mass, 1.0 / scalar_inertia(&desc.shape, mass))
        } else {
            (0.0, 0.0)
        };

        Self {
            body_type: desc.body_type,
            shape: desc.shape,
            restitution: desc.material.restitution,
            position: desc.translation,
            rotation: Quaternion::identity(),
            linear_velocity: Vector3::zero(),
            angular_velocity: Vector3::zero(),
            linear_damping: desc.linear_damping,
            angular_damping: desc.angular_damping,
            force: Vector3::zero(),
            kinematic_target: None,
            mass,
            inv_mass,
            inv_inertia,
        }
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn inv_inertia(&self) -> f32 {
        self.inv_inertia
    }

    pub fn is_dynamic(&self) -> bool {
        self.body_type.is_dynamic()
    }

    /// Converts a local point to world space
    pub fn world_point(&self, local: Vector3) -> Vector3 {
        self.position + self.rotation.rotate_vector(local)
    }

    /// Velocity of the material point at world-space offset `r` from the centre
    pub fn velocity_at(&self, r: Vector3) -> Vector3 {
        self.linear_velocity + self.angular_velocity.cross(&r)
    }

    pub fn apply_impulse(&mut self, impulse: Vector3) {
        self.linear_velocity += impulse * self.inv_mass;
    }

    /// Applies an impulse at world-space offset `r` from the centre
    pub fn apply_impulse_at(&mut self, impulse: Vector3, r: Vector3) {
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity += r.cross(&impulse) * self.inv_inertia;
    }

    pub fn apply_torque_impulse(&mut self, torque_impulse: Vector3) {
        self.angular_velocity += torque_impulse * self.inv_inertia;
    }

    /// Gravity, accumulated force and damping for one substep
    pub fn integrate_forces(&mut self, gravity: Vector3, dt: f32) {
        if !self.is_dynamic() {
            return;
        }
        self.linear_velocity += (gravity + self.force * self.inv_mass) * dt;
        self.linear_velocity *= 1.0 / (1.0 + dt * self.linear_damping);
        self.angular_velocity *= 1.0 / (1.0 + dt * self.angular_damping);
    }

    pub fn integrate_velocity(&mut self, dt: f32) {
        if self.body_type == RigidBodyType::Static {
            return;
        }
        self.position += self.linear_velocity * dt;
        self.rotation = (Quaternion::from_scaled_axis(self.angular_velocity, dt) * self.rotation).normalize();
    }

    /// Pushes the body out of the ground plane and bounces it
    pub fn resolve_ground(&mut self, ground: f32, rest_threshold: f32) {
        if !self.is_dynamic() {
            return;
        }
        let floor = ground + self.shape.half_height();
        if self.position.y >= floor {
            return;
        }
        self.position.y = floor;
        if self.linear_velocity.y < 0.0 {
            let impact = -self.linear_velocity.y;
            self.linear_velocity.y = if impact > rest_threshold {
                impact * self.restitution
            } else {
                0.0
            };
        }
    }
}

/// Moment of inertia about any axis through the centre, averaged over the
/// principal axes for boxes
fn scalar_inertia(shape: &BodyShape, mass: f32) -> f32 {
    match *shape {
        BodyShape::Ball { radius } => 0.4 * mass * radius * radius,
        BodyShape::Cuboid { half_extents } => {
            let full = half_extents * 2.0;
            mass * full.length_squared() / 18.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Material;
    use approx::assert_relative_eq;

    fn ball() -> SandboxBody {
        let desc = BodyDesc::dynamic(BodyShape::Ball { radius: 0.5 })
            .with_material(Material::new(1000.0, 0.5, 0.5))
            .with_translation(Vector3::new(0.0, 0.4, 0.0));
        SandboxBody::from_desc(&desc)
    }

    #[test]
    fn mass_comes_from_density() {
        let body = ball();
        let volume = 4.0 / 3.0 * std::f32::consts::PI * 0.125;
        assert_relative_eq!(body.mass(), volume * 1000.0, max_relative = 1.0e-6);
    }

    #[test]
    fn kinematic_bodies_ignore_impulses() {
        let desc = BodyDesc::kinematic(BodyShape::cuboid(1.0, 1.0, 1.0));
        let mut body = SandboxBody::from_desc(&desc);
        body.apply_impulse(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(body.linear_velocity, Vector3::zero());
    }

    #[test]
    fn ground_bounces_fast_impacts() {
        let mut body = ball();
        body.linear_velocity = Vector3::new(0.0, -4.0, 0.0);
        body.resolve_ground(0.0, 0.5);
        assert_eq!(body.position.y, 0.5);
        assert_relative_eq!(body.linear_velocity.y, 2.0);
    }

    #[test]
    fn ground_stops_slow_impacts() {
        let mut body = ball();
        body.linear_velocity = Vector3::new(1.0, -0.2, 0.0);
        body.resolve_ground(0.0, 0.5);
        assert_eq!(body.linear_velocity, Vector3::new(1.0, 0.0, 0.0));
    }
}
