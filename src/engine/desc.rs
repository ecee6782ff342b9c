use crate::engine::{Material, RigidBodyType};
use crate::math::Vector3;

/// Collider shape attached to a body, used for mass and ground contact
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum BodyShape {
    /// Sphere of the given radius
    Ball {
        /// Sphere radius in metres
        radius: f32,
    },

    /// Box given by its half extents
    Cuboid {
        /// Half the box size along each axis
        half_extents: Vector3,
    },
}

impl BodyShape {
    /// Creates a box from its full dimensions
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Self::Cuboid {
            half_extents: Vector3::new(width * 0.5, height * 0.5, depth * 0.5),
        }
    }

    /// Returns the volume of the shape
    pub fn volume(&self) -> f32 {
        match *self {
            Self::Ball { radius } => 4.0 / 3.0 * std::f32::consts::PI * radius.powi(3),
            Self::Cuboid { half_extents } => 8.0 * half_extents.x * half_extents.y * half_extents.z,
        }
    }

    /// Returns the distance from the centre to the lowest point of the shape
    pub fn half_height(&self) -> f32 {
        match *self {
            Self::Ball { radius } => radius,
            Self::Cuboid { half_extents } => half_extents.y,
        }
    }

    /// Returns true if every dimension is positive and finite
    pub fn is_valid(&self) -> bool {
        match *self {
            Self::Ball { radius } => radius > 0.0 && radius.is_finite(),
            Self::Cuboid { half_extents } => {
                half_extents.is_finite()
                    && half_extents.x > 0.0
                    && half_extents.y > 0.0
                    && half_extents.z > 0.0
            }
        }
    }
}

/// Everything an engine needs to create a rigid body
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyDesc {
    /// How the solver treats the body
    pub body_type: RigidBodyType,

    /// Collider shape
    pub shape: BodyShape,

    /// Contact and density properties
    pub material: Material,

    /// Initial world-space translation
    pub translation: Vector3,

    /// Linear velocity damping
    pub linear_damping: f32,

    /// Angular velocity damping
    pub angular_damping: f32,

    /// Bodies sharing a group never collide with each other
    pub collision_group: Option<u8>,
}

impl BodyDesc {
    /// Creates a descriptor for a body of the given type at the origin
    pub fn new(body_type: RigidBodyType, shape: BodyShape) -> Self {
        Self {
            body_type,
            shape,
            material: Material::default(),
            translation: Vector3::zero(),
            linear_damping: 0.0,
            angular_damping: 0.0,
            collision_group: None,
        }
    }

    /// Creates a dynamic body descriptor
    pub fn dynamic(shape: BodyShape) -> Self {
        Self::new(RigidBodyType::Dynamic, shape)
    }

    /// Creates a kinematic body descriptor
    pub fn kinematic(shape: BodyShape) -> Self {
        Self::new(RigidBodyType::Kinematic, shape)
    }

    /// Sets the initial translation
    pub fn with_translation(mut self, translation: Vector3) -> Self {
        self.translation = translation;
        self
    }

    /// Sets the material
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Sets linear and angular damping
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear.max(0.0);
        self.angular_damping = angular.max(0.0);
        self
    }

    /// Puts the body in a group whose members pass through each other
    pub fn with_collision_group(mut self, group: u8) -> Self {
        self.collision_group = Some(group);
        self
    }

    /// Mass implied by the shape volume and material density (zero for non-dynamic bodies)
    pub fn mass(&self) -> f32 {
        if self.body_type.is_dynamic() {
            self.shape.volume() * self.material.density
        } else {
            0.0
        }
    }
}
