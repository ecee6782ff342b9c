/// Contact and mass properties of a body
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    /// Coefficient of restitution (bounciness), 0-1
    pub restitution: f32,

    /// Coefficient of friction
    pub friction: f32,

    /// Density of the material (kg/m^3)
    pub density: f32,
}

impl Material {
    /// Creates a new material with the specified properties
    pub fn new(density: f32, friction: f32, restitution: f32) -> Self {
        Self {
            density,
            friction,
            restitution,
        }
    }

    /// Frictionless, inelastic material used for the upper-body links
    pub fn limb(density: f32) -> Self {
        Self {
            density,
            friction: 0.0,
            restitution: 0.0,
        }
    }

    /// Grippy, half-elastic material used for the avatar's feet and head
    pub fn padded(density: f32) -> Self {
        Self {
            density,
            friction: 1.0,
            restitution: 0.5,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 1000.0, // Density of water (kg/m^3)
            friction: 0.5,
            restitution: 0.0,
        }
    }
}
