/// Type of rigid body, determining how the solver treats it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum RigidBodyType {
    /// Dynamic bodies are fully simulated (affected by forces, impulses and joints)
    Dynamic,

    /// Kinematic bodies are moved by explicit position commands and push dynamic bodies
    Kinematic,

    /// Static bodies never move
    Static,
}

impl RigidBodyType {
    /// Returns true for bodies integrated by the solver
    #[inline]
    pub fn is_dynamic(self) -> bool {
        self == Self::Dynamic
    }

    /// Returns true for bodies driven by explicit translation targets
    #[inline]
    pub fn is_kinematic(self) -> bool {
        self == Self::Kinematic
    }
}
