//! Articulated player rig and ball flight model for a tennis mini-game.
//!
//! The crate drives bodies living inside an external rigid-body solver
//! through the [`engine::PhysicsEngine`] trait. Each tick the host calls
//! [`TennisCore::physics_step`] and then [`TennisCore::render_frame`].
//! The default `rapier` feature provides `engine::RapierWorld`.

pub mod math;
pub mod engine;
pub mod config;
pub mod ball;
pub mod player;
pub mod core;
pub mod sandbox;

/// Re-export common types for easier usage
pub use crate::core::{TennisCore, InputFrame, CameraPose, MatchPhase, PhaseStore};
pub use crate::config::TennisConfig;
pub use crate::engine::{PhysicsEngine, BodyHandle, JointHandle};
pub use crate::player::SwingIntent;
pub use crate::math::Vector3;

/// Error types for the tennis core
pub mod error {
    use crate::player::{BodySlot, JointId};
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum TennisError {
        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),

        #[error("Resource not found: {0}")]
        ResourceNotFound(String),

        #[error("Rig has no body bound to slot `{0}`")]
        MissingBody(BodySlot),

        #[error("Rig binds slot `{0}` more than once")]
        DuplicateBody(BodySlot),

        #[error("Joint `{0}` has a zero-length or non-finite axis")]
        ZeroJointAxis(JointId),

        #[error("Malformed rig: {0}")]
        MalformedRig(String),
    }
}

/// Result type for tennis core operations
pub type Result<T> = std::result::Result<T, error::TennisError>;

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
