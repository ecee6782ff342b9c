//! A small in-process [`PhysicsEngine`](crate::engine::PhysicsEngine).
//!
//! The sandbox integrates gravity, damping and persistent forces, drives
//! revolute joints with implicit spring motors, moves kinematic bodies onto
//! their targets and bounces dynamic bodies off a flat ground plane. Ray
//! casts only see the ground. It exists to run the controllers end to end
//! in tests with exact, repeatable numbers; games run on
//! [`RapierWorld`](crate::engine::RapierWorld).

mod config;
mod storage;
mod body;
mod joint;
mod world;

pub use self::config::SandboxConfig;
pub use self::storage::{Handle, Storage};
pub use self::body::SandboxBody;
pub use self::joint::{JointDrive, RevoluteJoint};
pub use self::world::SandboxWorld;
