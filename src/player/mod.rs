//! The player avatar: a tree of bodies joined by motorized revolute joints,
//! driven by decoded swing intent.

mod intent;
mod blueprint;
mod rig;
mod swing;
mod locomotion;

pub use self::intent::SwingIntent;
pub use self::blueprint::{BodySlot, BodySpec, FollowerSpec, JointId, JointSpec, RigBlueprint, RIG_COLLISION_GROUP};
pub use self::rig::{BodyRig, JointMotor, MotorCommand};
pub use self::swing::{ArmAction, MotorTarget, SwingPlan, SwingStateMachine};
pub use self::locomotion::Locomotion;
