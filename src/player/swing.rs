//! Maps swing intent onto joint motor targets and arm impulses.

use std::f32::consts::PI;

use crate::engine::PhysicsEngine;
use crate::math::Vector3;
use crate::Result;

use super::blueprint::{BodySlot, JointId};
use super::intent::SwingIntent;
use super::rig::BodyRig;

/// Torso stiffness while a stroke is held
pub const STROKE_STIFFNESS: f32 = 250.0;
/// Torso stiffness with no stroke held
pub const NEUTRAL_STIFFNESS: f32 = 100.0;
pub const TORSO_DAMPING: f32 = 10.0;

/// Stiffness of the shoulder joints while recentring an idle arm
pub const REST_STIFFNESS: f32 = 1.0e5;
pub const REST_DAMPING: f32 = 1.0e3;

/// Per-second impulses applied at the arm centres
pub const RIGHT_FOREHAND_IMPULSE: Vector3 = Vector3::new(5.0, 20.0, 10.0);
pub const RIGHT_TOPSPIN_IMPULSE: Vector3 = Vector3::new(0.0, 10.0, 0.0);
pub const LEFT_FOREHAND_IMPULSE: Vector3 = Vector3::new(10.0, 25.0, -5.0);

/// A position drive for one joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorTarget {
    pub target: f32,
    pub stiffness: f32,
    pub damping: f32,
}

impl MotorTarget {
    const fn stroke(target: f32) -> Self {
        Self {
            target,
            stiffness: STROKE_STIFFNESS,
            damping: TORSO_DAMPING,
        }
    }
}

/// What an arm does this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArmAction {
    /// Recentre all three shoulder joints
    Rest,
    /// Push the arm with a per-second impulse
    Swing { impulse: Vector3 },
}

/// Everything the swing machine wants done in one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingPlan {
    pub torso: MotorTarget,
    pub right_arm: ArmAction,
    pub left_arm: ArmAction,
}

/// Stateless mapping from intent to joint drives.
///
/// The torso yaw follows a priority of forehand, topspin, backhand, neutral.
/// Slice softens the forehand and backhand angles. Arm impulses stack per flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwingStateMachine;

impl SwingStateMachine {
    pub fn new() -> Self {
        Self
    }

    /// Plans the drives for `intent`
    pub fn plan(&self, intent: SwingIntent) -> SwingPlan {
        let torso = if intent.forehand() {
            MotorTarget::stroke(if intent.slice() { -PI / 10.0 } else { -PI / 4.0 })
        } else if intent.topspin() {
            MotorTarget::stroke(PI / 10.0)
        } else if intent.backhand() {
            MotorTarget::stroke(if intent.slice() { PI / 6.0 } else { PI / 3.0 })
        } else {
            MotorTarget {
                target: 0.0,
                stiffness: NEUTRAL_STIFFNESS,
                damping: TORSO_DAMPING,
            }
        };

        let right_arm = if intent.intersects(SwingIntent::FOREHAND | SwingIntent::TOPSPIN) {
            let mut impulse = Vector3::zero();
            if intent.forehand() {
                impulse += RIGHT_FOREHAND_IMPULSE;
            }
            if intent.topspin() {
                impulse += RIGHT_TOPSPIN_IMPULSE;
            }
            ArmAction::Swing { impulse }
        } else if intent.backhand() {
            // Held by the torso alone; the arm keeps whatever pose it has.
            ArmAction::Swing {
                impulse: Vector3::zero(),
            }
        } else {
            ArmAction::Rest
        };

        let left_arm = if intent.forehand() {
            ArmAction::Swing {
                impulse: LEFT_FOREHAND_IMPULSE,
            }
        } else if intent.backhand() {
            ArmAction::Swing {
                impulse: Vector3::zero(),
            }
        } else {
            ArmAction::Rest
        };

        SwingPlan {
            torso,
            right_arm,
            left_arm,
        }
    }

    /// Plans and applies the drives for `intent`, scaling arm impulses by `delta`
    pub fn apply<E: PhysicsEngine>(
        &self,
        engine: &mut E,
        rig: &mut BodyRig,
        intent: SwingIntent,
        delta: f32,
    ) -> Result<SwingPlan> {
        let plan = self.plan(intent);

        engine.wake_up(rig.body(BodySlot::Torso))?;
        rig.set_motor_position(
            engine,
            JointId::Torso,
            plan.torso.target,
            plan.torso.stiffness,
            plan.torso.damping,
        )?;

        apply_arm(engine, rig, plan.right_arm, BodySlot::ArmR, &JointId::RIGHT_SHOULDER, delta)?;
        apply_arm(engine, rig, plan.left_arm, BodySlot::ArmL, &JointId::LEFT_SHOULDER, delta)?;

        Ok(plan)
    }
}

fn apply_arm<E: PhysicsEngine>(
    engine: &mut E,
    rig: &mut BodyRig,
    action: ArmAction,
    arm: BodySlot,
    shoulder: &[JointId; 3],
    delta: f32,
) -> Result<()> {
    match action {
        ArmAction::Rest => {
            for joint in shoulder {
                rig.set_motor_position(engine, *joint, 0.0, REST_STIFFNESS, REST_DAMPING)?;
            }
        }
        ArmAction::Swing { impulse } if !impulse.is_zero() => {
            let body = rig.body(arm);
            let centre = engine.translation(body)?;
            engine.apply_impulse_at_point(body, impulse * delta, centre)?;
        }
        ArmAction::Swing { .. } => {}
    }
    Ok(())
}
