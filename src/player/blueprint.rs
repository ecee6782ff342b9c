use std::fmt;

use crate::config::TennisConfig;
use crate::engine::{BodyDesc, BodyShape, Material};
use crate::error::TennisError;
use crate::math::{Vector3, EPSILON};
use crate::Result;

/// Collision group shared by every body of the humanoid avatar
pub const RIG_COLLISION_GROUP: u8 = 1;

/// Named body slots of the avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BodySlot {
    Legs,
    Hip,
    Torso,
    ShoulderRA,
    ShoulderRB,
    ArmR,
    ShoulderLA,
    ShoulderLB,
    ArmL,
    Head,
}

impl BodySlot {
    /// Number of slots
    pub const COUNT: usize = 10;

    /// Every slot, in index order
    pub const ALL: [BodySlot; Self::COUNT] = [
        BodySlot::Legs,
        BodySlot::Hip,
        BodySlot::Torso,
        BodySlot::ShoulderRA,
        BodySlot::ShoulderRB,
        BodySlot::ArmR,
        BodySlot::ShoulderLA,
        BodySlot::ShoulderLB,
        BodySlot::ArmL,
        BodySlot::Head,
    ];

    /// Position of the slot in [`BodySlot::ALL`]
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used in logs and errors
    pub fn name(self) -> &'static str {
        match self {
            BodySlot::Legs => "legs",
            BodySlot::Hip => "hip",
            BodySlot::Torso => "torso",
            BodySlot::ShoulderRA => "shoulderRA",
            BodySlot::ShoulderRB => "shoulderRB",
            BodySlot::ArmR => "armR",
            BodySlot::ShoulderLA => "shoulderLA",
            BodySlot::ShoulderLB => "shoulderLB",
            BodySlot::ArmL => "armL",
            BodySlot::Head => "head",
        }
    }
}

impl fmt::Display for BodySlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Motorized joints of the avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JointId {
    /// Hip to torso, yaw
    Torso,
    RightShoulderFront,
    RightShoulderLateral,
    RightShoulderInternal,
    LeftShoulderFront,
    LeftShoulderLateral,
    LeftShoulderInternal,
}

impl JointId {
    /// Number of joints
    pub const COUNT: usize = 7;

    /// Every joint, in index order
    pub const ALL: [JointId; Self::COUNT] = [
        JointId::Torso,
        JointId::RightShoulderFront,
        JointId::RightShoulderLateral,
        JointId::RightShoulderInternal,
        JointId::LeftShoulderFront,
        JointId::LeftShoulderLateral,
        JointId::LeftShoulderInternal,
    ];

    /// The three joints of the right shoulder
    pub const RIGHT_SHOULDER: [JointId; 3] = [
        JointId::RightShoulderFront,
        JointId::RightShoulderLateral,
        JointId::RightShoulderInternal,
    ];

    /// The three joints of the left shoulder
    pub const LEFT_SHOULDER: [JointId; 3] = [
        JointId::LeftShoulderFront,
        JointId::LeftShoulderLateral,
        JointId::LeftShoulderInternal,
    ];

    /// Position of the joint in [`JointId::ALL`]
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used in logs and errors
    pub fn name(self) -> &'static str {
        match self {
            JointId::Torso => "torso",
            JointId::RightShoulderFront => "rightShoulderFront",
            JointId::RightShoulderLateral => "rightShoulderLateral",
            JointId::RightShoulderInternal => "rightShoulderInternal",
            JointId::LeftShoulderFront => "leftShoulderFront",
            JointId::LeftShoulderLateral => "leftShoulderLateral",
            JointId::LeftShoulderInternal => "leftShoulderInternal",
        }
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A body bound to a slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySpec {
    pub slot: BodySlot,
    pub desc: BodyDesc,
}

/// A revolute joint between two slots
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointSpec {
    pub id: JointId,
    pub parent: BodySlot,
    pub child: BodySlot,
    /// Anchor in the parent's local frame
    pub anchor_parent: Vector3,
    /// Anchor in the child's local frame
    pub anchor_child: Vector3,
    /// Rotation axis in the parent's local frame
    pub axis: Vector3,
}

/// A kinematic body that tracks the root at a fixed world-space offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowerSpec {
    pub slot: BodySlot,
    pub offset: Vector3,
}

/// Complete description of an avatar, checked by [`RigBlueprint::validate`]
#[derive(Debug, Clone, PartialEq)]
pub struct RigBlueprint {
    pub bodies: Vec<BodySpec>,
    pub joints: Vec<JointSpec>,
    pub followers: Vec<FollowerSpec>,
}

impl RigBlueprint {
    /// The tennis player avatar: a rolling ball for legs, kinematic hip and
    /// head, a yawing torso and two three-joint shoulders ending in arms.
    pub fn humanoid(config: &TennisConfig) -> Self {
        let avatar = &config.avatar;
        let legs_at = config.avatar_home();
        let hip_offset = Vector3::new(0.0, avatar.hip_offset, 0.0);
        let head_offset = Vector3::new(0.0, avatar.head_offset, 0.0);

        let joints = vec![
            revolute(JointId::Torso, BodySlot::Hip, BodySlot::Torso, [0.0, 0.1, 0.0], [0.0, -0.1, 0.0], Vector3::unit_y()),
            revolute(JointId::RightShoulderFront, BodySlot::Torso, BodySlot::ShoulderRA, [0.4, 0.2, 0.0], [0.0, 0.0, 0.0], Vector3::unit_x()),
            revolute(JointId::RightShoulderLateral, BodySlot::ShoulderRA, BodySlot::ShoulderRB, [0.0, 0.0, 0.001], [0.0, 0.0, -0.001], Vector3::unit_z()),
            revolute(JointId::RightShoulderInternal, BodySlot::ShoulderRB, BodySlot::ArmR, [0.0, -0.1, 0.0], [0.0, 0.5, 0.0], Vector3::unit_y()),
            revolute(JointId::LeftShoulderFront, BodySlot::Torso, BodySlot::ShoulderLA, [-0.4, 0.2, 0.0], [0.0, 0.0, 0.0], Vector3::unit_x()),
            revolute(JointId::LeftShoulderLateral, BodySlot::ShoulderLA, BodySlot::ShoulderLB, [0.0, 0.0, 0.001], [0.0, 0.0, -0.001], Vector3::unit_z()),
            revolute(JointId::LeftShoulderInternal, BodySlot::ShoulderLB, BodySlot::ArmL, [0.0, -0.1, 0.0], [0.0, 0.5, 0.0], Vector3::unit_y()),
        ];

        // Place each linked body where its joint is already satisfied.
        let mut positions = [Vector3::zero(); BodySlot::COUNT];
        positions[BodySlot::Legs.index()] = legs_at;
        positions[BodySlot::Hip.index()] = legs_at + hip_offset;
        positions[BodySlot::Head.index()] = legs_at + head_offset;
        for joint in &joints {
            positions[joint.child.index()] =
                positions[joint.parent.index()] + joint.anchor_parent - joint.anchor_child;
        }

        let upper = |slot: BodySlot, shape: BodyShape, density: f32| BodySpec {
            slot,
            desc: BodyDesc::dynamic(shape)
                .with_material(Material::limb(density))
                .with_translation(positions[slot.index()]),
        };
        let shoulder = BodyShape::Ball { radius: 0.08 };
        let arm = BodyShape::cuboid(0.1, 0.65, 0.1);

        let mut bodies = vec![
            BodySpec {
                slot: BodySlot::Legs,
                desc: BodyDesc::dynamic(BodyShape::Ball { radius: 0.4 })
                    .with_material(Material::padded(300.0))
                    .with_damping(0.5, 0.5)
                    .with_translation(positions[BodySlot::Legs.index()]),
            },
            BodySpec {
                slot: BodySlot::Hip,
                desc: BodyDesc::kinematic(BodyShape::cuboid(0.5, 0.1, 0.5))
                    .with_material(Material::limb(997.0))
                    .with_translation(positions[BodySlot::Hip.index()]),
            },
            upper(BodySlot::Torso, BodyShape::cuboid(0.6, 0.4, 0.3), 997.0),
            upper(BodySlot::ShoulderRA, shoulder, 997.0),
            upper(BodySlot::ShoulderRB, shoulder, 997.0),
            upper(BodySlot::ArmR, arm, 100.0),
            upper(BodySlot::ShoulderLA, shoulder, 997.0),
            upper(BodySlot::ShoulderLB, shoulder, 997.0),
            upper(BodySlot::ArmL, arm, 100.0),
            BodySpec {
                slot: BodySlot::Head,
                desc: BodyDesc::kinematic(BodyShape::Ball { radius: 0.13 })
                    .with_material(Material::padded(997.0))
                    .with_damping(0.5, 0.5)
                    .with_translation(positions[BodySlot::Head.index()]),
            },
        ];
        // Overlapping links are held together by joints, not contacts.
        for spec in &mut bodies {
            spec.desc.collision_group = Some(RIG_COLLISION_GROUP);
        }

        Self {
            bodies,
            joints,
            followers: vec![
                FollowerSpec { slot: BodySlot::Hip, offset: hip_offset },
                FollowerSpec { slot: BodySlot::Head, offset: head_offset },
            ],
        }
    }

    /// Returns the descriptor bound to `slot`, if any
    pub fn body(&self, slot: BodySlot) -> Option<&BodySpec> {
        self.bodies.iter().find(|spec| spec.slot == slot)
    }

    /// Checks the blueprint describes a well-formed avatar.
    ///
    /// Every slot must be bound exactly once, `legs` must be dynamic, `hip`
    /// and `head` kinematic followers, every other slot a dynamic body hanging
    /// from `hip` through exactly one joint, and every joint axis non-zero.
    pub fn validate(&self) -> Result<()> {
        let mut bound = [false; BodySlot::COUNT];
        for spec in &self.bodies {
            if std::mem::replace(&mut bound[spec.slot.index()], true) {
                return Err(TennisError::DuplicateBody(spec.slot));
            }
            if !spec.desc.shape.is_valid() || !spec.desc.translation.is_finite() {
                return Err(TennisError::InvalidParameter(format!(
                    "body `{}` has an invalid shape or translation",
                    spec.slot
                )));
            }
            if spec.desc.body_type.is_dynamic() && spec.desc.mass() <= 0.0 {
                return Err(TennisError::InvalidParameter(format!(
                    "dynamic body `{}` must have positive mass",
                    spec.slot
                )));
            }
        }
        if let Some(slot) = BodySlot::ALL.iter().find(|slot| !bound[slot.index()]) {
            return Err(TennisError::MissingBody(*slot));
        }

        for slot in BodySlot::ALL {
            let kinematic = matches!(slot, BodySlot::Hip | BodySlot::Head);
            let body_type = self.body(slot).map(|spec| spec.desc.body_type);
            let ok = match body_type {
                Some(body_type) if kinematic => body_type.is_kinematic(),
                Some(body_type) => body_type.is_dynamic(),
                None => false,
            };
            if !ok {
                let expected = if kinematic { "kinematic" } else { "dynamic" };
                return Err(TennisError::MalformedRig(format!("`{slot}` must be {expected}")));
            }
        }

        let mut parent_of: [Option<BodySlot>; BodySlot::COUNT] = [None; BodySlot::COUNT];
        let mut seen = [false; JointId::COUNT];
        for joint in &self.joints {
            if std::mem::replace(&mut seen[joint.id.index()], true) {
                return Err(TennisError::MalformedRig(format!("joint `{}` declared twice", joint.id)));
            }
            if !joint.axis.is_finite() || joint.axis.length_squared() < EPSILON {
                return Err(TennisError::ZeroJointAxis(joint.id));
            }
            if !joint.anchor_parent.is_finite() || !joint.anchor_child.is_finite() {
                return Err(TennisError::InvalidParameter(format!(
                    "joint `{}` has a non-finite anchor",
                    joint.id
                )));
            }
            if matches!(joint.child, BodySlot::Legs | BodySlot::Hip | BodySlot::Head) {
                return Err(TennisError::MalformedRig(format!(
                    "joint `{}` cannot drive `{}`",
                    joint.id, joint.child
                )));
            }
            if parent_of[joint.child.index()].replace(joint.parent).is_some() {
                return Err(TennisError::MalformedRig(format!(
                    "`{}` has more than one parent joint",
                    joint.child
                )));
            }
        }
        if let Some(id) = JointId::ALL.iter().find(|id| !seen[id.index()]) {
            return Err(TennisError::MalformedRig(format!("joint `{id}` is missing")));
        }

        // Every jointed body must reach the hip without revisiting a slot.
        for slot in BodySlot::ALL {
            if matches!(slot, BodySlot::Legs | BodySlot::Hip | BodySlot::Head) {
                continue;
            }
            let mut current = slot;
            let mut hops = 0;
            while current != BodySlot::Hip {
                current = parent_of[current.index()].ok_or_else(|| {
                    TennisError::MalformedRig(format!("`{slot}` is not connected to the hip"))
                })?;
                hops += 1;
                if hops > BodySlot::COUNT {
                    return Err(TennisError::MalformedRig(format!("joint cycle through `{slot}`")));
                }
            }
        }

        for slot in [BodySlot::Hip, BodySlot::Head] {
            let follower = self.followers.iter().filter(|f| f.slot == slot).count();
            if follower != 1 {
                return Err(TennisError::MalformedRig(format!(
                    "kinematic `{slot}` needs exactly one follower offset"
                )));
            }
        }
        for follower in &self.followers {
            if !matches!(follower.slot, BodySlot::Hip | BodySlot::Head) {
                return Err(TennisError::MalformedRig(format!(
                    "`{}` is dynamic and cannot follow the root",
                    follower.slot
                )));
            }
            if !follower.offset.is_finite() {
                return Err(TennisError::InvalidParameter(format!(
                    "follower `{}` has a non-finite offset",
                    follower.slot
                )));
            }
        }

        Ok(())
    }
}

fn revolute(
    id: JointId,
    parent: BodySlot,
    child: BodySlot,
    anchor_parent: [f32; 3],
    anchor_child: [f32; 3],
    axis: Vector3,
) -> JointSpec {
    JointSpec {
        id,
        parent,
        child,
        anchor_parent: anchor_parent.into(),
        anchor_child: anchor_child.into(),
        axis,
    }
}
