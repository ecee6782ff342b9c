use crate::config::{AvatarConfig, TennisConfig};
use crate::core::PhaseTrigger;
use crate::engine::{is_grounded, PhysicsEngine};
use crate::math::Vector3;
use crate::Result;

use super::blueprint::BodySlot;
use super::intent::SwingIntent;
use super::rig::BodyRig;

/// Drives the rolling root body from movement intent
#[derive(Debug, Clone)]
pub struct Locomotion {
    avatar: AvatarConfig,
    home: Vector3,
}

impl Locomotion {
    pub fn new(config: &TennisConfig) -> Self {
        Self {
            avatar: config.avatar.clone(),
            home: config.avatar_home(),
        }
    }

    /// Where the root is re-homed to on reset
    pub fn home(&self) -> Vector3 {
        self.home
    }

    /// Linear and torque impulse for the held movement flags, before braking
    pub fn impulses(&self, held: SwingIntent, delta: f32) -> (Vector3, Vector3) {
        let per_second = if held.chop() {
            self.avatar.chop_strength
        } else {
            self.avatar.move_strength
        };
        let strength = per_second * delta;

        let mut impulse = Vector3::zero();
        let mut torque = Vector3::zero();

        // Holding topspin suppresses the forward drive.
        if held.forward() && !held.topspin() {
            impulse.z -= strength;
            torque.x -= strength;
        }
        if held.backward() {
            impulse.z += strength;
            torque.x += strength;
        }
        if held.right() {
            impulse.x += strength;
            torque.z -= strength;
        }
        if held.left() {
            impulse.x -= strength;
            torque.z += strength;
        }

        (impulse, torque)
    }

    /// Applies this tick's movement impulses to the root
    pub fn drive<E: PhysicsEngine>(
        &self,
        engine: &mut E,
        rig: &BodyRig,
        held: SwingIntent,
        delta: f32,
    ) -> Result<()> {
        let root = rig.root();
        let (mut impulse, torque) = self.impulses(held, delta);

        if held.chop() {
            let velocity = engine.linear_velocity(root)?;
            impulse += -velocity * (self.avatar.chop_brake * delta);
        }

        if !impulse.is_zero() {
            engine.apply_impulse(root, impulse)?;
        }
        if !torque.is_zero() {
            engine.apply_torque_impulse(root, torque)?;
        }
        Ok(())
    }

    /// Jumps if the root is touching the ground. Returns true if it jumped.
    pub fn jump<E: PhysicsEngine>(&self, engine: &mut E, rig: &BodyRig) -> Result<bool> {
        let root = rig.root();
        let probe = engine.translation(root)? - Vector3::new(0.0, self.avatar.jump_probe_offset, 0.0);
        if !is_grounded(&*engine, probe) {
            return Ok(false);
        }

        engine.apply_impulse(root, Vector3::new(0.0, self.avatar.jump_impulse, 0.0))?;
        log::debug!("jump from {}", probe);
        Ok(true)
    }

    /// Puts the avatar back on its baseline at rest
    pub fn rehome<E: PhysicsEngine>(&self, engine: &mut E, rig: &BodyRig) -> Result<()> {
        log::debug!("re-homing avatar to {}", self.home);
        rig.rehome(engine, self.home)
    }

    /// Checks the hip position implied by `root` against the court limits
    pub fn check_bounds(&self, rig: &BodyRig, root: Vector3) -> Option<PhaseTrigger> {
        let hip_offset = rig
            .followers()
            .iter()
            .find(|follower| follower.slot == BodySlot::Hip)
            .map_or(Vector3::zero(), |follower| follower.offset);
        let hip = root + hip_offset;

        if hip.z < self.avatar.end_boundary_z {
            Some(PhaseTrigger::End)
        } else if hip.y < self.avatar.fall_threshold {
            Some(PhaseTrigger::Restart)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locomotion() -> Locomotion {
        Locomotion::new(&TennisConfig::default())
    }

    #[test]
    fn forward_rolls_towards_the_net() {
        let (impulse, torque) = locomotion().impulses(SwingIntent::FORWARD, 0.5);
        assert_eq!(impulse, Vector3::new(0.0, 0.0, -200.0));
        assert_eq!(torque, Vector3::new(-200.0, 0.0, 0.0));
    }

    #[test]
    fn topspin_suppresses_forward() {
        let (impulse, torque) = locomotion().impulses(SwingIntent::FORWARD | SwingIntent::TOPSPIN, 1.0);
        assert!(impulse.is_zero());
        assert!(torque.is_zero());
    }

    #[test]
    fn chop_halves_strength() {
        let (impulse, torque) = locomotion().impulses(SwingIntent::RIGHT | SwingIntent::CHOP, 1.0);
        assert_eq!(impulse, Vector3::new(200.0, 0.0, 0.0));
        assert_eq!(torque, Vector3::new(0.0, 0.0, -200.0));
    }

    #[test]
    fn opposite_keys_cancel() {
        let (impulse, torque) = locomotion().impulses(SwingIntent::LEFT | SwingIntent::RIGHT, 1.0);
        assert!(impulse.is_zero());
        assert!(torque.is_zero());
    }
}
