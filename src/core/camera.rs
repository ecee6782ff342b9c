use crate::config::{CameraConfig, TennisConfig};
use crate::math::Vector3;

/// Where the camera sits and what it looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vector3,
    pub look_at: Vector3,
}

/// Third-person camera that eases towards a point behind the root
#[derive(Debug, Clone)]
pub struct CameraFollow {
    offset: Vector3,
    target_offset: Vector3,
    smoothing: f32,
    pose: CameraPose,
}

impl CameraFollow {
    pub fn new(config: &TennisConfig) -> Self {
        let camera: &CameraConfig = &config.camera;
        Self {
            offset: camera.offset,
            target_offset: Vector3::new(0.0, camera.target_height, -config.baseline_z),
            smoothing: camera.smoothing,
            pose: CameraPose {
                position: camera.initial_position,
                look_at: Vector3::zero(),
            },
        }
    }

    /// Smoothed pose as of the last update
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Pose the camera is easing towards for a root at `root`
    pub fn ideal(&self, root: Vector3) -> CameraPose {
        CameraPose {
            position: root + self.offset,
            look_at: root + self.target_offset,
        }
    }

    /// Moves the smoothed pose towards the ideal one for `root`
    pub fn update(&mut self, root: Vector3, delta: f32) -> CameraPose {
        let ideal = self.ideal(root);
        let t = (self.smoothing * delta).clamp(0.0, 1.0);
        if t.is_finite() {
            self.pose.position = self.pose.position.lerp(&ideal.position, t);
            self.pose.look_at = self.pose.look_at.lerp(&ideal.look_at, t);
        }
        self.pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn starts_at_initial_position() {
        let camera = CameraFollow::new(&TennisConfig::default());
        assert_eq!(camera.pose().position, Vector3::new(10.0, 10.0, 10.0));
        assert_eq!(camera.pose().look_at, Vector3::zero());
    }

    #[test]
    fn large_delta_snaps_to_ideal() {
        let mut camera = CameraFollow::new(&TennisConfig::default());
        let root = Vector3::new(1.0, 1.0, 13.0);
        let pose = camera.update(root, 1.0);
        assert_relative_eq!(pose.position, Vector3::new(1.0, 2.75, 17.25));
        assert_relative_eq!(pose.look_at, Vector3::new(1.0, 1.5, 0.0));
    }

    #[test]
    fn converges_over_frames() {
        let mut camera = CameraFollow::new(&TennisConfig::default());
        let root = Vector3::new(0.0, 1.0, 13.0);
        let ideal = camera.ideal(root);
        let mut last = camera.pose().position.distance(&ideal.position);
        for _ in 0..120 {
            let distance = camera.update(root, 1.0 / 60.0).position.distance(&ideal.position);
            assert!(distance <= last);
            last = distance;
        }
        assert!(last < 1.0e-2);
    }
}
