use crate::math::Vector3;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Ray used for ground probes
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Ray {
    /// Origin of the ray
    pub origin: Vector3,

    /// Direction of the ray (not necessarily normalized)
    pub direction: Vector3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    #[inline]
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self { origin, direction }
    }

    /// Creates a ray pointing straight down (-y) from `origin`
    #[inline]
    pub fn downward(origin: Vector3) -> Self {
        Self::new(origin, Vector3::new(0.0, -1.0, 0.0))
    }

    /// Returns the point at parameter `t` along the ray
    #[inline]
    pub fn point_at(&self, t: f32) -> Vector3 {
        self.origin + self.direction * t
    }

    /// Intersects the ray with the horizontal plane `y = height`.
    ///
    /// Returns the time-of-impact in units of the direction vector, or `None`
    /// when the ray is parallel to or points away from the plane.
    pub fn intersect_horizontal_plane(&self, height: f32) -> Option<f32> {
        if self.direction.y.abs() < crate::math::EPSILON {
            return None;
        }

        let toi = (height - self.origin.y) / self.direction.y;
        if toi >= 0.0 && toi.is_finite() {
            Some(toi)
        } else {
            None
        }
    }
}
