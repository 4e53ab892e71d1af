//! Ray representation and the ray/box slab test.

use crate::{Aabb3, Dir3, Point3, Vec3, PARALLEL_EPSILON};

/// A ray in 3D space defined by origin and direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Unit direction of the ray.
    pub direction: Dir3,
    /// Precomputed reciprocal of direction components for fast AABB tests.
    inv_direction: Vec3,
}

impl Ray {
    /// Create a new ray from origin and direction.
    ///
    /// The direction will be normalized.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self::from_dir(origin, Dir3::new_normalize(direction))
    }

    /// Create a ray from an already normalized direction.
    pub fn from_dir(origin: Point3, direction: Dir3) -> Self {
        let inv = Vec3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z);
        Self {
            origin,
            direction,
            inv_direction: inv,
        }
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction.as_ref()
    }

    /// Test ray-AABB intersection using the slab method.
    ///
    /// Returns `Some((t_min, t_max))` if the ray intersects the box,
    /// where `t_min` and `t_max` are the entry and exit parameters.
    /// `t_min` is clamped to zero when the origin is inside the box.
    ///
    /// Direction components below [`PARALLEL_EPSILON`] are treated as
    /// parallel: the origin must then lie within that slab.
    #[inline]
    pub fn intersect_aabb(&self, aabb: &Aabb3) -> Option<(f64, f64)> {
        let mut t_min = 0.0_f64;
        let mut t_max = f64::INFINITY;

        for axis in 0..3 {
            let o = self.origin[axis];
            if self.direction[axis].abs() < PARALLEL_EPSILON {
                if o < aabb.min[axis] || o > aabb.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = self.inv_direction[axis];
            let t1 = (aabb.min[axis] - o) * inv;
            let t2 = (aabb.max[axis] - o) * inv;
            let (near, far) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
            t_min = t_min.max(near);
            t_max = t_max.min(far);
            if t_min > t_max {
                return None;
            }
        }

        Some((t_min, t_max))
    }
}
