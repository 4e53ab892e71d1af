//! Axis-aligned bounding boxes.
//!
//! Used by the octree both as node bounds and as the broadphase for ray
//! queries.

use crate::{Point3, Ray, Vec3};

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest AABB enclosing all `points`. Empty input gives an inverted box.
    pub fn from_points(points: impl IntoIterator<Item = Point3>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.include_point(&p);
        }
        aabb
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expand the AABB by a tolerance in all directions.
    pub fn expand(&mut self, tol: f64) {
        self.min.x -= tol;
        self.min.y -= tol;
        self.min.z -= tol;
        self.max.x += tol;
        self.max.y += tol;
        self.max.z += tol;
    }

    /// Centre of the box.
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Half the edge length along each axis.
    pub fn half_extents(&self) -> Vec3 {
        0.5 * (self.max - self.min)
    }

    /// Box volume in cm^3.
    pub fn volume(&self) -> f64 {
        let d = self.max - self.min;
        d.x * d.y * d.z
    }

    /// Strict containment: points on a face of the box are outside.
    pub fn contains(&self, p: &Point3) -> bool {
        (0..3).all(|axis| self.min[axis] < p[axis] && p[axis] < self.max[axis])
    }

    /// Closed containment: points on a face of the box are inside.
    pub fn contains_closed(&self, p: &Point3) -> bool {
        (0..3).all(|axis| self.min[axis] <= p[axis] && p[axis] <= self.max[axis])
    }

    /// The point of the box nearest to `p` (`p` itself when inside).
    pub fn closest_point(&self, p: &Point3) -> Point3 {
        Point3::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
            p.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Euclidean distance from `p` to the box, zero inside.
    pub fn distance_to(&self, p: &Point3) -> f64 {
        (p - self.closest_point(p)).norm()
    }

    /// Distance from an interior point to the nearest box face.
    ///
    /// Zero for points on or outside the box.
    pub fn min_interior_distance(&self, p: &Point3) -> f64 {
        let mut d = f64::INFINITY;
        for axis in 0..3 {
            d = d.min(p[axis] - self.min[axis]).min(self.max[axis] - p[axis]);
        }
        d.max(0.0)
    }

    /// True when halving the box along some axis would give back one of
    /// its own bounds, so splitting can no longer separate anything.
    pub fn is_indivisible(&self) -> bool {
        let mid = self.center();
        (0..3).any(|axis| mid[axis] <= self.min[axis] || mid[axis] >= self.max[axis])
    }

    /// The `index`-th octant of this box.
    ///
    /// Bit 0 selects the upper half in x, bit 1 in y, bit 2 in z.
    pub fn octant(&self, index: usize) -> Aabb3 {
        let mid = self.center();
        let mut min = self.min;
        let mut max = mid;
        for axis in 0..3 {
            if index & (1 << axis) != 0 {
                min[axis] = mid[axis];
                max[axis] = self.max[axis];
            }
        }
        Aabb3::new(min, max)
    }

    /// Index of the octant that owns `p`. Octants are closed on their
    /// lower bound, so a point on the midplane goes to the upper half.
    pub fn octant_index(&self, p: &Point3) -> usize {
        let mid = self.center();
        (0..3)
            .filter(|&axis| p[axis] >= mid[axis])
            .fold(0, |index, axis| index | (1 << axis))
    }

    /// Entry distance and entry point of `ray` into this box.
    ///
    /// A ray starting inside the box enters at distance zero, at its origin.
    pub fn ray_entry(&self, ray: &Ray) -> Option<(f64, Point3)> {
        ray.intersect_aabb(self).map(|(t_min, _)| (t_min, ray.at(t_min)))
    }
}
