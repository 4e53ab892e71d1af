//! Ray/triangle and box/triangle/tetrahedron intersection tests.

use tetmesh_math::{Aabb3, Point3, Vec3};

use crate::closest::point_in_tetrahedron;
use crate::tetra::FACE_VERTICES;

/// Ratio of the determinant to `|e1| |e2|` below which a ray is treated
/// as parallel to a triangle. Relative, so small elements are not skipped.
pub const RAY_TRIANGLE_EPSILON: f64 = 1e-10;

/// Double-sided Möller–Trumbore ray/triangle intersection.
///
/// Returns the distance along `dir` from `origin` to the hit point. Rays
/// parallel to the triangle plane, hits outside the triangle and hits
/// behind the origin give `None`. `dir` need not be normalized; the
/// distance is in units of `|dir|`.
pub fn triangle_ray_intersection(
    origin: &Point3,
    dir: &Vec3,
    a: &Point3,
    b: &Point3,
    c: &Point3,
) -> Option<f64> {
    let e1 = b - a;
    let e2 = c - a;
    let pvec = dir.cross(&e2);
    let det = e1.dot(&pvec);
    if det.abs() < RAY_TRIANGLE_EPSILON * dir.norm() * e1.norm() * e2.norm() {
        return None;
    }
    let inv_det = 1.0 / det;

    let tvec = origin - a;
    let u = tvec.dot(&pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(&e1);
    let v = dir.dot(&qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = e2.dot(&qvec) * inv_det;
    if t < 0.0 {
        return None;
    }
    Some(t)
}

/// Separating axis test between a box and triangle `abc`.
///
/// Checks the 13 candidate axes: the three box face normals, the triangle
/// normal and the nine cross products of box and triangle edges. Touching
/// counts as intersecting.
pub fn triangle_box_intersection(aabb: &Aabb3, a: &Point3, b: &Point3, c: &Point3) -> bool {
    let center = aabb.center();
    let h = aabb.half_extents();
    let v = [a - center, b - center, c - center];
    let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];

    let separated = |axis: &Vec3| {
        let p0 = v[0].dot(axis);
        let p1 = v[1].dot(axis);
        let p2 = v[2].dot(axis);
        let r = h.x * axis.x.abs() + h.y * axis.y.abs() + h.z * axis.z.abs();
        p0.min(p1).min(p2) > r || p0.max(p1).max(p2) < -r
    };

    // Box face normals.
    for axis in 0..3 {
        let lo = v[0][axis].min(v[1][axis]).min(v[2][axis]);
        let hi = v[0][axis].max(v[1][axis]).max(v[2][axis]);
        if lo > h[axis] || hi < -h[axis] {
            return false;
        }
    }

    // Triangle normal.
    if separated(&edges[0].cross(&edges[1])) {
        return false;
    }

    // Edge cross products.
    let box_axes = [Vec3::x(), Vec3::y(), Vec3::z()];
    for e in &box_axes {
        for f in &edges {
            if separated(&e.cross(f)) {
                return false;
            }
        }
    }

    true
}

/// True if tetrahedron `vertices` and the box share at least one point.
///
/// Either a vertex lies in the box, a face crosses the box, or the box
/// sits entirely inside the tetrahedron (detected through its centre).
pub fn tetrahedron_box_intersection(aabb: &Aabb3, vertices: &[Point3; 4]) -> bool {
    if vertices.iter().any(|v| aabb.contains_closed(v)) {
        return true;
    }
    let face_hit = FACE_VERTICES.iter().any(|&[i, j, k]| {
        triangle_box_intersection(aabb, &vertices[i], &vertices[j], &vertices[k])
    });
    if face_hit {
        return true;
    }
    let [a, b, c, d] = vertices;
    point_in_tetrahedron(&aabb.center(), a, b, c, d)
}
