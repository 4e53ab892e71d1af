//! Per-tetrahedron face data.

use tetmesh_math::{Point3, Vec3};

/// Vertex positions of each face: face `f` is the triangle opposite vertex `f`.
///
/// For vertices (A, B, C, D): face 0 = (B, C, D), face 1 = (A, C, D),
/// face 2 = (A, B, D), face 3 = (A, B, C).
pub const FACE_VERTICES: [[usize; 3]; 4] = [[1, 2, 3], [0, 2, 3], [0, 1, 3], [0, 1, 2]];

/// Unsigned volume of tetrahedron `abcd`.
pub fn tetrahedron_volume(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> f64 {
    (b - a).dot(&(c - a).cross(&(d - a))).abs() / 6.0
}

/// Centroid of the four vertices.
pub fn tetrahedron_centroid(vertices: &[Point3; 4]) -> Point3 {
    let sum = vertices.iter().fold(Vec3::zeros(), |acc, v| acc + v.coords);
    Point3::from(sum / 4.0)
}

/// Inward-pointing unit normals of the four faces.
///
/// Normal `f` is perpendicular to face `f` and points toward vertex `f`.
/// The tetrahedron must have non-zero volume.
pub fn tetrahedron_face_normals(vertices: &[Point3; 4]) -> [Vec3; 4] {
    std::array::from_fn(|f| {
        let [i, j, k] = FACE_VERTICES[f];
        let origin = vertices[i];
        let n = (vertices[j] - origin)
            .cross(&(vertices[k] - origin))
            .normalize();
        if (vertices[f] - origin).dot(&n) < 0.0 {
            -n
        } else {
            n
        }
    })
}
