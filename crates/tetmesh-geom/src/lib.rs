#![warn(missing_docs)]

//! Geometric primitives for tetrahedral meshes.
//!
//! Pure functions over points, triangles, tetrahedra and boxes:
//! closest-point queries, plane-side and containment tests, ray/triangle
//! and box/triangle intersection, and per-tetrahedron face data.

mod closest;
mod intersect;
mod tetra;

pub use closest::{
    closest_point_tetrahedron, closest_point_triangle, point_in_tetrahedron,
    point_outside_of_plane,
};
pub use intersect::{
    tetrahedron_box_intersection, triangle_box_intersection, triangle_ray_intersection,
    RAY_TRIANGLE_EPSILON,
};
pub use tetra::{
    tetrahedron_centroid, tetrahedron_face_normals, tetrahedron_volume, FACE_VERTICES,
};
