#![warn(missing_docs)]

//! Math types for the tetmesh geometry engine.
//!
//! Thin wrappers around nalgebra providing the types shared by the
//! primitives, the octree and the mesh: points, vectors, directions,
//! axis-aligned boxes and rays. Lengths are in centimetres.

use nalgebra::{Unit, Vector3};

pub mod aabb;
pub mod ray;

pub use aabb::Aabb3;
pub use ray::Ray;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// Direction components with a magnitude below this are treated as
/// parallel to the corresponding slab in ray/box tests.
pub const PARALLEL_EPSILON: f64 = 1e-10;
