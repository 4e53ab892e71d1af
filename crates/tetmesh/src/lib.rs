#![warn(missing_docs)]

//! Tetrahedral mesh geometry for particle transport.
//!
//! A [`Mesh`] is built once from a [`MeshSpec`] and then answers the
//! queries a Monte Carlo transport loop needs: which element contains a
//! point, how far a particle can travel before crossing an element face
//! (`howfar`), and a lower bound on the distance to the nearest face
//! (`hownear`). Regions are element indices; `None` is the space outside
//! the mesh.
//!
//! # Example
//!
//! ```
//! use tetmesh::{Mesh, MediumRegistry, MeshSpec};
//! use tetmesh::spec::{ElementSpec, MediumSpec, NodeSpec};
//! use tetmesh_math::{Point3, Vec3};
//!
//! let spec = MeshSpec {
//!     elements: vec![ElementSpec::new(1, 1, [1, 2, 3, 4])],
//!     nodes: vec![
//!         NodeSpec::new(1, 0.0, 0.0, 0.0),
//!         NodeSpec::new(2, 1.0, 0.0, 0.0),
//!         NodeSpec::new(3, 0.0, 1.0, 0.0),
//!         NodeSpec::new(4, 0.0, 0.0, 1.0),
//!     ],
//!     media: vec![MediumSpec::new(1, "H2O")],
//! };
//! let mut media = MediumRegistry::new();
//! let mesh = Mesh::new(spec, &mut media).unwrap();
//!
//! let x = Point3::new(0.1, 0.1, 0.1);
//! let region = mesh.locate(&x);
//! assert_eq!(region, Some(0));
//!
//! let step = mesh.howfar(region, &x, &Vec3::new(0.0, 0.0, -1.0), 1.0);
//! assert_eq!(step.region, None);
//! assert!((step.distance - 0.1).abs() < 1e-12);
//! ```

pub use tetmesh_math;

pub mod config;
pub mod error;
pub mod geometry;
pub mod media;
pub mod mesh;
pub mod neighbours;
pub mod octree;
pub mod progress;
pub mod spec;

#[cfg(test)]
mod fixtures;

pub use config::MeshConfig;
pub use error::{MeshError, Result};
pub use geometry::{Geometry, Step};
pub use media::{Medium, MediumRegistry};
pub use mesh::{Mesh, MeshBuilder};
pub use progress::{PercentCounter, ProgressReporter};
pub use spec::MeshSpec;
