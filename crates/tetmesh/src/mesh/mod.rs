//! The tetrahedral mesh geometry.
//!
//! A [`Mesh`] owns node coordinates, element topology, media, the neighbour
//! table, inward face normals and two octrees: one over every element for
//! point location, one over boundary elements for particles outside the
//! mesh. Region `i` is element `i`; `None` is the vacuum around the mesh.
//!
//! Everything is built once by [`MeshBuilder`] and never modified, so a
//! mesh can be shared between threads and queried concurrently.

mod builder;
mod tracking;

use std::fmt;

use tetmesh_geom::{point_in_tetrahedron, tetrahedron_centroid, FACE_VERTICES};
use tetmesh_math::{Aabb3, Point3, Vec3};

pub use builder::{MeshBuilder, MAX_ENTITIES};
pub use tracking::VERY_FAR;

use crate::config::MeshConfig;
use crate::error::Result;
use crate::media::{Medium, MediumRegistry};
use crate::octree::{ElementGeometry, Octree};
use crate::spec::MeshSpec;

/// Node positions, connectivity and per-face data.
#[derive(Debug, Clone)]
pub(crate) struct Topology {
    nodes: Vec<Point3>,
    elements: Vec<[usize; 4]>,
    neighbours: Vec<[Option<usize>; 4]>,
    /// `4 * element + face`.
    boundary: Vec<bool>,
    normals: Vec<[Vec3; 4]>,
}

impl Topology {
    fn is_boundary_element(&self, element: usize) -> bool {
        self.neighbours[element].iter().any(Option::is_none)
    }

    fn contains(&self, element: usize, p: &Point3) -> bool {
        let [a, b, c, d] = self.vertices(element);
        point_in_tetrahedron(p, &a, &b, &c, &d)
    }

    /// A point on face `face` of `element`.
    fn face_point(&self, element: usize, face: usize) -> Point3 {
        self.nodes[self.elements[element][FACE_VERTICES[face][0]]]
    }
}

impl ElementGeometry for Topology {
    fn vertices(&self, element: usize) -> [Point3; 4] {
        self.elements[element].map(|i| self.nodes[i])
    }

    fn face_normal(&self, element: usize, face: usize) -> Vec3 {
        self.normals[element][face]
    }

    fn is_boundary_face(&self, element: usize, face: usize) -> bool {
        self.boundary[4 * element + face]
    }
}

/// A conforming tetrahedral mesh answering point and ray queries.
#[derive(Debug, Clone)]
pub struct Mesh {
    topology: Topology,
    element_tags: Vec<i64>,
    /// Slot into `media` per element.
    element_media: Vec<usize>,
    /// Registry index and snapshot of each medium the mesh declares.
    media: Vec<(usize, Medium)>,
    volumes: Vec<f64>,
    relative_density: Vec<f64>,
    volume_tree: Octree,
    surface_tree: Octree,
    config: MeshConfig,
}

impl Mesh {
    /// Build a mesh with the default configuration.
    ///
    /// Shorthand for `MeshBuilder::new(spec).build(media)`.
    pub fn new(spec: MeshSpec, media: &mut MediumRegistry) -> Result<Self> {
        MeshBuilder::new(spec).build(media)
    }

    /// Number of elements (regions).
    pub fn num_elements(&self) -> usize {
        self.topology.elements.len()
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.topology.nodes.len()
    }

    /// Position of node `node`.
    pub fn node(&self, node: usize) -> Point3 {
        self.topology.nodes[node]
    }

    /// Node indices (A, B, C, D) of `element`.
    pub fn element_nodes(&self, element: usize) -> [usize; 4] {
        self.topology.elements[element]
    }

    /// Vertex positions of `element`.
    pub fn element_vertices(&self, element: usize) -> [Point3; 4] {
        self.topology.vertices(element)
    }

    /// Input tag of `element`.
    pub fn element_tag(&self, element: usize) -> i64 {
        self.element_tags[element]
    }

    /// Volume of `element` in cm^3.
    pub fn element_volume(&self, element: usize) -> f64 {
        self.volumes[element]
    }

    /// Centroid of `element`.
    pub fn element_centroid(&self, element: usize) -> Point3 {
        tetrahedron_centroid(&self.topology.vertices(element))
    }

    /// Mass density of `element`: its medium's density at construction
    /// time scaled by the element's relative density.
    pub fn element_density(&self, element: usize) -> f64 {
        let (_, medium) = &self.media[self.element_media[element]];
        medium.density * self.relative_density[element]
    }

    /// Registry index of the medium of `element`.
    pub fn medium(&self, element: usize) -> usize {
        self.media[self.element_media[element]].0
    }

    /// Name of the medium of `element`.
    pub fn medium_name(&self, element: usize) -> &str {
        &self.media[self.element_media[element]].1.name
    }

    /// Registry indices of the media declared by the mesh.
    pub fn media(&self) -> impl Iterator<Item = (usize, &Medium)> {
        self.media.iter().map(|(index, medium)| (*index, medium))
    }

    /// True if `element` has at least one face on the mesh boundary.
    pub fn is_boundary(&self, element: usize) -> bool {
        self.topology.is_boundary_element(element)
    }

    /// True if face `face` of `element` is on the mesh boundary.
    pub fn is_boundary_face(&self, element: usize, face: usize) -> bool {
        self.topology.is_boundary_face(element, face)
    }

    /// Number of faces on the mesh boundary.
    pub fn boundary_face_count(&self) -> usize {
        self.topology.boundary.iter().filter(|&&b| b).count()
    }

    /// Element across face `face` of `element`, `None` on the boundary.
    pub fn neighbour(&self, element: usize, face: usize) -> Option<usize> {
        self.topology.neighbours[element][face]
    }

    /// Neighbours across all four faces of `element`.
    pub fn neighbours(&self, element: usize) -> [Option<usize>; 4] {
        self.topology.neighbours[element]
    }

    /// Inward unit normals of the four faces of `element`.
    pub fn face_normals(&self, element: usize) -> [Vec3; 4] {
        self.topology.normals[element]
    }

    /// Bounds of the whole mesh, padded by the octree root margin.
    pub fn bounding_box(&self) -> &Aabb3 {
        self.volume_tree.bounding_box()
    }

    /// Sum of element volumes in cm^3.
    pub fn total_volume(&self) -> f64 {
        self.volumes.iter().sum()
    }

    /// Configuration the mesh was built with.
    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// Multi-line description of the mesh.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bbox = self.bounding_box();
        let boundary_elements = (0..self.num_elements())
            .filter(|&i| self.is_boundary(i))
            .count();
        writeln!(f, "tetrahedral mesh")?;
        writeln!(f, "  elements:          {}", self.num_elements())?;
        writeln!(f, "  nodes:             {}", self.num_nodes())?;
        writeln!(f, "  boundary elements: {boundary_elements}")?;
        writeln!(f, "  boundary faces:    {}", self.boundary_face_count())?;
        writeln!(f, "  volume:            {:.6} cm^3", self.total_volume())?;
        writeln!(
            f,
            "  bounds:            ({:.6}, {:.6}, {:.6}) .. ({:.6}, {:.6}, {:.6})",
            bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z
        )?;
        write!(f, "  media:")?;
        for (index, medium) in self.media() {
            write!(f, " {}={}", index, medium.name)?;
        }
        Ok(())
    }
}
