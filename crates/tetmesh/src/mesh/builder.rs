//! Validation and construction of a [`Mesh`] from a raw description.

use std::collections::{HashMap, HashSet};

use tetmesh_geom::{tetrahedron_face_normals, tetrahedron_volume};
use tetmesh_math::Point3;
use tracing::{debug, info};

use super::{Mesh, Topology};
use crate::config::MeshConfig;
use crate::error::{MeshError, Result};
use crate::media::{Medium, MediumRegistry};
use crate::neighbours::{boundary_faces, tetrahedron_neighbours, Tetrahedron};
use crate::octree::Octree;
use crate::progress::{PercentCounter, ProgressReporter};
use crate::spec::MeshSpec;

/// Largest element or node count a region index can address.
pub const MAX_ENTITIES: usize = i32::MAX as usize;

/// Configures and builds a [`Mesh`].
///
/// ```
/// use tetmesh::{MeshBuilder, MeshConfig, MediumRegistry, MeshSpec};
/// use tetmesh::spec::{ElementSpec, MediumSpec, NodeSpec};
///
/// let spec = MeshSpec {
///     elements: vec![ElementSpec::new(1, 1, [1, 2, 3, 4])],
///     nodes: vec![
///         NodeSpec::new(1, 0.0, 0.0, 0.0),
///         NodeSpec::new(2, 1.0, 0.0, 0.0),
///         NodeSpec::new(3, 0.0, 1.0, 0.0),
///         NodeSpec::new(4, 0.0, 0.0, 1.0),
///     ],
///     media: vec![MediumSpec::new(1, "H2O")],
/// };
/// let mut media = MediumRegistry::new();
/// let mesh = MeshBuilder::new(spec)
///     .config(MeshConfig::default())
///     .relative_density(0, 0.5)
///     .build(&mut media)
///     .unwrap();
/// assert_eq!(mesh.num_elements(), 1);
/// assert_eq!(mesh.element_density(0), 0.5);
/// ```
pub struct MeshBuilder<'a> {
    spec: MeshSpec,
    config: MeshConfig,
    progress: Option<&'a dyn ProgressReporter>,
    relative_densities: Vec<(usize, f64)>,
}

impl<'a> MeshBuilder<'a> {
    /// Builder for `spec` with default configuration and no progress output.
    pub fn new(spec: MeshSpec) -> Self {
        Self {
            spec,
            config: MeshConfig::default(),
            progress: None,
            relative_densities: Vec::new(),
        }
    }

    /// Use `config` for tolerances and octree sizing.
    pub fn config(mut self, config: MeshConfig) -> Self {
        self.config = config;
        self
    }

    /// Report construction progress for large meshes.
    pub fn progress(mut self, reporter: &'a dyn ProgressReporter) -> Self {
        self.progress = Some(reporter);
        self
    }

    /// Scale the density of element `element` relative to its medium.
    pub fn relative_density(mut self, element: usize, factor: f64) -> Self {
        self.relative_densities.push((element, factor));
        self
    }

    /// Validate the description and build the mesh.
    ///
    /// Media named by the description are registered with `media`.
    pub fn build(self, media: &mut MediumRegistry) -> Result<Mesh> {
        let MeshBuilder {
            spec,
            config,
            progress,
            relative_densities,
        } = self;

        let num_elements = spec.elements.len();
        if num_elements == 0 {
            return Err(MeshError::EmptyMesh);
        }
        if num_elements >= MAX_ENTITIES {
            return Err(MeshError::TooManyElements(num_elements));
        }
        if spec.nodes.len() >= MAX_ENTITIES {
            return Err(MeshError::TooManyNodes(spec.nodes.len()));
        }

        let mut node_index = HashMap::with_capacity(spec.nodes.len());
        for (i, node) in spec.nodes.iter().enumerate() {
            if node_index.insert(node.tag, i).is_some() {
                return Err(MeshError::DuplicateNodeTag(node.tag));
            }
        }

        let mut seen_elements = HashSet::with_capacity(num_elements);
        for elt in &spec.elements {
            if !seen_elements.insert(elt.tag) {
                return Err(MeshError::DuplicateElementTag(elt.tag));
            }
        }

        let mut medium_slot = HashMap::with_capacity(spec.media.len());
        for (slot, medium) in spec.media.iter().enumerate() {
            if medium_slot.insert(medium.tag, slot).is_some() {
                return Err(MeshError::DuplicateMediumTag(medium.tag));
            }
        }
        if let Some(elt) = spec
            .elements
            .iter()
            .find(|e| !medium_slot.contains_key(&e.medium_tag))
        {
            return Err(MeshError::MissingMedium(elt.medium_tag));
        }

        let mut elements = Vec::with_capacity(num_elements);
        for elt in &spec.elements {
            let mut nodes = [0usize; 4];
            for (slot, tag) in nodes.iter_mut().zip(elt.nodes) {
                *slot = *node_index.get(&tag).ok_or(MeshError::MissingNode(tag))?;
            }
            elements.push(nodes);
        }

        for elt in &spec.elements {
            for i in 0..4 {
                if elt.nodes[(i + 1)..].contains(&elt.nodes[i]) {
                    return Err(MeshError::DegenerateElement {
                        tag: elt.tag,
                        node: elt.nodes[i],
                    });
                }
            }
        }

        let nodes: Vec<Point3> = spec
            .nodes
            .iter()
            .map(|n| Point3::new(n.x, n.y, n.z))
            .collect();

        let mut volumes = Vec::with_capacity(num_elements);
        for (elt, nodes_of) in spec.elements.iter().zip(&elements) {
            let [a, b, c, d] = nodes_of.map(|i| nodes[i]);
            let volume = tetrahedron_volume(&a, &b, &c, &d);
            if !(volume > 0.0) {
                return Err(MeshError::ZeroVolumeElement(elt.tag));
            }
            volumes.push(volume);
        }

        config.validate()?;
        let mut relative_density = vec![1.0; num_elements];
        for (element, factor) in relative_densities {
            if element >= num_elements {
                return Err(MeshError::InvalidConfig(format!(
                    "relative density given for element {element} of {num_elements}"
                )));
            }
            if !(factor.is_finite() && factor > 0.0) {
                return Err(MeshError::InvalidConfig(format!(
                    "relative density {factor} for element {element} must be positive"
                )));
            }
            relative_density[element] = factor;
        }

        // Everything below works on validated input.
        let reporter = progress.filter(|_| num_elements >= config.progress_threshold);

        let media_snapshot: Vec<_> = spec
            .media
            .iter()
            .map(|m| {
                let index = media.register(&m.name);
                let medium = Medium {
                    name: m.name.clone(),
                    density: media.density(index).unwrap_or(1.0),
                };
                (index, medium)
            })
            .collect();
        let element_media: Vec<usize> = spec
            .elements
            .iter()
            .map(|e| medium_slot[&e.medium_tag])
            .collect();

        let tetrahedra = elements
            .iter()
            .map(|&[a, b, c, d]| Tetrahedron::new(a, b, c, d))
            .collect::<Result<Vec<_>>>()?;
        let neighbours = tetrahedron_neighbours(
            &tetrahedra,
            &mut PercentCounter::new(reporter, "Finding element neighbours"),
        );
        let boundary = boundary_faces(&neighbours);
        let normals = elements
            .iter()
            .map(|e| tetrahedron_face_normals(&e.map(|i| nodes[i])))
            .collect();

        let topology = Topology {
            nodes,
            elements,
            neighbours,
            boundary,
            normals,
        };

        let all: Vec<usize> = (0..num_elements).collect();
        let volume_tree = Octree::build(
            &all,
            &topology,
            config.volume_leaf_elements,
            &mut PercentCounter::new(reporter, "Building volume octree"),
        )?;

        let boundary_elements: Vec<usize> = (0..num_elements)
            .filter(|&i| topology.is_boundary_element(i))
            .collect();
        debug!(
            boundary_elements = boundary_elements.len(),
            "Building surface octree"
        );
        let surface_tree = Octree::build(
            &boundary_elements,
            &topology,
            config.surface_leaf_elements,
            &mut PercentCounter::new(reporter, "Building surface octree"),
        )?;

        let element_tags = spec.elements.iter().map(|e| e.tag).collect();

        let mesh = Mesh {
            topology,
            element_tags,
            element_media,
            media: media_snapshot,
            volumes,
            relative_density,
            volume_tree,
            surface_tree,
            config,
        };
        info!(
            elements = mesh.num_elements(),
            nodes = mesh.num_nodes(),
            boundary_faces = mesh.boundary_face_count(),
            "Built tetrahedral mesh"
        );
        Ok(mesh)
    }
}
