//! Octree spatial index over tetrahedral elements.
//!
//! The root box bounds every candidate element. A node is split into its 8
//! octants until it holds fewer than the leaf capacity or its box can no
//! longer be halved in floating point. Each octant keeps the candidates
//! whose tetrahedron touches it, so an element can live in several leaves.
//!
//! Three queries are supported: point location, a lower bound on the
//! distance to the indexed elements, and the nearest boundary face hit by a
//! ray.

use tetmesh_geom::{
    closest_point_tetrahedron, point_in_tetrahedron, tetrahedron_box_intersection,
    triangle_ray_intersection, FACE_VERTICES,
};
use tetmesh_math::{Aabb3, Point3, Ray, Vec3};
use tracing::debug;

use crate::error::{MeshError, Result};
use crate::progress::PercentCounter;

/// Padding added around the root box so that elements on the mesh hull
/// are strictly inside it.
pub const ROOT_PADDING: f64 = 1e-8;

/// Element geometry an octree is built over and queried against.
pub trait ElementGeometry {
    /// The four vertices (A, B, C, D) of `element`.
    fn vertices(&self, element: usize) -> [Point3; 4];

    /// Inward unit normal of face `face` of `element`.
    fn face_normal(&self, element: usize, face: usize) -> Vec3;

    /// True if face `face` of `element` is on the mesh boundary.
    fn is_boundary_face(&self, element: usize, face: usize) -> bool;
}

/// An octree node: a leaf of candidate elements or eight octants.
#[derive(Debug, Clone)]
enum OctreeNode {
    /// Leaf holding every candidate element touching its box.
    Leaf {
        /// Bounds of this node.
        bbox: Aabb3,
        /// Element indices.
        elements: Vec<usize>,
    },
    /// Interior node, children in octant order (+x = 1, +y = 2, +z = 4).
    Branch {
        /// Bounds of this node.
        bbox: Aabb3,
        /// The eight octants.
        children: Box<[OctreeNode; 8]>,
    },
}

impl OctreeNode {
    /// Bounds of this node.
    fn bbox(&self) -> &Aabb3 {
        match self {
            OctreeNode::Leaf { bbox, .. } | OctreeNode::Branch { bbox, .. } => bbox,
        }
    }
}

/// Nearest boundary face struck by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Element owning the face.
    pub element: usize,
    /// Face index within the element.
    pub face: usize,
    /// Distance along the ray.
    pub distance: f64,
}

/// Shape statistics of a built octree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OctreeStats {
    /// Number of leaves.
    pub leaves: usize,
    /// Depth of the deepest leaf; a lone root leaf has depth 0.
    pub max_depth: usize,
    /// Largest candidate count in a leaf.
    pub max_leaf_elements: usize,
}

/// Octree over a set of tetrahedral elements.
#[derive(Debug, Clone)]
pub struct Octree {
    root: OctreeNode,
}

struct Builder<'g, 'p, 'r, G> {
    geometry: &'g G,
    max_leaf_elements: usize,
    progress: &'p mut PercentCounter<'r>,
    root_volume: f64,
    covered_volume: f64,
}

impl<G: ElementGeometry> Builder<'_, '_, '_, G> {
    fn build_node(&mut self, bbox: Aabb3, candidates: Vec<usize>) -> OctreeNode {
        if candidates.len() < self.max_leaf_elements || bbox.is_indivisible() {
            self.covered_volume += bbox.volume();
            self.progress.update(self.covered_volume / self.root_volume);
            return OctreeNode::Leaf {
                bbox,
                elements: candidates,
            };
        }

        let children: [OctreeNode; 8] = std::array::from_fn(|i| {
            let octant = bbox.octant(i);
            let inside: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|&e| tetrahedron_box_intersection(&octant, &self.geometry.vertices(e)))
                .collect();
            self.build_node(octant, inside)
        });

        OctreeNode::Branch {
            bbox,
            children: Box::new(children),
        }
    }
}

impl Octree {
    /// Build an octree over `elements`.
    ///
    /// Leaves hold fewer than `max_leaf_elements` candidates unless their
    /// box is indivisible. Progress is the fraction of the root volume
    /// covered by finished leaves.
    pub fn build<G: ElementGeometry>(
        elements: &[usize],
        geometry: &G,
        max_leaf_elements: usize,
        progress: &mut PercentCounter<'_>,
    ) -> Result<Self> {
        if elements.is_empty() {
            return Err(MeshError::EmptyOctree);
        }

        let mut bbox = Aabb3::from_points(elements.iter().flat_map(|&e| geometry.vertices(e)));
        bbox.expand(ROOT_PADDING);

        let mut builder = Builder {
            geometry,
            max_leaf_elements,
            progress,
            root_volume: bbox.volume(),
            covered_volume: 0.0,
        };
        let root = builder.build_node(bbox, elements.to_vec());
        builder.progress.finish();

        let octree = Self { root };
        let stats = octree.stats();
        debug!(
            elements = elements.len(),
            leaves = stats.leaves,
            max_depth = stats.max_depth,
            max_leaf_elements = stats.max_leaf_elements,
            "Built octree"
        );
        Ok(octree)
    }

    /// Bounds of the root node.
    pub fn bounding_box(&self) -> &Aabb3 {
        self.root.bbox()
    }

    /// Leaf count, depth and fill of the tree.
    pub fn stats(&self) -> OctreeStats {
        fn visit(node: &OctreeNode, depth: usize, stats: &mut OctreeStats) {
            match node {
                OctreeNode::Leaf { elements, .. } => {
                    stats.leaves += 1;
                    stats.max_depth = stats.max_depth.max(depth);
                    stats.max_leaf_elements = stats.max_leaf_elements.max(elements.len());
                }
                OctreeNode::Branch { children, .. } => {
                    for child in children.iter() {
                        visit(child, depth + 1, stats);
                    }
                }
            }
        }
        let mut stats = OctreeStats::default();
        visit(&self.root, 0, &mut stats);
        stats
    }

    /// Leaf owning `p`, which must be inside the root box.
    fn leaf_for(&self, p: &Point3) -> (&Aabb3, &[usize]) {
        let mut node = &self.root;
        loop {
            match node {
                OctreeNode::Branch { bbox, children } => node = &children[bbox.octant_index(p)],
                OctreeNode::Leaf { bbox, elements } => return (bbox, elements),
            }
        }
    }

    /// Element containing `p`, if any.
    ///
    /// Points on a face shared by two elements resolve to whichever the
    /// leaf lists first.
    pub fn locate<G: ElementGeometry>(&self, p: &Point3, geometry: &G) -> Option<usize> {
        if !self.bounding_box().contains(p) {
            return None;
        }
        let (_, elements) = self.leaf_for(p);
        elements.iter().copied().find(|&e| {
            let [a, b, c, d] = geometry.vertices(e);
            point_in_tetrahedron(p, &a, &b, &c, &d)
        })
    }

    /// Lower bound on the distance from `p` to the indexed elements.
    ///
    /// Outside the root box this is the distance to the box. Inside it is
    /// the nearest candidate of the owning leaf, capped by the distance to
    /// that leaf's walls: anything nearer would have to lie in the leaf.
    pub fn hownear_exterior<G: ElementGeometry>(&self, p: &Point3, geometry: &G) -> f64 {
        let root_box = self.bounding_box();
        if !root_box.contains(p) {
            return root_box.distance_to(p);
        }
        let (bbox, elements) = self.leaf_for(p);
        let mut best_sq = f64::INFINITY;
        for &e in elements {
            let [a, b, c, d] = geometry.vertices(e);
            let q = closest_point_tetrahedron(p, &a, &b, &c, &d);
            best_sq = best_sq.min((q - p).norm_squared());
        }
        best_sq.sqrt().min(bbox.min_interior_distance(p))
    }

    /// Nearest boundary face that `ray` enters from outside, closer than
    /// `max_distance`.
    ///
    /// A face counts only when the ray origin is strictly on its outer side
    /// and the ray heads into the element.
    pub fn ray_hit<G: ElementGeometry>(
        &self,
        ray: &Ray,
        max_distance: f64,
        geometry: &G,
    ) -> Option<RayHit> {
        let (t_entry, _) = self.bounding_box().ray_entry(ray)?;
        if t_entry >= max_distance {
            return None;
        }
        let mut closest = None;
        let mut closest_t = max_distance;
        ray_node(&self.root, ray, geometry, &mut closest, &mut closest_t);
        closest
    }
}

fn ray_node<G: ElementGeometry>(
    node: &OctreeNode,
    ray: &Ray,
    geometry: &G,
    closest: &mut Option<RayHit>,
    closest_t: &mut f64,
) {
    match node {
        OctreeNode::Leaf { elements, .. } => {
            for &e in elements {
                ray_element(e, ray, geometry, closest, closest_t);
            }
        }
        OctreeNode::Branch { bbox, children } => {
            let Some((_, entry)) = bbox.ray_entry(ray) else {
                return;
            };
            // The octant holding the entry point goes first, the rest by
            // increasing entry distance.
            let first = bbox.octant_index(&entry);
            let mut order: Vec<(bool, f64, usize)> = children
                .iter()
                .enumerate()
                .filter_map(|(i, child)| {
                    ray.intersect_aabb(child.bbox())
                        .map(|(t_min, _)| (i != first, t_min, i))
                })
                .collect();
            order.sort_by(|a, b| {
                a.0.cmp(&b.0)
                    .then(a.1.total_cmp(&b.1))
                    .then(a.2.cmp(&b.2))
            });

            for (_, t_min, i) in order {
                if t_min >= *closest_t {
                    continue;
                }
                ray_node(&children[i], ray, geometry, closest, closest_t);
            }
        }
    }
}

fn ray_element<G: ElementGeometry>(
    element: usize,
    ray: &Ray,
    geometry: &G,
    closest: &mut Option<RayHit>,
    closest_t: &mut f64,
) {
    let vertices = geometry.vertices(element);
    for (face, &[i, j, k]) in FACE_VERTICES.iter().enumerate() {
        if !geometry.is_boundary_face(element, face) {
            continue;
        }
        let normal = geometry.face_normal(element, face);
        if (ray.origin - vertices[i]).dot(&normal) >= 0.0 {
            continue;
        }
        if ray.direction.dot(&normal) <= 0.0 {
            continue;
        }
        let hit = triangle_ray_intersection(
            &ray.origin,
            ray.direction.as_ref(),
            &vertices[i],
            &vertices[j],
            &vertices[k],
        );
        if let Some(t) = hit {
            if t < *closest_t {
                *closest_t = t;
                *closest = Some(RayHit {
                    element,
                    face,
                    distance: t,
                });
            }
        }
    }
}
