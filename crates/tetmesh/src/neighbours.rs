//! Element adjacency.
//!
//! Two tetrahedra are neighbours across face `f` when they share that face's
//! three nodes. Faces are compared as sorted node triples, so the node order
//! inside an element does not matter.

use crate::error::{MeshError, Result};
use crate::progress::PercentCounter;
use tetmesh_geom::FACE_VERTICES;

/// Three node indices, sorted ascending.
pub type Face = [usize; 3];

/// A tetrahedron by node indices, with its faces precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tetrahedron {
    nodes: [usize; 4],
    faces: [Face; 4],
}

impl Tetrahedron {
    /// Tetrahedron over nodes (A, B, C, D). Repeated node indices are an
    /// error.
    pub fn new(a: usize, b: usize, c: usize, d: usize) -> Result<Self> {
        let nodes = [a, b, c, d];
        for i in 0..4 {
            for j in (i + 1)..4 {
                if nodes[i] == nodes[j] {
                    return Err(MeshError::DuplicateNode(nodes[i]));
                }
            }
        }
        let faces = FACE_VERTICES.map(|[i, j, k]| {
            let mut face = [nodes[i], nodes[j], nodes[k]];
            face.sort_unstable();
            face
        });
        Ok(Self { nodes, faces })
    }

    /// Node indices in input order.
    pub fn nodes(&self) -> [usize; 4] {
        self.nodes
    }

    /// Sorted face `f`, opposite node `f`.
    pub fn face(&self, f: usize) -> Face {
        self.faces[f]
    }

    /// Which of this tetrahedron's faces equals `face`, if any.
    pub fn face_index(&self, face: &Face) -> Option<usize> {
        self.faces.iter().position(|candidate| candidate == face)
    }
}

/// For each node index, the elements using it.
pub fn elements_around_nodes(elements: &[Tetrahedron], num_nodes: usize) -> Vec<Vec<usize>> {
    let mut around = vec![Vec::new(); num_nodes];
    for (i, elt) in elements.iter().enumerate() {
        for node in elt.nodes {
            around[node].push(i);
        }
    }
    around
}

/// Neighbour of every face of every element, `None` on the mesh boundary.
///
/// A face shared by more than two elements is malformed input; the result
/// is then unspecified but construction still completes.
pub fn tetrahedron_neighbours(
    elements: &[Tetrahedron],
    progress: &mut PercentCounter<'_>,
) -> Vec<[Option<usize>; 4]> {
    let num_nodes = elements
        .iter()
        .flat_map(|e| e.nodes)
        .max()
        .map_or(0, |n| n + 1);
    let around = elements_around_nodes(elements, num_nodes);

    let mut neighbours = vec![[None; 4]; elements.len()];
    for (i, elt) in elements.iter().enumerate() {
        progress.update_count(i, elements.len());
        for f in 0..4 {
            if neighbours[i][f].is_some() {
                continue;
            }
            let face = elt.faces[f];
            for &j in &around[face[0]] {
                if j == i {
                    continue;
                }
                if let Some(g) = elements[j].face_index(&face) {
                    neighbours[i][f] = Some(j);
                    neighbours[j][g] = Some(i);
                    break;
                }
            }
        }
    }
    progress.finish();
    neighbours
}

/// Flat per-face boundary flags, `4 * element + face`.
pub fn boundary_faces(neighbours: &[[Option<usize>; 4]]) -> Vec<bool> {
    neighbours
        .iter()
        .flat_map(|slots| slots.map(|n| n.is_none()))
        .collect()
}
