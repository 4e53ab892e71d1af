//! Small meshes shared by the unit tests.

use crate::media::MediumRegistry;
use crate::mesh::Mesh;
use crate::spec::{ElementSpec, MediumSpec, MeshSpec, NodeSpec};

/// Two tetrahedra sharing the face (B, C, D):
/// A=(0,0,0), B=(1,1,0.5), C=(1,1,-0.5), D=(1,-1,0), E=(2,0,0);
/// element 0 = (A,B,C,D), element 1 = (B,C,D,E).
pub fn two_element_spec() -> MeshSpec {
    MeshSpec {
        elements: vec![
            ElementSpec::new(1, 0, [1, 2, 3, 4]),
            ElementSpec::new(2, 0, [2, 3, 4, 5]),
        ],
        nodes: vec![
            NodeSpec::new(1, 0.0, 0.0, 0.0),
            NodeSpec::new(2, 1.0, 1.0, 0.5),
            NodeSpec::new(3, 1.0, 1.0, -0.5),
            NodeSpec::new(4, 1.0, -1.0, 0.0),
            NodeSpec::new(5, 2.0, 0.0, 0.0),
        ],
        media: vec![MediumSpec::new(0, "H2O")],
    }
}

/// A corner tetrahedron at the origin (element 0) with a tetrahedron glued
/// to each of its four faces (elements 1 to 4).
pub fn five_element_spec() -> MeshSpec {
    MeshSpec {
        elements: vec![
            ElementSpec::new(1, 1, [1, 2, 3, 4]),
            ElementSpec::new(2, 1, [1, 2, 4, 5]),
            ElementSpec::new(3, 1, [1, 3, 4, 6]),
            ElementSpec::new(4, 1, [1, 2, 3, 7]),
            ElementSpec::new(5, 1, [2, 3, 4, 8]),
        ],
        nodes: vec![
            NodeSpec::new(1, 0.0, 0.0, 0.0),
            NodeSpec::new(2, 1.0, 0.0, 0.0),
            NodeSpec::new(3, 0.0, 1.0, 0.0),
            NodeSpec::new(4, 0.0, 0.0, 1.0),
            NodeSpec::new(5, 0.0, -1.0, 0.0),
            NodeSpec::new(6, -1.0, 0.0, 0.0),
            NodeSpec::new(7, 0.0, 0.0, -1.0),
            NodeSpec::new(8, 1.0, 1.0, 1.0),
        ],
        media: vec![MediumSpec::new(1, "H2O")],
    }
}

/// A mesh of one tetrahedron with the given vertices.
pub fn single_element_spec(vertices: [[f64; 3]; 4]) -> MeshSpec {
    MeshSpec {
        elements: vec![ElementSpec::new(1, 1, [1, 2, 3, 4])],
        nodes: vertices
            .iter()
            .zip(1..)
            .map(|(v, tag)| NodeSpec::new(tag, v[0], v[1], v[2]))
            .collect(),
        media: vec![MediumSpec::new(1, "H2O")],
    }
}

/// Unit cube split into `n^3` cells of six tetrahedra each (Kuhn
/// subdivision, conforming across cells).
pub fn cube_grid_spec(n: usize) -> MeshSpec {
    const PERMUTATIONS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];
    let side = n + 1;
    let node_tag = |i: usize, j: usize, k: usize| ((i * side + j) * side + k + 1) as i64;
    let h = 1.0 / n as f64;

    let mut nodes = Vec::new();
    for i in 0..side {
        for j in 0..side {
            for k in 0..side {
                nodes.push(NodeSpec::new(node_tag(i, j, k), i as f64 * h, j as f64 * h, k as f64 * h));
            }
        }
    }
    let mut elements = Vec::new();
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                for perm in &PERMUTATIONS {
                    let mut corner = [i, j, k];
                    let mut tags = [node_tag(i, j, k); 4];
                    for (slot, &axis) in perm.iter().enumerate() {
                        corner[axis] += 1;
                        tags[slot + 1] = node_tag(corner[0], corner[1], corner[2]);
                    }
                    elements.push(ElementSpec::new(elements.len() as i64 + 1, 1, tags));
                }
            }
        }
    }
    MeshSpec {
        elements,
        nodes,
        media: vec![MediumSpec::new(1, "WATER")],
    }
}

/// Build `spec` with a fresh registry.
pub fn build(spec: MeshSpec) -> Mesh {
    let mut media = MediumRegistry::new();
    Mesh::new(spec, &mut media).unwrap()
}

pub fn two_element_mesh() -> Mesh {
    build(two_element_spec())
}

pub fn five_element_mesh() -> Mesh {
    build(five_element_spec())
}
