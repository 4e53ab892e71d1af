//! Raw mesh description as produced by a mesh file parser.
//!
//! Everything is addressed by the tags used in the source file. The mesh
//! constructor validates the description and remaps tags to indices.

use serde::{Deserialize, Serialize};

use crate::error::{MeshError, Result};

/// One tetrahedral element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    /// Unique element tag.
    pub tag: i64,
    /// Tag of the element's medium.
    pub medium_tag: i64,
    /// Tags of the four nodes (A, B, C, D).
    pub nodes: [i64; 4],
}

/// One mesh node, coordinates in cm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Unique node tag.
    pub tag: i64,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

/// One medium declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediumSpec {
    /// Unique medium tag.
    pub tag: i64,
    /// Medium name, as registered with the medium registry.
    pub name: String,
}

/// A complete raw mesh: elements, nodes and media in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshSpec {
    /// Elements; element `i` becomes region `i`.
    pub elements: Vec<ElementSpec>,
    /// Nodes.
    pub nodes: Vec<NodeSpec>,
    /// Media.
    pub media: Vec<MediumSpec>,
}

impl ElementSpec {
    /// Element with the given tag, medium tag and node tags.
    pub fn new(tag: i64, medium_tag: i64, nodes: [i64; 4]) -> Self {
        Self {
            tag,
            medium_tag,
            nodes,
        }
    }
}

impl NodeSpec {
    /// Node with the given tag and coordinates.
    pub fn new(tag: i64, x: f64, y: f64, z: f64) -> Self {
        Self { tag, x, y, z }
    }
}

impl MediumSpec {
    /// Medium with the given tag and name.
    pub fn new(tag: i64, name: impl Into<String>) -> Self {
        Self {
            tag,
            name: name.into(),
        }
    }
}

impl MeshSpec {
    /// Parse a JSON mesh description.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Multiply every node coordinate by `factor`.
    ///
    /// Converts meshes written in other length units to centimetres.
    pub fn scale(&mut self, factor: f64) -> Result<()> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(MeshError::InvalidScale(factor));
        }
        for node in &mut self.nodes {
            node.x *= factor;
            node.y *= factor;
            node.z *= factor;
        }
        Ok(())
    }
}
