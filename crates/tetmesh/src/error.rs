//! Error types for mesh construction.

use thiserror::Error;

/// Errors that can occur while building a mesh geometry.
///
/// Every variant describes malformed input or configuration. Queries on a
/// constructed mesh never fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The mesh has no elements.
    #[error("mesh has no elements")]
    EmptyMesh,

    /// More elements than a region index can address.
    #[error("too many elements: {0}")]
    TooManyElements(usize),

    /// More nodes than a node index can address.
    #[error("too many nodes: {0}")]
    TooManyNodes(usize),

    /// Two nodes share a tag.
    #[error("duplicate node tag: {0}")]
    DuplicateNodeTag(i64),

    /// Two elements share a tag.
    #[error("duplicate element tag: {0}")]
    DuplicateElementTag(i64),

    /// Two media share a tag.
    #[error("duplicate medium tag: {0}")]
    DuplicateMediumTag(i64),

    /// An element refers to a medium tag that was not declared.
    #[error("No medium with tag: {0}")]
    MissingMedium(i64),

    /// An element refers to a node tag that was not declared.
    #[error("No mesh node with tag: {0}")]
    MissingNode(i64),

    /// A tetrahedron lists the same node index more than once.
    #[error("duplicate node {0}")]
    DuplicateNode(usize),

    /// An element lists the same node tag more than once.
    #[error("element {tag} has duplicate node {node}")]
    DegenerateElement {
        /// Element tag.
        tag: i64,
        /// The repeated node tag.
        node: i64,
    },

    /// An element's four nodes are coplanar.
    #[error("element {0} has zero volume")]
    ZeroVolumeElement(i64),

    /// An octree was requested over no elements.
    #[error("cannot build an octree over zero elements")]
    EmptyOctree,

    /// A scale factor that is not strictly positive and finite.
    #[error("invalid scale factor: {0}")]
    InvalidScale(f64),

    /// Invalid mesh configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for mesh construction.
pub type Result<T> = std::result::Result<T, MeshError>;
