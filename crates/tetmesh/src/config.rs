//! Tolerances and octree sizing for mesh construction.

use serde::{Deserialize, Serialize};

use crate::error::{MeshError, Result};

/// Mesh construction and tracking parameters.
///
/// Lengths are in centimetres. Fields missing from a TOML document take
/// their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Smallest distance `howfar` returns when a region change happens.
    pub min_step: f64,
    /// How far outside a face plane a particle may drift before it is
    /// considered lost.
    pub thick_plane_tolerance: f64,
    /// Maximum candidates per leaf of the volume octree.
    ///
    /// Keep this above the largest number of elements sharing a node:
    /// boxes around such a node cannot get below the capacity and are split
    /// down to floating point resolution.
    pub volume_leaf_elements: usize,
    /// Maximum candidates per leaf of the boundary octree.
    pub surface_leaf_elements: usize,
    /// Element count from which construction progress is reported.
    pub progress_threshold: usize,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            min_step: 1e-10,
            thick_plane_tolerance: 1e-10,
            volume_leaf_elements: 200,
            surface_leaf_elements: 100,
            progress_threshold: 50_000,
        }
    }
}

impl MeshConfig {
    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| MeshError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_step.is_finite() && self.min_step > 0.0) {
            return Err(MeshError::InvalidConfig(
                "min_step must be positive and finite".into(),
            ));
        }
        if !(self.thick_plane_tolerance.is_finite() && self.thick_plane_tolerance >= 0.0) {
            return Err(MeshError::InvalidConfig(
                "thick_plane_tolerance must be non-negative and finite".into(),
            ));
        }
        if self.volume_leaf_elements < 2 || self.surface_leaf_elements < 2 {
            return Err(MeshError::InvalidConfig(
                "octree leaf capacities must be at least 2".into(),
            ));
        }
        Ok(())
    }
}
