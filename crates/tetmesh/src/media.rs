//! Process-wide medium registry.
//!
//! Geometries share one registry and refer to media by index. The registry
//! only grows: indices handed out stay valid for its lifetime.

use std::collections::HashMap;

/// A named material and its nominal density (g/cm^3).
#[derive(Debug, Clone, PartialEq)]
pub struct Medium {
    /// Medium name, unique within the registry.
    pub name: String,
    /// Nominal mass density in g/cm^3.
    pub density: f64,
}

/// Append-only registry mapping medium names to indices.
#[derive(Debug, Clone, Default)]
pub struct MediumRegistry {
    media: Vec<Medium>,
    by_name: HashMap<String, usize>,
}

impl MediumRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`, returning its index.
    ///
    /// Registering a name twice returns the existing index. New media get a
    /// density of 1 g/cm^3.
    pub fn register(&mut self, name: &str) -> usize {
        if let Some(&index) = self.by_name.get(name) {
            return index;
        }
        let index = self.media.len();
        self.media.push(Medium {
            name: name.to_string(),
            density: 1.0,
        });
        self.by_name.insert(name.to_string(), index);
        index
    }

    /// Index of a registered medium.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Name of medium `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.media.get(index).map(|m| m.name.as_str())
    }

    /// Nominal density of medium `index`.
    pub fn density(&self, index: usize) -> Option<f64> {
        self.media.get(index).map(|m| m.density)
    }

    /// Set the nominal density of medium `index`. Returns false for an
    /// unknown index.
    pub fn set_density(&mut self, index: usize, density: f64) -> bool {
        match self.media.get_mut(index) {
            Some(m) => {
                m.density = density;
                true
            }
            None => false,
        }
    }

    /// Medium `index`.
    pub fn get(&self, index: usize) -> Option<&Medium> {
        self.media.get(index)
    }

    /// Number of registered media.
    pub fn len(&self) -> usize {
        self.media.len()
    }

    /// True if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.media.is_empty()
    }
}
