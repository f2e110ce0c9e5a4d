// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model aggregate - the meshes produced by one parse

use crate::{Aabb, Material, MaterialTable, Mesh, MeshSource};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Parsed geometry file: mesh name -> mesh, plus the loaded materials
///
/// Mesh names are unique; inserting a mesh whose name is already present
/// replaces the earlier one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    meshes: FxHashMap<String, Mesh>,
    materials: MaterialTable,
}

impl Model {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mesh under its own name, returning the mesh it replaced
    pub fn insert(&mut self, mesh: Mesh) -> Option<Mesh> {
        self.meshes.insert(mesh.name().to_string(), mesh)
    }

    /// Replace the material table
    pub fn set_materials(&mut self, materials: MaterialTable) {
        self.materials = materials;
    }

    /// Get a mesh by name
    pub fn get(&self, name: &str) -> Option<&Mesh> {
        self.meshes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.meshes.contains_key(name)
    }

    /// Iterate over all meshes in unspecified order
    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.meshes.values()
    }

    /// Mesh names sorted alphabetically
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.meshes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// All materials loaded while parsing, whether bound or not
    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    /// Get a material by name
    pub fn material(&self, name: &str) -> Option<&Arc<Material>> {
        self.materials.get(name)
    }

    /// Total vertex count over all meshes
    pub fn vertex_count(&self) -> usize {
        self.meshes.values().map(Mesh::vertex_count).sum()
    }

    /// Bounding box over all meshes
    pub fn bounds(&self) -> Option<Aabb> {
        self.meshes
            .values()
            .filter_map(Mesh::bounds)
            .reduce(|a, b| a.merge(&b))
    }

    /// Consume the model, returning the mesh map
    pub fn into_meshes(self) -> FxHashMap<String, Mesh> {
        self.meshes
    }
}

impl MeshSource for Model {
    fn mesh(&self, name: &str) -> Option<&Mesh> {
        self.get(name)
    }

    fn mesh_names(&self) -> Vec<&str> {
        self.names()
    }
}
