// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for unwelded mesh data
//!
//! This module defines the geometry records produced by the parser: face
//! index records, fully resolved vertices and the immutable [`Mesh`].

use crate::Material;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Vertex position [x, y, z]
pub type Position = [f32; 3];

/// Vertex normal [x, y, z]
pub type Normal = [f32; 3];

/// Texture coordinate [u, v, w]; `w` is 0.0 when the file gives only two
pub type TexCoord = [f32; 3];

/// One face-vertex reference with 0-based indices
///
/// Indices are converted from the file's 1-based convention when the
/// record is parsed. The position index is always present.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FaceIndex {
    pub position: u32,
    pub tex_coord: Option<u32>,
    pub normal: Option<u32>,
}

impl FaceIndex {
    /// Position-only reference
    pub fn position(position: u32) -> Self {
        Self {
            position,
            tex_coord: None,
            normal: None,
        }
    }

    /// Set the texture coordinate index
    pub fn with_tex_coord(mut self, index: u32) -> Self {
        self.tex_coord = Some(index);
        self
    }

    /// Set the normal index
    pub fn with_normal(mut self, index: u32) -> Self {
        self.normal = Some(index);
        self
    }
}

/// A fully expanded vertex
///
/// Produced by dereferencing one [`FaceIndex`] against the geometry pools.
/// Vertices are never shared between meshes.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Position,
    pub normal: Option<Normal>,
    pub tex_coord: Option<TexCoord>,
}

impl Vertex {
    /// Create a vertex with only a position
    pub fn new(position: Position) -> Self {
        Self {
            position,
            normal: None,
            tex_coord: None,
        }
    }
}

/// Primitive kind of a mesh
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum MeshType {
    /// Faces from `f` directives
    #[default]
    Polygon,
    /// Line strips from `l` directives
    Polyline,
}

impl fmt::Display for MeshType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshType::Polygon => f.write_str("polygon"),
            MeshType::Polyline => f.write_str("polyline"),
        }
    }
}

/// Immutable, render-ready mesh
///
/// Holds one vertex per face-vertex reference in face-traversal order. The
/// index sequence is the identity `0..vertex_count`, kept so the shape
/// matches formats that share vertices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    name: String,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    /// Vertices contributed by each `f`/`l` directive, in order
    primitive_sizes: Vec<u32>,
    mesh_type: MeshType,
    material: Option<Arc<Material>>,
}

impl Mesh {
    /// Create a mesh and its identity index sequence
    ///
    /// # Panics
    ///
    /// Panics if `primitive_sizes` does not sum to `vertices.len()`.
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vertex>,
        primitive_sizes: Vec<u32>,
        mesh_type: MeshType,
        material: Option<Arc<Material>>,
    ) -> Self {
        let covered: usize = primitive_sizes.iter().map(|&n| n as usize).sum();
        assert_eq!(
            covered,
            vertices.len(),
            "primitive sizes of mesh must cover every vertex"
        );
        let indices = (0..vertices.len() as u32).collect();
        Self {
            name: name.into(),
            vertices,
            indices,
            primitive_sizes,
            mesh_type,
            material,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn primitive_sizes(&self) -> &[u32] {
        &self.primitive_sizes
    }

    pub fn mesh_type(&self) -> MeshType {
        self.mesh_type
    }

    pub fn material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Check if mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of faces or line strips
    pub fn primitive_count(&self) -> usize {
        self.primitive_sizes.len()
    }

    /// Whether any vertex carries a normal
    pub fn has_normals(&self) -> bool {
        self.vertices.iter().any(|v| v.normal.is_some())
    }

    /// Whether any vertex carries a texture coordinate
    pub fn has_tex_coords(&self) -> bool {
        self.vertices.iter().any(|v| v.tex_coord.is_some())
    }

    /// Positions as flattened [x, y, z, x, y, z, ...]
    pub fn flat_positions(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.position).collect()
    }

    /// Normals as flattened [nx, ny, nz, ...]
    ///
    /// `None` when no vertex has a normal; vertices without one get zeros.
    pub fn flat_normals(&self) -> Option<Vec<f32>> {
        if !self.has_normals() {
            return None;
        }
        Some(
            self.vertices
                .iter()
                .flat_map(|v| v.normal.unwrap_or_default())
                .collect(),
        )
    }

    /// Texture coordinates as flattened [u, v, w, ...]
    ///
    /// `None` when no vertex has one; vertices without one get zeros.
    pub fn flat_tex_coords(&self) -> Option<Vec<f32>> {
        if !self.has_tex_coords() {
            return None;
        }
        Some(
            self.vertices
                .iter()
                .flat_map(|v| v.tex_coord.unwrap_or_default())
                .collect(),
        )
    }

    /// Triangle list from fan-triangulating every polygon
    ///
    /// Empty for polyline meshes.
    pub fn triangle_indices(&self) -> Vec<u32> {
        if self.mesh_type != MeshType::Polygon {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(self.vertices.len() * 3);
        let mut start = 0u32;
        for &size in &self.primitive_sizes {
            for i in 1..size.saturating_sub(1) {
                out.extend_from_slice(&[start, start + i, start + i + 1]);
            }
            start += size;
        }
        out
    }

    /// Segment list (pairs of indices) from every line strip
    ///
    /// Empty for polygon meshes.
    pub fn line_indices(&self) -> Vec<u32> {
        if self.mesh_type != MeshType::Polyline {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(self.vertices.len() * 2);
        let mut start = 0u32;
        for &size in &self.primitive_sizes {
            for i in 0..size.saturating_sub(1) {
                out.extend_from_slice(&[start + i, start + i + 1]);
            }
            start += size;
        }
        out
    }

    /// Bounding box of all vertex positions
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_positions(self.vertices.iter().map(|v| &v.position))
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    /// Bounds of a set of positions, `None` if there are none
    pub fn from_positions<'a>(positions: impl IntoIterator<Item = &'a Position>) -> Option<Self> {
        let mut iter = positions.into_iter().map(|p| Point3::from(*p));
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));
        Some(Self { min, max })
    }

    /// Smallest box containing both boxes
    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Size along each axis
    pub fn extent(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Point3<f32> {
        self.min + self.extent() * 0.5
    }
}
