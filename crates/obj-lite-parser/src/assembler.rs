// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh assembly: expands pending face-vertex references into vertices

use crate::tokenizer::SourcePos;
use obj_lite_model::{
    Attribute, FaceIndex, Material, Mesh, MeshType, Normal, ParseError, Position, Result,
    TexCoord, Vertex,
};
use std::sync::Arc;

/// Attribute pools of the current object
#[derive(Clone, Debug, Default)]
pub struct Pools {
    pub positions: Vec<Position>,
    pub normals: Vec<Normal>,
    pub tex_coords: Vec<TexCoord>,
}

impl Pools {
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.tex_coords.clear();
    }
}

/// Mesh being collected between two boundaries
#[derive(Clone, Debug, Default)]
pub struct PendingMesh {
    pub group: Option<String>,
    pub material: Option<Arc<Material>>,
    pub mesh_type: MeshType,
    /// Pool-local references in traversal order
    pub refs: Vec<FaceIndex>,
    pub primitive_sizes: Vec<u32>,
}

impl PendingMesh {
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Append one `f` or `l` directive
    pub fn push_primitive(&mut self, mesh_type: MeshType, refs: Vec<FaceIndex>) {
        if !self.is_empty() && self.mesh_type != mesh_type {
            log::warn!(
                "Mixing {} and {} primitives in one mesh, keeping {}",
                self.mesh_type,
                mesh_type,
                mesh_type
            );
        }
        self.mesh_type = mesh_type;
        self.primitive_sizes.push(refs.len() as u32);
        self.refs.extend(refs);
    }
}

fn lookup<T: Copy>(
    pool: &[T],
    index: u32,
    attribute: Attribute,
    pos: SourcePos<'_>,
) -> Result<T> {
    pool.get(index as usize)
        .copied()
        .ok_or_else(|| ParseError::IndexOutOfRange {
            attribute,
            index: index as usize + 1,
            available: pool.len(),
            location: pos.location(),
        })
}

/// Build an immutable mesh from the pending references
///
/// Each reference becomes its own vertex; nothing is shared or welded.
/// `pos` is the boundary line that closed the mesh.
pub fn assemble(
    name: String,
    pending: PendingMesh,
    pools: &Pools,
    pos: SourcePos<'_>,
) -> Result<Mesh> {
    let vertices = pending
        .refs
        .iter()
        .map(|r| {
            Ok(Vertex {
                position: lookup(&pools.positions, r.position, Attribute::Position, pos)?,
                normal: r
                    .normal
                    .map(|n| lookup(&pools.normals, n, Attribute::Normal, pos))
                    .transpose()?,
                tex_coord: r
                    .tex_coord
                    .map(|t| lookup(&pools.tex_coords, t, Attribute::TexCoord, pos))
                    .transpose()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Mesh::new(
        name,
        vertices,
        pending.primitive_sizes,
        pending.mesh_type,
        pending.material,
    ))
}
