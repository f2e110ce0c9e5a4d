// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry parser state machine
//!
//! One [`ParseState`] value owns everything a parse accumulates and is
//! moved through [`ParseState::step`] once per tokenized line. Legality of
//! a directive depends only on the current [`Phase`].

use crate::assembler::{assemble, PendingMesh, Pools};
use crate::face::{parse_face, parse_line, IndexWindow, PoolWindows};
use crate::material::{load_library, merge_into};
use crate::tokenizer::{parse_vector, Arity, Directive, SourcePos, TokenLine};
use crate::IndexMode;
use obj_lite_model::{
    FaceIndex, Material, MaterialTable, MeshType, Model, ParseError, ResourceResolver, Result,
};
use std::path::Path;
use std::sync::Arc;

/// Parser phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    /// Before the first `o`; only `mtllib` and `o` are legal
    #[default]
    Init,
    /// Declaring the current object's attribute pools
    ProcessGeometry,
    /// Collecting faces or lines into the pending mesh
    ProcessFaces,
    /// Input exhausted, model finished
    Done,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Init => "Init",
            Phase::ProcessGeometry => "ProcessGeometry",
            Phase::ProcessFaces => "ProcessFaces",
            Phase::Done => "Done",
        }
    }
}

/// Read-only inputs shared by every transition of one parse
pub struct ParseContext<'a> {
    /// Identifier of the geometry stream
    pub source: &'a Path,
    /// `source` rendered for error locations
    pub source_name: &'a str,
    pub resolver: &'a dyn ResourceResolver,
    pub index_mode: IndexMode,
    pub verify_textures: bool,
}

/// Pool entries declared by objects before the current one
#[derive(Clone, Copy, Debug, Default)]
struct Offsets {
    positions: u32,
    normals: u32,
    tex_coords: u32,
}

/// Complete state of one geometry parse
#[derive(Debug, Default)]
pub struct ParseState {
    phase: Phase,
    pools: Pools,
    offsets: Offsets,
    object: String,
    meshes_in_object: usize,
    pending: PendingMesh,
    active_material: Option<Arc<Material>>,
    materials: MaterialTable,
    model: Model,
}

impl ParseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one line, returning the next state
    pub fn step(mut self, line: &TokenLine<'_>, ctx: &ParseContext<'_>) -> Result<Self> {
        let pos = SourcePos::new(ctx.source_name, line.number);
        let directive = Directive::parse(line.keyword);

        match (self.phase, directive) {
            (Phase::Init, Directive::MaterialLibrary) => {
                self.load_libraries(line, ctx, pos)?;
            }
            (Phase::Init | Phase::ProcessFaces, Directive::Object) => {
                Arity::AtLeast(1).check(line.keyword, &line.args, pos)?;
                self.start_object(line.joined_args(), ctx, pos)?;
            }

            (Phase::ProcessGeometry, Directive::Vertex) => {
                let v = parse_vector(line.keyword, &line.args, Arity::AtLeast(3), pos)?;
                self.pools.positions.push(v);
            }
            (Phase::ProcessGeometry, Directive::Normal) => {
                let n = parse_vector(line.keyword, &line.args, Arity::Exactly(3), pos)?;
                self.pools.normals.push(n);
            }
            (Phase::ProcessGeometry, Directive::TexCoord) => {
                let t = parse_vector(line.keyword, &line.args, Arity::Between(2, 3), pos)?;
                self.pools.tex_coords.push(t);
            }

            (Phase::ProcessGeometry | Phase::ProcessFaces, Directive::Face) => {
                let refs = parse_face(&line.args, pos)?;
                self.push_primitive(MeshType::Polygon, refs, pos)?;
            }
            (Phase::ProcessGeometry | Phase::ProcessFaces, Directive::Line) => {
                let refs = parse_line(&line.args, pos)?;
                self.push_primitive(MeshType::Polyline, refs, pos)?;
            }
            (Phase::ProcessGeometry | Phase::ProcessFaces, Directive::Group) => {
                let group = (!line.args.is_empty()).then(|| line.joined_args());
                self.start_group(group, pos)?;
            }
            (Phase::ProcessGeometry | Phase::ProcessFaces, Directive::UseMaterial) => {
                Arity::AtLeast(1).check(line.keyword, &line.args, pos)?;
                self.use_material(&line.joined_args(), pos)?;
            }
            (Phase::ProcessGeometry | Phase::ProcessFaces, Directive::Smoothing) => {}

            (phase, directive) => {
                return Err(ParseError::illegal(
                    directive.keyword(),
                    phase.name(),
                    pos.location(),
                ));
            }
        }
        Ok(self)
    }

    /// Flush the last mesh and hand over the model
    ///
    /// `last_line` is the number of the final line read.
    pub fn finish(mut self, ctx: &ParseContext<'_>, last_line: usize) -> Result<Model> {
        self.flush(SourcePos::new(ctx.source_name, last_line))?;
        self.phase = Phase::Done;
        self.model.set_materials(self.materials);
        Ok(self.model)
    }

    fn load_libraries(
        &mut self,
        line: &TokenLine<'_>,
        ctx: &ParseContext<'_>,
        pos: SourcePos<'_>,
    ) -> Result<()> {
        Arity::AtLeast(1).check(line.keyword, &line.args, pos)?;
        for name in &line.args {
            let path = ctx.resolver.resolve_relative(ctx.source, name);
            let materials = load_library(ctx.resolver, &path, ctx.verify_textures)?;
            merge_into(&mut self.materials, materials);
        }
        Ok(())
    }

    fn start_object(
        &mut self,
        name: String,
        ctx: &ParseContext<'_>,
        pos: SourcePos<'_>,
    ) -> Result<()> {
        self.flush(pos)?;
        if ctx.index_mode == IndexMode::Global {
            self.offsets.positions += self.pools.positions.len() as u32;
            self.offsets.normals += self.pools.normals.len() as u32;
            self.offsets.tex_coords += self.pools.tex_coords.len() as u32;
        }
        self.pools.clear();
        self.object = name;
        self.meshes_in_object = 0;
        self.active_material = None;
        self.pending = PendingMesh::default();
        self.phase = Phase::ProcessGeometry;
        Ok(())
    }

    fn start_group(&mut self, group: Option<String>, pos: SourcePos<'_>) -> Result<()> {
        self.flush(pos)?;
        self.pending.group = group;
        self.phase = Phase::ProcessFaces;
        Ok(())
    }

    fn use_material(&mut self, name: &str, pos: SourcePos<'_>) -> Result<()> {
        let material = self
            .materials
            .get(name)
            .cloned()
            .ok_or_else(|| ParseError::UnresolvedMaterialReference {
                name: name.to_string(),
                location: pos.location(),
            })?;
        if !self.pending.is_empty() {
            self.flush(pos)?;
            self.pending.group = None;
        }
        self.pending.material = Some(Arc::clone(&material));
        self.active_material = Some(material);
        self.phase = Phase::ProcessFaces;
        Ok(())
    }

    fn push_primitive(
        &mut self,
        mesh_type: MeshType,
        refs: Vec<FaceIndex>,
        pos: SourcePos<'_>,
    ) -> Result<()> {
        let windows = self.windows();
        let local = refs
            .into_iter()
            .map(|r| windows.localize(r, pos))
            .collect::<Result<Vec<_>>>()?;
        self.pending.push_primitive(mesh_type, local);
        self.phase = Phase::ProcessFaces;
        Ok(())
    }

    fn windows(&self) -> PoolWindows {
        PoolWindows {
            positions: IndexWindow {
                offset: self.offsets.positions,
                len: self.pools.positions.len() as u32,
            },
            normals: IndexWindow {
                offset: self.offsets.normals,
                len: self.pools.normals.len() as u32,
            },
            tex_coords: IndexWindow {
                offset: self.offsets.tex_coords,
                len: self.pools.tex_coords.len() as u32,
            },
        }
    }

    fn mesh_name(&self, group: Option<&str>) -> String {
        match group {
            Some(group) => format!("{}_{}", self.object, group),
            None if self.meshes_in_object == 0 => self.object.clone(),
            None => format!("{}_{}", self.object, self.meshes_in_object),
        }
    }

    /// Assemble the pending mesh into the model
    ///
    /// An empty pending mesh is left in place so the next boundary can
    /// rename or re-bind it. A non-empty one is replaced by a fresh mesh
    /// carrying the active material.
    fn flush(&mut self, pos: SourcePos<'_>) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let fresh = PendingMesh {
            material: self.active_material.clone(),
            ..PendingMesh::default()
        };
        let pending = std::mem::replace(&mut self.pending, fresh);
        let name = self.mesh_name(pending.group.as_deref());
        let mesh = assemble(name, pending, &self.pools, pos)?;
        log::debug!(
            "Assembled {} mesh '{}' ({} vertices)",
            mesh.mesh_type(),
            mesh.name(),
            mesh.vertex_count()
        );
        if let Some(previous) = self.model.insert(mesh) {
            log::warn!(
                "Mesh '{}' defined more than once, keeping the last definition",
                previous.name()
            );
        }
        self.meshes_in_object += 1;
        Ok(())
    }
}
