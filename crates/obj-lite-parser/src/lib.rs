// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ-Lite Parser - Wavefront OBJ/MTL parser and mesh assembler
//!
//! This crate turns `.obj` geometry files and their `.mtl` material
//! libraries into the render-ready [`Model`] defined in `obj-lite-model`.
//!
//! # Features
//!
//! - **Strict state machine** - directives out of order fail with the line
//! - **Face references** parsed with `nom` combinators
//! - **Unwelded meshes** - one vertex per face-vertex reference
//! - **Pluggable resolvers** - filesystem, search path, zip archive, memory
//!
//! # Example
//!
//! ```ignore
//! use obj_lite_parser::{FsResolver, WavefrontParser};
//! use obj_lite_model::{MeshSource, ModelLoader};
//!
//! let parser = WavefrontParser::new();
//! let model = parser.load("crate/crate.obj".as_ref(), &FsResolver::default())?;
//!
//! for name in model.mesh_names() {
//!     println!("{name}");
//! }
//! ```

mod assembler;
mod face;
mod material;
mod resolver;
mod state;
mod tokenizer;

pub use face::parse_reference;
pub use material::parse_library;
pub use resolver::{normalize, FsResolver, MemoryResolver, SearchPathResolver, ZipResolver};
pub use state::Phase;
pub use tokenizer::{tokenize, Directive, SourcePos};

use obj_lite_model::{Location, Model, ModelLoader, ParseError, ResourceResolver, Result};
use state::{ParseContext, ParseState};
use std::io::{BufRead, Cursor};
use std::path::Path;
use tokenizer::TokenLine;

/// How face indices are counted across objects
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndexMode {
    /// Indices count every entry declared so far in the file
    #[default]
    Global,
    /// Every `o` restarts indices at 1
    PerObject,
}

/// Wavefront parser implementing `ModelLoader`
///
/// Holds configuration only; every parse owns its own state, so one parser
/// can be shared and reused.
#[derive(Clone, Copy, Debug)]
pub struct WavefrontParser {
    /// Index counting convention for `f` and `l`
    pub index_mode: IndexMode,
    /// Whether every `map_Kd` texture must exist (on by default)
    pub verify_textures: bool,
}

impl Default for WavefrontParser {
    fn default() -> Self {
        Self {
            index_mode: IndexMode::Global,
            verify_textures: true,
        }
    }
}

impl WavefrontParser {
    /// Create a parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the index counting convention
    pub fn with_index_mode(mut self, mode: IndexMode) -> Self {
        self.index_mode = mode;
        self
    }

    /// Set whether texture files are checked through the resolver
    ///
    /// Passing `false` accepts libraries whose textures are missing.
    pub fn with_texture_verification(mut self, enabled: bool) -> Self {
        self.verify_textures = enabled;
        self
    }

    /// Parse geometry text held in memory
    ///
    /// Material libraries are looked up through `resolver`, relative to
    /// `source`.
    pub fn parse_str(
        &self,
        content: &str,
        source: &Path,
        resolver: &dyn ResourceResolver,
    ) -> Result<Model> {
        self.parse_lines(&mut Cursor::new(content.as_bytes()), source, resolver)
    }
}

impl ModelLoader for WavefrontParser {
    fn parse_lines(
        &self,
        reader: &mut dyn BufRead,
        source: &Path,
        resolver: &dyn ResourceResolver,
    ) -> Result<Model> {
        let source_name = source.display().to_string();
        let ctx = ParseContext {
            source,
            source_name: &source_name,
            resolver,
            index_mode: self.index_mode,
            verify_textures: self.verify_textures,
        };

        let mut state = ParseState::new();
        let mut last_line = 0;
        for (i, raw) in reader.lines().enumerate() {
            last_line = i + 1;
            let raw =
                raw.map_err(|err| ParseError::read(err, Location::new(&source_name, last_line)))?;
            if let Some(line) = TokenLine::parse(last_line, &raw) {
                state = state.step(&line, &ctx)?;
            }
        }
        let model = state.finish(&ctx, last_line)?;

        log::info!(
            "Parsed {}: {} meshes, {} vertices, {} materials",
            source_name,
            model.len(),
            model.vertex_count(),
            model.materials().len()
        );
        Ok(model)
    }
}

/// Load a geometry file from the filesystem with default settings
pub fn load(path: impl AsRef<Path>) -> Result<Model> {
    WavefrontParser::new().load(path.as_ref(), &FsResolver::default())
}

/// Parse geometry text with default settings
///
/// No material libraries can be resolved, so `mtllib` fails.
pub fn parse_str(content: &str) -> Result<Model> {
    WavefrontParser::new().parse_str(content, Path::new("<memory>"), &MemoryResolver::new())
}
