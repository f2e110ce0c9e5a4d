// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core traits for loading and consuming models
//!
//! These traits define the seams between the parser and its collaborators.

use crate::{Mesh, Model, ParseError, ResourceResolver, Result};
use std::io::BufRead;
use std::path::Path;

/// Main parsing interface - entry point for turning geometry files into models
///
/// # Example
///
/// ```ignore
/// use obj_lite_model::ModelLoader;
///
/// let loader: Box<dyn ModelLoader> = get_loader();
/// let model = loader.load("crate/crate.obj".as_ref(), &resolver)?;
/// println!("{} meshes", model.len());
/// ```
pub trait ModelLoader: Send + Sync {
    /// Parse an already open line stream
    ///
    /// # Arguments
    /// * `reader` - The geometry file content
    /// * `source` - Identifier of the stream; material libraries are
    ///   resolved relative to it
    /// * `resolver` - Used to open referenced material (and texture) files
    ///
    /// # Returns
    /// The finished `Model`, or the first `ParseError` encountered
    fn parse_lines(
        &self,
        reader: &mut dyn BufRead,
        source: &Path,
        resolver: &dyn ResourceResolver,
    ) -> Result<Model>;

    /// Open `source` through `resolver` and parse it
    fn load(&self, source: &Path, resolver: &dyn ResourceResolver) -> Result<Model> {
        let mut reader = resolver.open(source)?;
        self.parse_lines(&mut *reader, source, resolver)
    }
}

/// Read-only mesh access for the rendering side
pub trait MeshSource {
    /// Get a mesh by name
    fn mesh(&self, name: &str) -> Option<&Mesh>;

    /// All mesh names
    fn mesh_names(&self) -> Vec<&str>;

    /// Get total mesh count
    fn mesh_count(&self) -> usize {
        self.mesh_names().len()
    }

    /// Get mesh or return error
    fn mesh_or_err(&self, name: &str) -> Result<&Mesh> {
        self.mesh(name)
            .ok_or_else(|| ParseError::unresolved(name, "no mesh with this name"))
    }
}
