// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ-Lite Model - Shared types and traits for Wavefront OBJ/MTL parsing
//!
//! This crate holds the render-ready output of a parse and the seams a
//! parser needs from its surroundings. Parser backends depend on it, and
//! so do consumers that only read finished models.
//!
//! # Architecture
//!
//! - [`Model`] - Mesh name to [`Mesh`] map, plus the loaded material table
//! - [`Mesh`] - Unwelded vertices, identity indices, mesh type and material
//! - [`Material`] - One entry of a material library
//! - [`ResourceResolver`] - Opens geometry, material and texture resources
//! - [`ModelLoader`] - Entry point implemented by parsers
//! - [`MeshSource`] - Read-only mesh access for renderers
//!
//! # Example
//!
//! ```ignore
//! use obj_lite_model::{MeshSource, ModelLoader};
//!
//! let model = loader.load("crate/crate.obj".as_ref(), &resolver)?;
//! for name in model.mesh_names() {
//!     let mesh = model.mesh(name).unwrap();
//!     println!("{name}: {} vertices ({})", mesh.vertex_count(), mesh.mesh_type());
//! }
//! ```

pub mod error;
pub mod material;
pub mod model;
pub mod resolver;
pub mod traits;
pub mod types;

// Re-export all public types
pub use error::*;
pub use material::*;
pub use model::*;
pub use resolver::*;
pub use traits::*;
pub use types::*;
