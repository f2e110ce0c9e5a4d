// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resource resolution trait for geometry, material and texture files

use crate::Result;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Turns a logical resource identifier into a readable line stream
///
/// Identifiers are paths: plain filesystem paths, or paths inside an
/// archive, depending on the implementation. Streams returned by
/// [`open`](ResourceResolver::open) are owned by the caller and closed when
/// dropped.
///
/// # Example
///
/// ```ignore
/// use obj_lite_model::ResourceResolver;
///
/// fn read_first_line(resolver: &dyn ResourceResolver) -> obj_lite_model::Result<String> {
///     let mut reader = resolver.open("models/crate.obj".as_ref())?;
///     let mut line = String::new();
///     reader.read_line(&mut line)?;
///     Ok(line)
/// }
/// ```
pub trait ResourceResolver: Send + Sync {
    /// Open a resource for reading
    ///
    /// # Returns
    /// A buffered reader, or `ParseError::UnresolvedResource` if the
    /// resource cannot be located or opened
    fn open(&self, id: &Path) -> Result<Box<dyn BufRead>>;

    /// Check if a resource exists without opening it
    fn exists(&self, id: &Path) -> bool;

    /// Resolve `name` as referenced from inside the resource `base`
    ///
    /// Absolute names are returned unchanged, relative names are taken
    /// relative to the directory containing `base`.
    fn resolve_relative(&self, base: &Path, name: &str) -> PathBuf {
        resolve_relative(base, name)
    }
}

/// Resolve `name` relative to the directory of `base`
pub fn resolve_relative(base: &Path, name: &str) -> PathBuf {
    let name_path = Path::new(name);
    if name_path.is_absolute() {
        return name_path.to_path_buf();
    }
    match base.parent() {
        Some(dir) => dir.join(name_path),
        None => name_path.to_path_buf(),
    }
}
