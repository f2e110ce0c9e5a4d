// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resource resolver implementations
//!
//! - [`FsResolver`] - plain filesystem, optionally rooted
//! - [`SearchPathResolver`] - first of several roots that has the file
//! - [`ZipResolver`] - entries of a zip archive
//! - [`MemoryResolver`] - in-memory blobs

use obj_lite_model::{ParseError, ResourceResolver, Result};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read, Seek};
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use zip::ZipArchive;

/// Upper bound on the buffer reserved from an entry's declared size
const MAX_RESERVE: usize = 1 << 20;

/// Lexically normalise `id` into a `/`-separated relative path
///
/// `.` components are dropped and `..` removes the previous component.
/// Root and prefix components are discarded, so the result is always
/// relative.
pub fn normalize(id: &Path) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in id.components() {
        match component {
            Component::Normal(part) => {
                if let Some(part) = part.to_str() {
                    parts.push(part);
                }
            }
            Component::ParentDir => {
                parts.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    parts.join("/")
}

// ============================================================================
// Filesystem
// ============================================================================

/// Filesystem resolver
///
/// Relative identifiers are joined to `root`; absolute ones are used as-is.
/// The default root is the process working directory.
#[derive(Clone, Debug, Default)]
pub struct FsResolver {
    root: PathBuf,
}

impl FsResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, id: &Path) -> PathBuf {
        if id.is_absolute() || self.root.as_os_str().is_empty() {
            id.to_path_buf()
        } else {
            self.root.join(id)
        }
    }
}

impl ResourceResolver for FsResolver {
    fn open(&self, id: &Path) -> Result<Box<dyn BufRead>> {
        let path = self.full_path(id);
        let file = File::open(&path)
            .map_err(|err| ParseError::unresolved(path.display(), err.to_string()))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn exists(&self, id: &Path) -> bool {
        self.full_path(id).is_file()
    }
}

/// Resolver trying several filesystem roots in order
#[derive(Clone, Debug, Default)]
pub struct SearchPathResolver {
    roots: Vec<PathBuf>,
}

impl SearchPathResolver {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a root, searched after the existing ones
    pub fn push_root(&mut self, root: impl Into<PathBuf>) {
        self.roots.push(root.into());
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn find(&self, id: &Path) -> Option<PathBuf> {
        if id.is_absolute() {
            return id.is_file().then(|| id.to_path_buf());
        }
        self.roots
            .iter()
            .map(|root| root.join(id))
            .find(|candidate| candidate.is_file())
    }
}

impl ResourceResolver for SearchPathResolver {
    fn open(&self, id: &Path) -> Result<Box<dyn BufRead>> {
        let path = self.find(id).ok_or_else(|| {
            ParseError::unresolved(
                id.display(),
                format!("not found in {} search roots", self.roots.len()),
            )
        })?;
        let file = File::open(&path)
            .map_err(|err| ParseError::unresolved(path.display(), err.to_string()))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn exists(&self, id: &Path) -> bool {
        self.find(id).is_some()
    }
}

// ============================================================================
// Archive
// ============================================================================

/// Resolver over the entries of a zip archive
///
/// Identifiers are archive paths. They are normalised lexically before the
/// lookup, so `models/../textures/a.png` finds `textures/a.png`. Each open
/// reads the whole entry into memory.
pub struct ZipResolver<R: Read + Seek> {
    archive: Mutex<ZipArchive<R>>,
}

impl ZipResolver<BufReader<File>> {
    /// Open an archive on disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|err| ParseError::unresolved(path.display(), err.to_string()))?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> ZipResolver<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)
            .map_err(|err| ParseError::unresolved("<archive>", err.to_string()))?;
        log::debug!("Opened zip archive with {} entries", archive.len());
        Ok(Self {
            archive: Mutex::new(archive),
        })
    }

    /// Names of all file entries
    pub fn entry_names(&self) -> Vec<String> {
        match self.archive.lock() {
            Ok(archive) => archive
                .file_names()
                .filter(|name| !name.ends_with('/'))
                .map(str::to_string)
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl<R: Read + Seek + Send> ResourceResolver for ZipResolver<R> {
    fn open(&self, id: &Path) -> Result<Box<dyn BufRead>> {
        let name = normalize(id);
        let mut archive = self
            .archive
            .lock()
            .map_err(|_| ParseError::unresolved(&name, "archive lock poisoned"))?;
        let mut entry = archive
            .by_name(&name)
            .map_err(|err| ParseError::unresolved(&name, err.to_string()))?;
        let reserve = usize::try_from(entry.size()).map_or(MAX_RESERVE, |n| n.min(MAX_RESERVE));
        let mut data = Vec::with_capacity(reserve);
        entry.read_to_end(&mut data)?;
        Ok(Box::new(Cursor::new(data)))
    }

    fn exists(&self, id: &Path) -> bool {
        let name = normalize(id);
        match self.archive.lock() {
            Ok(archive) => archive.file_names().any(|entry| entry == name),
            Err(_) => false,
        }
    }
}

// ============================================================================
// Memory
// ============================================================================

/// Resolver over in-memory blobs keyed by normalised identifier
#[derive(Clone, Debug, Default)]
pub struct MemoryResolver {
    entries: FxHashMap<String, Vec<u8>>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a resource
    pub fn insert(&mut self, id: impl AsRef<Path>, data: impl Into<Vec<u8>>) {
        self.entries.insert(normalize(id.as_ref()), data.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceResolver for MemoryResolver {
    fn open(&self, id: &Path) -> Result<Box<dyn BufRead>> {
        let data = self
            .entries
            .get(&normalize(id))
            .ok_or_else(|| ParseError::unresolved(id.display(), "no such in-memory resource"))?;
        Ok(Box::new(Cursor::new(data.clone())))
    }

    fn exists(&self, id: &Path) -> bool {
        self.entries.contains_key(&normalize(id))
    }
}
