//! Blueprint filesystem abstraction.
//!
//! Blueprints are loaded either from assets embedded at build time
//! (production) or from a directory on disk (tests, user-supplied trees).
//! Both sit behind the read-only [`BlueprintSource`] trait so the store and
//! the materializer never care which one they are talking to.
//!
//! Paths handed to a source are always `/`-separated and relative to the
//! blueprint tree root; the empty string names the root itself.

use rust_embed::RustEmbed;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::error::{GoforgeError, Result};

/// One entry of a blueprint tree directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Read-only view over a blueprint tree.
pub trait BlueprintSource: Send + Sync {
    /// Read a file's bytes.
    fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// List the immediate children of a directory, sorted by name.
    fn read_dir(&self, path: &str) -> Result<Vec<SourceEntry>>;
}

/// Default blueprint assets compiled into the binary.
#[derive(RustEmbed)]
#[folder = "blueprints/"]
pub struct BundledBlueprints;

/// Source over a `rust-embed` asset struct.
pub struct EmbeddedSource<E: RustEmbed> {
    _assets: PhantomData<E>,
}

impl<E: RustEmbed> EmbeddedSource<E> {
    pub fn new() -> Self {
        Self {
            _assets: PhantomData,
        }
    }
}

impl<E: RustEmbed> Default for EmbeddedSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddedSource<BundledBlueprints> {
    /// The blueprint set shipped with goforge.
    pub fn bundled() -> Self {
        Self::new()
    }
}

impl<E: RustEmbed + Send + Sync> BlueprintSource for EmbeddedSource<E> {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        E::get(path)
            .map(|file| file.data.into_owned())
            .ok_or_else(|| {
                GoforgeError::filesystem(
                    path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no such embedded asset"),
                )
            })
    }

    fn read_dir(&self, path: &str) -> Result<Vec<SourceEntry>> {
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path.trim_end_matches('/'))
        };

        // Embedded assets enumerate files only; directories are implied by
        // the path components in between.
        let mut children: BTreeMap<String, bool> = BTreeMap::new();
        for asset in E::iter() {
            let Some(rest) = asset.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    children.insert(dir.to_string(), true);
                }
                None if !rest.is_empty() => {
                    children.entry(rest.to_string()).or_insert(false);
                }
                None => {}
            }
        }

        Ok(children
            .into_iter()
            .map(|(name, is_dir)| SourceEntry { name, is_dir })
            .collect())
    }
}

/// Source over an on-disk directory tree.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let mut full = self.root.clone();
        for component in path.split('/').filter(|c| !c.is_empty()) {
            full.push(component);
        }
        full
    }
}

impl BlueprintSource for DirSource {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path);
        std::fs::read(&full).map_err(|e| GoforgeError::filesystem(full, e))
    }

    fn read_dir(&self, path: &str) -> Result<Vec<SourceEntry>> {
        let full = self.resolve(path);
        let mut entries = Vec::new();
        for entry in WalkDir::new(&full)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let io = e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "walk error")
                });
                GoforgeError::filesystem(full.clone(), io)
            })?;
            entries.push(SourceEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: entry.file_type().is_dir(),
            });
        }
        Ok(entries)
    }
}

/// Join a blueprint-root-relative path under a blueprint's metadata path.
pub(crate) fn join(base: &str, rest: &str) -> String {
    if base.is_empty() {
        rest.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), rest)
    }
}

impl std::fmt::Debug for DirSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirSource").field("root", &self.root).finish()
    }
}
