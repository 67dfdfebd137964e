//! Blueprint registry.
//!
//! The store walks a blueprint tree once at initialization, parses every
//! descriptor it finds, and serves lookups for the rest of the process
//! lifetime. It is read-only after loading and safe to share across runs.

use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

use super::source::{join, BlueprintSource};
use super::Blueprint;
use crate::error::{GoforgeError, Result};

/// Name of the descriptor file expected in each blueprint directory.
pub const DESCRIPTOR_FILE: &str = "blueprint.yaml";

/// A read-only keyed collection of blueprints.
pub struct BlueprintStore {
    blueprints: IndexMap<String, Blueprint>,
    source: Arc<dyn BlueprintSource>,
}

impl BlueprintStore {
    /// Walk the tree and register every subdirectory holding a descriptor.
    ///
    /// Subdirectories without a descriptor are skipped. Two blueprints
    /// resolving to the same id fail the whole load.
    pub fn load(source: Arc<dyn BlueprintSource>) -> Result<Self> {
        let mut blueprints: IndexMap<String, Blueprint> = IndexMap::new();

        for entry in source.read_dir("")? {
            if !entry.is_dir {
                continue;
            }
            let descriptor_path = join(&entry.name, DESCRIPTOR_FILE);
            let bytes = match source.read(&descriptor_path) {
                Ok(bytes) => bytes,
                Err(_) => {
                    debug!(dir = %entry.name, "skipping directory without descriptor");
                    continue;
                }
            };

            let mut blueprint: Blueprint =
                serde_yaml::from_slice(&bytes).map_err(|e| GoforgeError::Descriptor {
                    file: descriptor_path.clone(),
                    message: e.to_string(),
                })?;

            if blueprint.id.is_empty() {
                blueprint.id = entry.name.clone();
            }
            blueprint.metadata.path = entry.name.clone();

            if let Some(existing) = blueprints.get(&blueprint.id) {
                return Err(GoforgeError::Descriptor {
                    file: descriptor_path,
                    message: format!(
                        "duplicate blueprint id '{}' (already registered from '{}')",
                        blueprint.id, existing.metadata.path
                    ),
                });
            }
            debug!(id = %blueprint.id, path = %blueprint.metadata.path, "registered blueprint");
            blueprints.insert(blueprint.id.clone(), blueprint);
        }

        blueprints.sort_keys();
        Ok(Self { blueprints, source })
    }

    /// Resolve a blueprint id.
    pub fn get(&self, id: &str) -> Result<&Blueprint> {
        self.blueprints
            .get(id)
            .ok_or_else(|| GoforgeError::TemplateNotFound {
                id: id.to_string(),
                known: self.ids(),
            })
    }

    /// All registered blueprints, ordered by id.
    pub fn list(&self) -> impl Iterator<Item = &Blueprint> {
        self.blueprints.values()
    }

    /// All registered ids, ordered.
    pub fn ids(&self) -> Vec<String> {
        self.blueprints.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }

    /// The tree this store was loaded from; file entries of a blueprint
    /// resolve their `source` paths through it.
    pub fn source(&self) -> Arc<dyn BlueprintSource> {
        Arc::clone(&self.source)
    }
}

impl std::fmt::Debug for BlueprintStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlueprintStore")
            .field("ids", &self.ids())
            .finish()
    }
}
