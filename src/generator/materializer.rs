//! File materialization.
//!
//! Walks the blueprint's file list in order and realizes each entry under
//! the output root: evaluate the gate, expand the destination, create
//! parent directories, render the body, write, and flag executables.
//! Every side effect is recorded with the run's transaction before the
//! next entry is touched.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use super::transaction::Transaction;
use crate::blueprint::source::join;
use crate::blueprint::{Blueprint, BlueprintSource};
use crate::error::{GoforgeError, Result};
use crate::template::{evaluate_condition, TemplateContext, TemplateExpander};

/// Realizes blueprint file entries on disk.
pub struct FileMaterializer<'a> {
    expander: &'a TemplateExpander,
    source: Arc<dyn BlueprintSource>,
}

impl<'a> FileMaterializer<'a> {
    pub fn new(expander: &'a TemplateExpander, source: Arc<dyn BlueprintSource>) -> Self {
        Self { expander, source }
    }

    /// Materialize every file entry of the blueprint under `output_path`.
    ///
    /// The blueprint's list order is authoritative; the run is sequential
    /// so rollback ordering stays meaningful.
    pub async fn materialize(
        &self,
        blueprint: &Blueprint,
        context: &TemplateContext,
        output_path: &Path,
        transaction: &mut Transaction,
    ) -> Result<()> {
        for file in &blueprint.files {
            if let Some(condition) = &file.condition {
                if !evaluate_condition(self.expander, condition, context) {
                    debug!(source = %file.source, "condition not met, skipping file");
                    continue;
                }
            }

            let destination = self.expander.expand_path(&file.destination, context);
            let relative = normalize_destination(&destination);
            let full_dest = output_path.join(&relative);

            if transaction.files_created().contains(&full_dest) {
                warn!(
                    destination = %full_dest.display(),
                    "destination already written this run, overwriting"
                );
            }

            if let Some(parent) = full_dest.parent() {
                create_dirs_recording(parent, transaction).await?;
            }

            let source_path = join(&blueprint.metadata.path, &file.source);
            let bytes = self.source.read(&source_path).map_err(|e| {
                GoforgeError::template(&file.source, format!("cannot load template: {e}"))
            })?;
            let body = String::from_utf8(bytes).map_err(|_| {
                GoforgeError::template(&file.source, "template is not valid UTF-8")
            })?;

            let rendered = self.expander.expand_body(&file.source, &body, context)?;

            tokio::fs::write(&full_dest, rendered)
                .await
                .map_err(|e| GoforgeError::filesystem(&full_dest, e))?;
            transaction.add_file(&full_dest);

            if file.executable {
                set_executable(&full_dest).await?;
            }

            debug!(destination = %full_dest.display(), "materialized file");
        }

        Ok(())
    }
}

/// Record-and-create every missing ancestor of `dir`, rootmost first, so
/// rollback (which walks in reverse) removes leaves before their parents.
pub(crate) async fn create_dirs_recording(
    dir: &Path,
    transaction: &mut Transaction,
) -> Result<()> {
    let mut missing: Vec<PathBuf> = Vec::new();
    let mut current = dir;
    loop {
        if current.exists() || current.as_os_str().is_empty() {
            break;
        }
        missing.push(current.to_path_buf());
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }

    for dir in missing.into_iter().rev() {
        tokio::fs::create_dir(&dir)
            .await
            .map_err(|e| GoforgeError::filesystem(&dir, e))?;
        transaction.add_dir(&dir);
    }
    Ok(())
}

/// Destinations are defined relative to the output root. An expansion that
/// produces an absolute path is re-rooted rather than honored, and parent
/// traversals are dropped, so nothing ever lands outside the output root.
fn normalize_destination(destination: &str) -> PathBuf {
    Path::new(destination)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

#[cfg(unix)]
async fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(0o755);
    tokio::fs::set_permissions(path, perms)
        .await
        .map_err(|e| GoforgeError::filesystem(path, e))
}

#[cfg(not(unix))]
async fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}
