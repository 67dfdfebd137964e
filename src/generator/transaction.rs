//! Per-run artifact tracking and rollback.
//!
//! Every directory and file a run produces is appended here in creation
//! order. On any fatal failure the orchestrator drains the logs in
//! reverse: files first, then directories, so a directory is only removed
//! once everything the run put inside it is gone. Directories that still
//! hold user files simply fail their `rmdir` and are left in place.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Ordered log of one run's filesystem side effects.
#[derive(Debug)]
pub struct Transaction {
    output_root: PathBuf,
    files_created: Vec<PathBuf>,
    dirs_created: Vec<PathBuf>,
}

impl Transaction {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            files_created: Vec::new(),
            dirs_created: Vec::new(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Record a file the run just wrote.
    pub fn add_file(&mut self, path: impl Into<PathBuf>) {
        self.files_created.push(path.into());
    }

    /// Record a directory the run just created.
    pub fn add_dir(&mut self, path: impl Into<PathBuf>) {
        self.dirs_created.push(path.into());
    }

    /// Files created so far, in creation order.
    pub fn files_created(&self) -> &[PathBuf] {
        &self.files_created
    }

    /// Directories created so far, in creation order.
    pub fn dirs_created(&self) -> &[PathBuf] {
        &self.dirs_created
    }

    /// Remove everything the run produced, newest first.
    ///
    /// Failures are collected and reported once; rollback never stops
    /// early. Non-empty directories are expected (they may hold files the
    /// user seeded) and are not counted as failures.
    pub async fn rollback(&mut self) {
        if self.files_created.is_empty() && self.dirs_created.is_empty() {
            return;
        }
        debug!(
            files = self.files_created.len(),
            dirs = self.dirs_created.len(),
            "rolling back generation run"
        );

        let mut failures: Vec<String> = Vec::new();

        for file in self.files_created.drain(..).rev() {
            if let Err(e) = tokio::fs::remove_file(&file).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    failures.push(format!("{}: {}", file.display(), e));
                }
            }
        }

        for dir in self.dirs_created.drain(..).rev() {
            if let Err(e) = tokio::fs::remove_dir(&dir).await {
                // Surviving user files keep their directory alive.
                match e.kind() {
                    std::io::ErrorKind::NotFound => {}
                    _ if dir_is_non_empty(&dir) => {
                        debug!(dir = %dir.display(), "leaving non-empty directory in place");
                    }
                    _ => failures.push(format!("{}: {}", dir.display(), e)),
                }
            }
        }

        if !failures.is_empty() {
            warn!(
                count = failures.len(),
                details = failures.join("; "),
                "rollback left artifacts behind"
            );
        }
    }
}

fn dir_is_non_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
