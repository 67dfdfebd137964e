//! Version control initialization for generated projects.
//!
//! Runs once at the end of a successful generation: initialize a git
//! repository at the project root and drop a standard ignore file. Every
//! failure here is a warning; a project without version control is still
//! a valid result.

use anyhow::Context as AnyhowContext;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::GoforgeError;
use crate::generator::Transaction;

/// Ignore rules covering Go build artifacts, OS metadata and IDE files.
const GITIGNORE: &str = "\
# Binaries
*.exe
*.exe~
*.dll
*.so
*.dylib
bin/
dist/

# Test and coverage artifacts
*.test
*.out
coverage.html

# Environment
.env
.env.local

# OS metadata
.DS_Store
Thumbs.db

# IDE
.idea/
.vscode/
*.swp
";

/// Initializes a repository at the project root, best-effort.
pub struct VcsInitializer {
    tool: String,
}

impl VcsInitializer {
    pub fn new() -> Self {
        Self {
            tool: "git".to_string(),
        }
    }

    /// Override the VCS binary. Used by tests.
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    /// Initialize the repository and write the ignore file.
    ///
    /// Skips silently when the tool is absent or the directory already is
    /// a repository; reports anything else as a warning and returns.
    pub async fn initialize(&self, project_root: &Path, transaction: &mut Transaction) {
        if !self.tool_available().await {
            debug!(tool = %self.tool, "VCS tool not installed, skipping repository init");
            return;
        }
        if project_root.join(".git").exists() {
            debug!("directory is already a repository, skipping init");
            return;
        }

        if let Err(e) = self.init_repository(project_root).await {
            warn!("{}", GoforgeError::Vcs(format!("{e:#}")));
            return;
        }

        let ignore_path = project_root.join(".gitignore");
        match tokio::fs::write(&ignore_path, GITIGNORE).await {
            Ok(()) => transaction.add_file(ignore_path),
            Err(e) => warn!(
                "{}",
                GoforgeError::Vcs(format!("could not write .gitignore: {e}"))
            ),
        }
    }

    async fn init_repository(&self, project_root: &Path) -> anyhow::Result<()> {
        let output = Command::new(&self.tool)
            .arg("init")
            .current_dir(project_root)
            .output()
            .await
            .with_context(|| format!("failed to run {} init", self.tool))?;

        if !output.status.success() {
            anyhow::bail!(
                "{} init exited with {}: {}",
                self.tool,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        debug!(root = %project_root.display(), "initialized repository");
        Ok(())
    }

    async fn tool_available(&self) -> bool {
        Command::new(&self.tool)
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

impl Default for VcsInitializer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_absent_tool_is_silent() {
        let out = tempdir().unwrap();
        let mut tx = Transaction::new(out.path());
        VcsInitializer::new()
            .with_tool("goforge-no-such-vcs")
            .initialize(out.path(), &mut tx)
            .await;
        assert!(tx.files_created().is_empty());
        assert!(!out.path().join(".gitignore").exists());
    }

    #[tokio::test]
    async fn test_init_writes_ignore_file_and_records_it() {
        let out = tempdir().unwrap();
        let mut tx = Transaction::new(out.path());
        let initializer = VcsInitializer::new();
        if !initializer.tool_available().await {
            // machine without git; covered by the absent-tool test
            return;
        }

        initializer.initialize(out.path(), &mut tx).await;

        assert!(out.path().join(".git").exists());
        let ignore = std::fs::read_to_string(out.path().join(".gitignore")).unwrap();
        assert!(ignore.contains("bin/"));
        assert_eq!(tx.files_created(), &[out.path().join(".gitignore")]);
    }

    #[tokio::test]
    async fn test_existing_repository_is_left_alone() {
        let out = tempdir().unwrap();
        std::fs::create_dir(out.path().join(".git")).unwrap();
        let mut tx = Transaction::new(out.path());

        VcsInitializer::new().initialize(out.path(), &mut tx).await;

        // no ignore file means init was skipped entirely
        assert!(!out.path().join(".gitignore").exists());
    }
}
