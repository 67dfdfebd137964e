//! Dependency resolution against the Go toolchain.
//!
//! Conditionally-selected modules are added to the generated project with
//! `go get`, one invocation per module in declaration order so the
//! resulting go.mod lists them the way the blueprint declared them. A
//! missing toolchain is not an error: the user gets the exact commands to
//! run later and the generation succeeds.

use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::blueprint::{Blueprint, BlueprintDependency};
use crate::error::{GoforgeError, Result};
use crate::template::{evaluate_condition, TemplateContext, TemplateExpander};

/// Adds blueprint-declared modules to the generated project.
pub struct DependencyResolver<'a> {
    expander: &'a TemplateExpander,
    tool: String,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(expander: &'a TemplateExpander) -> Self {
        Self {
            expander,
            tool: "go".to_string(),
        }
    }

    /// Override the build tool binary. Used by tests and callers that
    /// pin a specific toolchain path.
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    /// Filter dependencies by condition and add each selected module.
    pub async fn resolve(
        &self,
        blueprint: &Blueprint,
        context: &TemplateContext,
        project_root: &Path,
    ) -> Result<()> {
        let selected: Vec<&BlueprintDependency> = blueprint
            .dependencies
            .iter()
            .filter(|dep| match &dep.condition {
                Some(condition) => evaluate_condition(self.expander, condition, context),
                None => true,
            })
            .collect();

        if selected.is_empty() {
            return Ok(());
        }

        if !self.tool_available().await {
            warn!(
                tool = %self.tool,
                "build tool not found; dependencies were not added"
            );
            warn!("run the following inside the project once the tool is installed:");
            for dep in &selected {
                warn!("  {} get {}", self.tool, dep.spec());
            }
            return Ok(());
        }

        for dep in selected {
            let spec = dep.spec();
            let output = Command::new(&self.tool)
                .arg("get")
                .arg(&spec)
                .current_dir(project_root)
                .output()
                .await
                .map_err(|e| GoforgeError::Dependency {
                    module: dep.module.clone(),
                    message: e.to_string(),
                })?;

            if !output.status.success() {
                return Err(GoforgeError::Dependency {
                    module: dep.module.clone(),
                    message: format!(
                        "{} get exited with {}: {}",
                        self.tool,
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    ),
                });
            }
            debug!(module = %spec, "added dependency");
        }

        Ok(())
    }

    async fn tool_available(&self) -> bool {
        Command::new(&self.tool)
            .arg("version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}
