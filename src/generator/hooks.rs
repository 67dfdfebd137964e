//! Post-generation hook execution.
//!
//! Hooks are best-effort by contract: a failing hook is reported and the
//! run still succeeds, because by the time hooks fire the project on disk
//! is already complete. Commands with glob metacharacters go through the
//! shell so expansion works; everything else is split and executed
//! directly.

use anyhow::Context as AnyhowContext;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::blueprint::{Blueprint, PostHook};
use crate::error::GoforgeError;
use crate::template::{TemplateContext, TemplateExpander};

const GLOB_CHARS: &[char] = &['*', '?', '['];

/// Runs the blueprint's post hooks in declaration order.
pub struct HookRunner<'a> {
    expander: &'a TemplateExpander,
}

impl<'a> HookRunner<'a> {
    pub fn new(expander: &'a TemplateExpander) -> Self {
        Self { expander }
    }

    /// Run every hook. Failures are downgraded to warnings.
    pub async fn run_all(
        &self,
        blueprint: &Blueprint,
        context: &TemplateContext,
        output_path: &Path,
    ) {
        for hook in &blueprint.post_hooks {
            match self.run_hook(hook, context, output_path).await {
                Ok(()) => debug!(hook = %hook.name, "post hook completed"),
                Err(e) => {
                    let err = GoforgeError::Hook {
                        name: hook.name.clone(),
                        message: format!("{e:#}"),
                    };
                    warn!("{err}");
                }
            }
        }
    }

    async fn run_hook(
        &self,
        hook: &PostHook,
        context: &TemplateContext,
        output_path: &Path,
    ) -> anyhow::Result<()> {
        let work_dir = self.resolve_work_dir(hook, context, output_path);

        let mut command = if let Some(args) = &hook.args {
            let mut command = Command::new(&hook.command);
            command.args(args);
            command
        } else if hook.command.contains(GLOB_CHARS) {
            // Globs only expand under a shell.
            let mut command = Command::new("sh");
            command.arg("-c").arg(&hook.command);
            command
        } else {
            let words = shell_words::split(&hook.command)
                .with_context(|| format!("cannot parse command '{}'", hook.command))?;
            let (program, rest) = words
                .split_first()
                .context("hook command is empty")?;
            let mut command = Command::new(program);
            command.args(rest);
            command
        };

        let output = command
            .current_dir(&work_dir)
            .output()
            .await
            .with_context(|| format!("failed to spawn '{}'", hook.command))?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            anyhow::bail!(
                "exited with {}: {}",
                output.status,
                combined.trim()
            );
        }
        Ok(())
    }

    /// `workDir` is a template; the default (and the `{{ProjectPath}}`
    /// sentinel) resolve to the output root, and relative results are
    /// joined under it.
    fn resolve_work_dir(
        &self,
        hook: &PostHook,
        context: &TemplateContext,
        output_path: &Path,
    ) -> PathBuf {
        match &hook.work_dir {
            None => output_path.to_path_buf(),
            Some(template) => {
                let expanded = self.expander.expand_path(template, context);
                let expanded = expanded.trim();
                if expanded.is_empty() {
                    return output_path.to_path_buf();
                }
                let path = PathBuf::from(expanded);
                if path.is_absolute() {
                    path
                } else {
                    output_path.join(path)
                }
            }
        }
    }
}
