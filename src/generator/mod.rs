//! Generation Orchestration
//!
//! The orchestrator owns one run end to end: validate the request,
//! resolve the blueprint, build the context, then drive materialization,
//! dependency resolution, hooks and VCS init in order. A run either
//! completes fully or rolls back everything it created; a panic anywhere
//! inside the run body hits the same rollback before resuming the unwind.

pub mod dependencies;
pub mod hooks;
pub mod materializer;
pub mod transaction;

pub use dependencies::DependencyResolver;
pub use hooks::HookRunner;
pub use materializer::FileMaterializer;
pub use transaction::Transaction;

use futures_util::FutureExt;
use serde_json::json;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::blueprint::{BlueprintStore, EmbeddedSource};
use crate::config::{validation, GenerationOptions, GenerationResult, ProjectConfig};
use crate::error::{GoforgeError, Result};
use crate::template::{ContextBuilder, TemplateExpander};
use crate::vcs::VcsInitializer;

/// Architecture value that maps to the plain `type` blueprint rather than
/// a `type-architecture` variant.
const STANDARD_ARCHITECTURE: &str = "standard";

/// Top-level entry point for generation runs.
///
/// A generator may be shared across sequential runs; each run gets its own
/// transaction, so concurrent runs need distinct output paths only.
pub struct ProjectGenerator {
    store: BlueprintStore,
    expander: TemplateExpander,
    build_tool: String,
    vcs_tool: String,
}

impl ProjectGenerator {
    /// Build a generator over an already-loaded blueprint store.
    pub fn new(store: BlueprintStore) -> Self {
        Self {
            store,
            expander: TemplateExpander::new(),
            build_tool: "go".to_string(),
            vcs_tool: "git".to_string(),
        }
    }

    /// Build a generator over the blueprint set embedded in the binary.
    pub fn with_bundled_blueprints() -> Result<Self> {
        let store = BlueprintStore::load(Arc::new(EmbeddedSource::bundled()))?;
        Ok(Self::new(store))
    }

    /// Override the build tool binary (tests, pinned toolchains).
    pub fn with_build_tool(mut self, tool: impl Into<String>) -> Self {
        self.build_tool = tool.into();
        self
    }

    /// Override the VCS binary (tests).
    pub fn with_vcs_tool(mut self, tool: impl Into<String>) -> Self {
        self.vcs_tool = tool.into();
        self
    }

    pub fn store(&self) -> &BlueprintStore {
        &self.store
    }

    /// Run one generation. Always returns a structured result; fatal
    /// errors are embedded after rollback has completed.
    pub async fn generate(
        &self,
        config: &ProjectConfig,
        options: &GenerationOptions,
    ) -> GenerationResult {
        let started = Instant::now();
        if options.verbose {
            info!(
                project = %config.name,
                output = %options.output_path.display(),
                "starting generation run"
            );
        }

        let mut transaction = Transaction::new(&options.output_path);
        let outcome = AssertUnwindSafe(self.run(config, options, &mut transaction))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(files_created)) => {
                if options.verbose {
                    info!(
                        files = files_created.len(),
                        elapsed = ?started.elapsed(),
                        "generation complete"
                    );
                }
                GenerationResult::succeeded(
                    options.output_path.clone(),
                    files_created,
                    started.elapsed(),
                )
            }
            Ok(Err(error)) => {
                transaction.rollback().await;
                GenerationResult::failed(options.output_path.clone(), started.elapsed(), error)
            }
            Err(panic) => {
                transaction.rollback().await;
                std::panic::resume_unwind(panic);
            }
        }
    }

    async fn run(
        &self,
        config: &ProjectConfig,
        options: &GenerationOptions,
        transaction: &mut Transaction,
    ) -> Result<Vec<PathBuf>> {
        self.validate(config, options)?;

        let blueprint_id = resolve_blueprint_id(config);
        let blueprint = self.store.get(&blueprint_id)?;

        if options.dry_run {
            info!(
                blueprint = %blueprint_id,
                output = %options.output_path.display(),
                "dry run: request is valid, nothing was written"
            );
            return Ok(Vec::new());
        }

        check_output_dir(&options.output_path).await?;
        materializer::create_dirs_recording(&options.output_path, transaction).await?;

        let mut context = ContextBuilder::build(config, blueprint);
        context.insert(
            "ProjectPath".to_string(),
            json!(options.output_path.display().to_string()),
        );

        FileMaterializer::new(&self.expander, self.store.source())
            .materialize(blueprint, &context, &options.output_path, transaction)
            .await?;

        DependencyResolver::new(&self.expander)
            .with_tool(&self.build_tool)
            .resolve(blueprint, &context, &options.output_path)
            .await?;

        HookRunner::new(&self.expander)
            .run_all(blueprint, &context, &options.output_path)
            .await;

        if !options.no_git {
            VcsInitializer::new()
                .with_tool(&self.vcs_tool)
                .initialize(&options.output_path, transaction)
                .await;
        } else {
            debug!("VCS init disabled by options");
        }

        Ok(transaction.files_created().to_vec())
    }

    fn validate(&self, config: &ProjectConfig, options: &GenerationOptions) -> Result<()> {
        if config.name.is_empty() {
            return Err(GoforgeError::validation("project name is required"));
        }
        if config.module.is_empty() {
            return Err(GoforgeError::validation("module path is required"));
        }
        if config.project_type.is_empty() {
            return Err(GoforgeError::validation("project type is required"));
        }

        validation::validate_project_name(&config.name)?;
        validation::validate_module_path(&config.module)?;
        validation::validate_template_type(&config.project_type)?;
        validation::validate_output_path(&options.output_path.to_string_lossy())?;

        if let Some(framework) = &config.framework {
            validation::validate_framework(framework)?;
        }
        if let Some(logger) = &config.logger {
            validation::validate_logger(logger)?;
        }
        if let Some(email) = &config.email {
            validation::validate_email(email)?;
        }
        if let Some(author) = &config.author {
            validation::validate_author(author)?;
        }
        if let Some(go_version) = &config.go_version {
            validation::validate_go_version(go_version)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ProjectGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectGenerator")
            .field("blueprints", &self.store.ids())
            .field("build_tool", &self.build_tool)
            .field("vcs_tool", &self.vcs_tool)
            .finish()
    }
}

/// Blueprint id resolution: an explicit `blueprint_id` variable wins, then
/// `type-architecture` for non-standard architectures, then plain `type`.
fn resolve_blueprint_id(config: &ProjectConfig) -> String {
    if let Some(id) = config.variables.get("blueprint_id") {
        if !id.is_empty() {
            return id.clone();
        }
    }
    match config.architecture.as_deref() {
        Some(architecture) if !architecture.is_empty() && architecture != STANDARD_ARCHITECTURE => {
            format!("{}-{}", config.project_type, architecture)
        }
        _ => config.project_type.clone(),
    }
}

/// The output directory must be absent or an empty directory.
async fn check_output_dir(path: &Path) -> Result<()> {
    match tokio::fs::metadata(path).await {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(GoforgeError::filesystem(path, e)),
        Ok(metadata) if metadata.is_dir() => {
            let mut entries = tokio::fs::read_dir(path)
                .await
                .map_err(|e| GoforgeError::filesystem(path, e))?;
            match entries
                .next_entry()
                .await
                .map_err(|e| GoforgeError::filesystem(path, e))?
            {
                Some(_) => Err(GoforgeError::validation(format!(
                    "output directory '{}' already exists and is not empty",
                    path.display()
                ))),
                None => Ok(()),
            }
        }
        Ok(_) => Err(GoforgeError::validation(format!(
            "output path '{}' exists and is not a directory",
            path.display()
        ))),
    }
}
