//! Configuration model for generation runs.
//!
//! This module defines the user's request (`ProjectConfig`), the per-run
//! flags (`GenerationOptions`), and the structured result the engine hands
//! back to the front-end (`GenerationResult`). All of these are inputs or
//! outputs of a run and are never mutated by the engine.

pub mod validation;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::GoforgeError;

/// The user's request: everything the front-end collected about the
/// project to generate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Project name; becomes the output directory leaf and the
    /// `ProjectName` context variable.
    pub name: String,

    /// Module identifier, e.g. `github.com/acme/orders`.
    pub module: String,

    /// Blueprint family, e.g. `web-api`, `cli`, `library`.
    #[serde(rename = "type")]
    pub project_type: String,

    /// Optional architecture variant, e.g. `clean`, `ddd`, `hexagonal`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logger: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub go_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    /// Structured feature selections (database, auth, logging).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Features>,

    /// Free-form context overrides. Recognized keys include
    /// `blueprint_id`, `DatabaseDriver`, `DatabaseORM` and `AuthType`.
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

impl ProjectConfig {
    /// Convenience constructor for the three required fields.
    pub fn new(
        name: impl Into<String>,
        module: impl Into<String>,
        project_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            project_type: project_type.into(),
            ..Default::default()
        }
    }
}

/// Optional feature selections nested under the project config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseFeature>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthFeature>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingFeature>,
}

/// Database feature block. `drivers` is the current form; `driver` is the
/// legacy scalar kept for older profiles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseFeature {
    #[serde(default)]
    pub drivers: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orm: Option<String>,
}

/// Authentication feature block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthFeature {
    #[serde(rename = "type")]
    pub auth_type: String,
}

/// Logging sub-settings feeding the `LoggerConfig` context key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured: Option<bool>,
}

/// Per-run flags controlling where and how generation happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Destination root for the generated project.
    pub output_path: PathBuf,

    /// Validate and resolve only; touch nothing on disk.
    #[serde(default)]
    pub dry_run: bool,

    /// Skip VCS initialization.
    #[serde(default)]
    pub no_git: bool,

    #[serde(default)]
    pub verbose: bool,
}

impl GenerationOptions {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            dry_run: false,
            no_git: false,
            verbose: false,
        }
    }
}

/// Structured outcome of one generation run.
///
/// Fatal errors are embedded rather than returned so the front-end always
/// receives one result per call; `success` distinguishes the two shapes.
#[derive(Debug)]
pub struct GenerationResult {
    pub project_path: PathBuf,

    /// Every file the run produced, in creation order. Empty for dry runs.
    pub files_created: Vec<PathBuf>,

    pub duration: Duration,

    pub success: bool,

    pub error: Option<GoforgeError>,
}

impl GenerationResult {
    pub(crate) fn succeeded(
        project_path: PathBuf,
        files_created: Vec<PathBuf>,
        duration: Duration,
    ) -> Self {
        Self {
            project_path,
            files_created,
            duration,
            success: true,
            error: None,
        }
    }

    pub(crate) fn failed(project_path: PathBuf, duration: Duration, error: GoforgeError) -> Self {
        Self {
            project_path,
            files_created: Vec::new(),
            duration,
            success: false,
            error: Some(error),
        }
    }
}
