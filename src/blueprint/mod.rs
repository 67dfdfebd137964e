//! Blueprint Model
//!
//! A blueprint is the declarative definition of a project skeleton: the
//! variables it accepts, the template files it materializes, the external
//! modules it pulls in, and the hooks it runs afterwards. Blueprints are
//! parsed once from YAML descriptors and treated as immutable for the
//! lifetime of the process.

pub mod source;
pub mod store;

use serde::{Deserialize, Serialize};

pub use source::{BlueprintSource, BundledBlueprints, DirSource, EmbeddedSource, SourceEntry};
pub use store::BlueprintStore;

/// A parsed blueprint descriptor plus the metadata the loader attaches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    /// Unique registry key. Defaults to the blueprint's directory name;
    /// a descriptor may override it explicitly.
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Family label, e.g. `web-api`. May match the id or name a broader
    /// family the id specializes (`web-api-clean`).
    #[serde(rename = "type", default)]
    pub project_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,

    /// Declared variables: what the context is permitted to receive, plus
    /// per-variable defaults.
    #[serde(default)]
    pub variables: Vec<BlueprintVariable>,

    /// Template files, in authoritative materialization order.
    #[serde(default)]
    pub files: Vec<BlueprintFile>,

    /// External modules to add after files are written.
    #[serde(default)]
    pub dependencies: Vec<BlueprintDependency>,

    /// Commands to run after dependencies, best-effort.
    #[serde(default)]
    pub post_hooks: Vec<PostHook>,

    /// Loader-attached metadata; never read from the descriptor itself.
    #[serde(default, skip)]
    pub metadata: BlueprintMetadata,
}

impl Blueprint {
    /// Look up the declared default for a variable, if any.
    pub fn variable_default(&self, name: &str) -> Option<&serde_json::Value> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .and_then(|v| v.default.as_ref())
    }
}

/// One declared blueprint variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintVariable {
    pub name: String,

    #[serde(rename = "type", default = "default_variable_type")]
    pub var_type: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<serde_json::Value>,
}

fn default_variable_type() -> String {
    "string".to_string()
}

/// One file entry: where the template lives and where its expansion lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintFile {
    /// Path of the template body, relative to the blueprint root.
    pub source: String,

    /// Template string producing a path relative to the output root.
    pub destination: String,

    /// Optional gate; skipped when it evaluates falsy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(default)]
    pub executable: bool,
}

/// One external module the generated project depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintDependency {
    pub module: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl BlueprintDependency {
    /// The `module[@version]` spec handed to the build tool.
    pub fn spec(&self) -> String {
        match &self.version {
            Some(version) if !version.is_empty() => format!("{}@{}", self.module, version),
            _ => self.module.clone(),
        }
    }
}

/// One post-generation hook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostHook {
    pub name: String,

    pub command: String,

    /// Explicit argument vector; when present the command is run verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,

    /// Working directory template; defaults to the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<String>,

    // Reserved by the descriptor schema; not yet evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Loader-attached blueprint metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlueprintMetadata {
    /// The blueprint's root path within the blueprint tree; `source`
    /// entries of its files are resolved under it.
    pub path: String,
}
