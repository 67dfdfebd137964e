//! Template Expansion
//!
//! Thin wrapper around handlebars configured for code generation: escaping
//! is disabled, unresolved identifiers render as the empty string, and the
//! helper table (`eq`/`ne` come built in; `replace`, case conversions and
//! `trim` are registered here) is part of the blueprint-facing contract.
//!
//! Expansion is deliberately asymmetric: file bodies fail the run on any
//! parse or execution error, while paths (destinations, hook work dirs)
//! fall back to the original string so blueprints authored with literal
//! paths keep working.

pub mod condition;
pub mod context;
mod helpers;

use handlebars::Handlebars;
use tracing::warn;

use crate::error::{GoforgeError, Result};

pub use condition::evaluate_condition;
pub use context::{ContextBuilder, TemplateContext};

/// Expands template strings against a context mapping.
pub struct TemplateExpander {
    registry: Handlebars<'static>,
}

impl TemplateExpander {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        // Generated output is source code, not HTML.
        registry.register_escape_fn(handlebars::no_escape);
        helpers::register(&mut registry);
        Self { registry }
    }

    /// Expand a file body. Any parse or execution error is fatal and
    /// carries the offending file's name.
    pub fn expand_body(
        &self,
        file: &str,
        template: &str,
        context: &TemplateContext,
    ) -> Result<String> {
        self.registry
            .render_template(template, context)
            .map_err(|e| GoforgeError::template(file, e.to_string()))
    }

    /// Expand a path-producing template string.
    ///
    /// Errors are diagnostics only; the original string is returned
    /// unchanged so legacy literal paths survive.
    pub fn expand_path(&self, template: &str, context: &TemplateContext) -> String {
        match self.registry.render_template(template, context) {
            Ok(expanded) => expanded,
            Err(e) => {
                warn!(template, error = %e, "path expansion failed, using literal value");
                template.to_string()
            }
        }
    }
}

impl Default for TemplateExpander {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TemplateExpander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateExpander").finish()
    }
}
