//! Field-level validation predicates.
//!
//! The orchestrator only requires `name`, `module` and `type` to be
//! non-empty; everything richer lives here as pure predicates so the
//! front-end can reuse them for prompt-time feedback. Each predicate
//! returns a `Validation` error with a human-readable reason.

use crate::error::{GoforgeError, Result};

const SUPPORTED_LOGGERS: &[&str] = &["slog", "zap", "logrus", "zerolog"];
const SUPPORTED_FRAMEWORKS: &[&str] = &["gin", "echo", "fiber", "chi", "cobra", "stdlib"];

/// Validate a project name: non-empty, starts with a letter or digit, and
/// contains only letters, digits, hyphens and underscores.
pub fn validate_project_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(GoforgeError::validation("project name cannot be empty"));
    }
    if name.len() > 100 {
        return Err(GoforgeError::validation(
            "project name cannot exceed 100 characters",
        ));
    }
    if let Some(first) = name.chars().next() {
        if !first.is_ascii_alphanumeric() {
            return Err(GoforgeError::validation(format!(
                "project name must start with a letter or digit, got '{first}'"
            )));
        }
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
    {
        return Err(GoforgeError::validation(format!(
            "project name contains invalid character '{bad}' (allowed: letters, digits, '-', '_')"
        )));
    }
    Ok(())
}

/// Validate a module path such as `github.com/acme/orders`.
pub fn validate_module_path(module: &str) -> Result<()> {
    if module.is_empty() {
        return Err(GoforgeError::validation("module path cannot be empty"));
    }
    if module.chars().any(char::is_whitespace) {
        return Err(GoforgeError::validation(
            "module path cannot contain whitespace",
        ));
    }
    if module.starts_with('/') || module.ends_with('/') {
        return Err(GoforgeError::validation(
            "module path cannot start or end with '/'",
        ));
    }
    for segment in module.split('/') {
        if segment.is_empty() {
            return Err(GoforgeError::validation(
                "module path cannot contain empty segments",
            ));
        }
        if let Some(bad) = segment
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '.' | '-' | '_' | '~'))
        {
            return Err(GoforgeError::validation(format!(
                "module path segment '{segment}' contains invalid character '{bad}'"
            )));
        }
    }
    Ok(())
}

/// Validate an email address. Empty is accepted since the field is optional.
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Ok(());
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(GoforgeError::validation(format!(
            "email '{email}' is missing '@'"
        )));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(GoforgeError::validation(format!(
            "email '{email}' is not a valid address"
        )));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(GoforgeError::validation(
            "email cannot contain whitespace",
        ));
    }
    Ok(())
}

/// Validate the logger choice against the supported set.
pub fn validate_logger(logger: &str) -> Result<()> {
    if logger.is_empty() || SUPPORTED_LOGGERS.contains(&logger) {
        Ok(())
    } else {
        Err(GoforgeError::validation(format!(
            "unsupported logger '{logger}' (supported: {})",
            SUPPORTED_LOGGERS.join(", ")
        )))
    }
}

/// Validate an author string: printable characters only.
pub fn validate_author(author: &str) -> Result<()> {
    if author.chars().any(char::is_control) {
        return Err(GoforgeError::validation(
            "author cannot contain control characters",
        ));
    }
    Ok(())
}

/// Validate the output path: non-empty and not the filesystem root.
pub fn validate_output_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(GoforgeError::validation("output path cannot be empty"));
    }
    if path == "/" {
        return Err(GoforgeError::validation(
            "output path cannot be the filesystem root",
        ));
    }
    Ok(())
}

/// Validate a Go toolchain version: empty, `auto`, or dotted digits like
/// `1.21` / `1.21.3`.
pub fn validate_go_version(version: &str) -> Result<()> {
    if version.is_empty() || version == "auto" {
        return Ok(());
    }
    let parts: Vec<&str> = version.split('.').collect();
    let well_formed = (2..=3).contains(&parts.len())
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
    if well_formed {
        Ok(())
    } else {
        Err(GoforgeError::validation(format!(
            "invalid Go version '{version}' (expected e.g. '1.21' or 'auto')"
        )))
    }
}

/// Validate a template type identifier; same charset rules as project names.
pub fn validate_template_type(project_type: &str) -> Result<()> {
    if project_type.is_empty() {
        return Err(GoforgeError::validation("project type cannot be empty"));
    }
    if let Some(bad) = project_type
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
    {
        return Err(GoforgeError::validation(format!(
            "project type contains invalid character '{bad}'"
        )));
    }
    Ok(())
}

/// Validate the framework choice against the supported set.
pub fn validate_framework(framework: &str) -> Result<()> {
    if framework.is_empty() || SUPPORTED_FRAMEWORKS.contains(&framework) {
        Ok(())
    } else {
        Err(GoforgeError::validation(format!(
            "unsupported framework '{framework}' (supported: {})",
            SUPPORTED_FRAMEWORKS.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_name_rules() {
        assert!(validate_project_name("orders-api").is_ok());
        assert!(validate_project_name("p2p_node").is_ok());
        assert!(validate_project_name("").is_err());
        assert!(validate_project_name("-leading").is_err());
        assert!(validate_project_name("has space").is_err());
    }

    #[test]
    fn test_module_path_rules() {
        assert!(validate_module_path("github.com/acme/orders").is_ok());
        assert!(validate_module_path("m/p").is_ok());
        assert!(validate_module_path("").is_err());
        assert!(validate_module_path("/leading").is_err());
        assert!(validate_module_path("a//b").is_err());
        assert!(validate_module_path("a b/c").is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("").is_ok());
        assert!(validate_email("dev@example.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("x@nodot").is_err());
    }

    #[test]
    fn test_go_version_rules() {
        assert!(validate_go_version("").is_ok());
        assert!(validate_go_version("auto").is_ok());
        assert!(validate_go_version("1.21").is_ok());
        assert!(validate_go_version("1.21.3").is_ok());
        assert!(validate_go_version("1").is_err());
        assert!(validate_go_version("1.x").is_err());
    }

    #[test]
    fn test_logger_and_framework_sets() {
        assert!(validate_logger("zap").is_ok());
        assert!(validate_logger("log4j").is_err());
        assert!(validate_framework("gin").is_ok());
        assert!(validate_framework("rails").is_err());
    }
}
