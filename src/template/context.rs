//! Per-run template context construction.
//!
//! The context is an open-ended key→value mapping consumed by the
//! expander. It is built exactly once per generation run, as a pure
//! function of the project config and the resolved blueprint, in a fixed
//! sequence of steps: base keys, the feature record, logger-derived keys,
//! free-form variable overrides, blueprint-variable defaults, and finally
//! the database/auth/ORM convenience keys.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::blueprint::Blueprint;
use crate::config::ProjectConfig;

/// The untyped context mapping. Keys are blueprint-facing identifiers and
/// must not be renamed.
pub type TemplateContext = Map<String, Value>;

/// Go toolchain version substituted when the config leaves it empty or
/// says `auto`.
pub const DEFAULT_GO_VERSION: &str = "1.21";

/// ORM values the generated code paths understand. Anything else is
/// coerced to the empty string (raw SQL) rather than failing the run.
const SUPPORTED_ORMS: &[&str] = &["", "gorm", "raw"];

/// Builds the context for one generation run.
pub struct ContextBuilder;

impl ContextBuilder {
    /// Assemble the context. Deterministic for a given `(config, blueprint)`.
    pub fn build(config: &ProjectConfig, blueprint: &Blueprint) -> TemplateContext {
        let mut ctx = TemplateContext::new();

        Self::base_keys(&mut ctx, config);
        Self::feature_record(&mut ctx, config);
        Self::logger_keys(&mut ctx, config);
        Self::variable_overrides(&mut ctx, config);
        Self::blueprint_defaults(&mut ctx, blueprint);
        Self::database_keys(&mut ctx, config, blueprint);
        Self::auth_keys(&mut ctx, config, blueprint);
        Self::orm_keys(&mut ctx, config, blueprint);

        ctx
    }

    fn base_keys(ctx: &mut TemplateContext, config: &ProjectConfig) {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();

        ctx.insert("ProjectName".into(), json!(config.name));
        ctx.insert("ModulePath".into(), json!(config.module));
        ctx.insert("Type".into(), json!(config.project_type));
        ctx.insert("Architecture".into(), json!(opt(&config.architecture)));
        ctx.insert("Framework".into(), json!(opt(&config.framework)));
        ctx.insert("Logger".into(), json!(opt(&config.logger)));
        ctx.insert("Author".into(), json!(opt(&config.author)));
        ctx.insert("Email".into(), json!(opt(&config.email)));
        ctx.insert("License".into(), json!(opt(&config.license)));

        let go_version = match config.go_version.as_deref() {
            None | Some("") | Some("auto") => DEFAULT_GO_VERSION,
            Some(version) => version,
        };
        ctx.insert("GoVersion".into(), json!(go_version));
    }

    fn feature_record(ctx: &mut TemplateContext, config: &ProjectConfig) {
        if let Some(features) = &config.features {
            if let Ok(value) = serde_json::to_value(features) {
                ctx.insert("Features".into(), value);
            }
        }
    }

    fn logger_keys(ctx: &mut TemplateContext, config: &ProjectConfig) {
        let Some(logger) = config.logger.as_deref().filter(|l| !l.is_empty()) else {
            return;
        };

        ctx.insert("LoggerType".into(), json!(logger));
        for (key, name) in [
            ("UseSlog", "slog"),
            ("UseZap", "zap"),
            ("UseLogrus", "logrus"),
            ("UseZerolog", "zerolog"),
        ] {
            ctx.insert(key.into(), json!(logger == name));
        }

        let logging = config.features.as_ref().and_then(|f| f.logging.as_ref());
        let level = logging
            .and_then(|l| l.level.clone())
            .unwrap_or_else(|| "info".to_string());
        let format = logging
            .and_then(|l| l.format.clone())
            .unwrap_or_else(|| "json".to_string());
        let structured = logging.and_then(|l| l.structured).unwrap_or(true);

        ctx.insert(
            "LoggerConfig".into(),
            json!({
                "Type": logger,
                "Level": level,
                "Format": format,
                "Structured": structured,
            }),
        );
    }

    fn variable_overrides(ctx: &mut TemplateContext, config: &ProjectConfig) {
        // Sorted so insertion order never depends on HashMap iteration.
        let mut keys: Vec<&String> = config.variables.keys().collect();
        keys.sort();
        for key in keys {
            ctx.insert(key.clone(), json!(config.variables[key]));
        }
    }

    fn blueprint_defaults(ctx: &mut TemplateContext, blueprint: &Blueprint) {
        for variable in &blueprint.variables {
            if ctx.contains_key(&variable.name) {
                continue;
            }
            if let Some(default) = &variable.default {
                ctx.insert(variable.name.clone(), default.clone());
            }
        }
    }

    fn database_keys(ctx: &mut TemplateContext, config: &ProjectConfig, blueprint: &Blueprint) {
        let database = config.features.as_ref().and_then(|f| f.database.as_ref());

        let mut drivers: Vec<String> = database
            .map(|db| db.drivers.iter().filter(|d| !d.is_empty()).cloned().collect())
            .unwrap_or_default();
        if drivers.is_empty() {
            if let Some(legacy) = database
                .and_then(|db| db.driver.clone())
                .filter(|d| !d.is_empty())
            {
                drivers.push(legacy);
            }
        }

        let primary = drivers
            .first()
            .cloned()
            .or_else(|| {
                config
                    .variables
                    .get("DatabaseDriver")
                    .filter(|d| !d.is_empty())
                    .cloned()
            })
            .or_else(|| {
                blueprint
                    .variable_default("DatabaseDriver")
                    .map(value_to_string)
                    .filter(|d| !d.is_empty())
            });

        // A driver sourced from variables or blueprint defaults still
        // participates in the Has* flags.
        if drivers.is_empty() {
            if let Some(primary) = &primary {
                drivers.push(primary.clone());
            }
        }

        let has_database = primary.is_some() || !drivers.is_empty();
        ctx.insert(
            "DatabaseDriver".into(),
            json!(primary.unwrap_or_default()),
        );
        ctx.insert("DatabaseDrivers".into(), json!(drivers));
        ctx.insert("HasDatabase".into(), json!(has_database));

        for driver in &drivers {
            if let Some(flag) = driver_flag(driver) {
                ctx.insert(flag.into(), json!(true));
            }
        }

        if drivers.len() > 1 {
            ctx.insert("HasMultipleDatabases".into(), json!(true));
            for secondary in &drivers[1..] {
                match secondary.as_str() {
                    "redis" => {
                        ctx.insert("HasRedisCache".into(), json!(true));
                    }
                    "mongodb" | "mongo" => {
                        ctx.insert("HasMongoAnalytics".into(), json!(true));
                    }
                    _ => {}
                }
            }
        }
    }

    fn auth_keys(ctx: &mut TemplateContext, config: &ProjectConfig, blueprint: &Blueprint) {
        let auth_type = config
            .features
            .as_ref()
            .and_then(|f| f.authentication.as_ref())
            .map(|a| a.auth_type.clone())
            .filter(|t| !t.is_empty())
            .or_else(|| {
                config
                    .variables
                    .get("AuthType")
                    .filter(|t| !t.is_empty())
                    .cloned()
            })
            .or_else(|| {
                blueprint
                    .variable_default("AuthType")
                    .map(value_to_string)
                    .filter(|t| !t.is_empty())
            })
            .unwrap_or_default();

        ctx.insert("AuthType".into(), json!(auth_type));
    }

    fn orm_keys(ctx: &mut TemplateContext, config: &ProjectConfig, blueprint: &Blueprint) {
        let orm = config
            .features
            .as_ref()
            .and_then(|f| f.database.as_ref())
            .and_then(|db| db.orm.clone())
            .filter(|o| !o.is_empty())
            .or_else(|| {
                config
                    .variables
                    .get("DatabaseORM")
                    .filter(|o| !o.is_empty())
                    .cloned()
            })
            .or_else(|| {
                blueprint
                    .variable_default("DatabaseORM")
                    .map(value_to_string)
                    .filter(|o| !o.is_empty())
            })
            .unwrap_or_default();

        // Unsupported ORM values fall back to raw SQL rather than failing
        // the run.
        let orm = if SUPPORTED_ORMS.contains(&orm.as_str()) {
            orm
        } else {
            debug!(orm = %orm, "unsupported ORM, falling back to raw SQL");
            String::new()
        };

        ctx.insert("ORM".into(), json!(orm));
        ctx.insert("DatabaseORM".into(), json!(orm));
    }
}

fn driver_flag(driver: &str) -> Option<&'static str> {
    match driver {
        "postgresql" | "postgres" => Some("HasPostgreSQL"),
        "mysql" => Some("HasMySQL"),
        "mongodb" | "mongo" => Some("HasMongoDB"),
        "sqlite" => Some("HasSQLite"),
        "redis" => Some("HasRedis"),
        _ => None,
    }
}

/// Render a scalar blueprint default as the string the context stores.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::{Blueprint, BlueprintVariable};
    use crate::config::{AuthFeature, DatabaseFeature, Features, LoggingFeature};
    use pretty_assertions::assert_eq;

    fn blueprint_with_defaults(defaults: &[(&str, Value)]) -> Blueprint {
        let variables = defaults
            .iter()
            .map(|(name, default)| BlueprintVariable {
                name: name.to_string(),
                var_type: "string".to_string(),
                required: false,
                default: Some(default.clone()),
                choices: Vec::new(),
            })
            .collect();
        Blueprint {
            id: "web-api".to_string(),
            name: "Web API".to_string(),
            description: String::new(),
            project_type: "web-api".to_string(),
            architecture: None,
            variables,
            files: Vec::new(),
            dependencies: Vec::new(),
            post_hooks: Vec::new(),
            metadata: Default::default(),
        }
    }

    fn base_config() -> ProjectConfig {
        ProjectConfig::new("orders", "github.com/acme/orders", "web-api")
    }

    #[test]
    fn test_base_keys_and_go_version_default() {
        let blueprint = blueprint_with_defaults(&[]);
        let ctx = ContextBuilder::build(&base_config(), &blueprint);

        assert_eq!(ctx["ProjectName"], json!("orders"));
        assert_eq!(ctx["ModulePath"], json!("github.com/acme/orders"));
        assert_eq!(ctx["Type"], json!("web-api"));
        assert_eq!(ctx["GoVersion"], json!(DEFAULT_GO_VERSION));
        assert_eq!(ctx["Framework"], json!(""));

        let mut config = base_config();
        config.go_version = Some("auto".to_string());
        let ctx = ContextBuilder::build(&config, &blueprint);
        assert_eq!(ctx["GoVersion"], json!(DEFAULT_GO_VERSION));

        config.go_version = Some("1.22".to_string());
        let ctx = ContextBuilder::build(&config, &blueprint);
        assert_eq!(ctx["GoVersion"], json!("1.22"));
    }

    #[test]
    fn test_logger_keys_set_exactly_one_flag() {
        let blueprint = blueprint_with_defaults(&[]);
        let mut config = base_config();
        config.logger = Some("zap".to_string());
        config.features = Some(Features {
            logging: Some(LoggingFeature {
                level: Some("debug".to_string()),
                format: None,
                structured: None,
            }),
            ..Default::default()
        });

        let ctx = ContextBuilder::build(&config, &blueprint);
        assert_eq!(ctx["LoggerType"], json!("zap"));
        assert_eq!(ctx["UseZap"], json!(true));
        assert_eq!(ctx["UseSlog"], json!(false));
        assert_eq!(ctx["UseLogrus"], json!(false));
        assert_eq!(ctx["UseZerolog"], json!(false));
        assert_eq!(
            ctx["LoggerConfig"],
            json!({"Type": "zap", "Level": "debug", "Format": "json", "Structured": true})
        );
    }

    #[test]
    fn test_variables_override_base_keys_and_defaults_fill_gaps() {
        let blueprint = blueprint_with_defaults(&[
            ("Framework", json!("gin")),
            ("Port", json!("8080")),
        ]);
        let mut config = base_config();
        config
            .variables
            .insert("License".to_string(), "MIT".to_string());

        let ctx = ContextBuilder::build(&config, &blueprint);
        // variables override the (empty) base key
        assert_eq!(ctx["License"], json!("MIT"));
        // blueprint default fills a key nothing else bound
        assert_eq!(ctx["Port"], json!("8080"));
        // Framework base key is already bound (empty string), so the
        // blueprint default does not replace it
        assert_eq!(ctx["Framework"], json!(""));
    }

    #[test]
    fn test_database_driver_precedence() {
        let blueprint = blueprint_with_defaults(&[("DatabaseDriver", json!("sqlite"))]);

        // features list wins
        let mut config = base_config();
        config.features = Some(Features {
            database: Some(DatabaseFeature {
                drivers: vec!["postgresql".to_string()],
                driver: Some("mysql".to_string()),
                orm: None,
            }),
            ..Default::default()
        });
        config
            .variables
            .insert("DatabaseDriver".to_string(), "mongodb".to_string());
        let ctx = ContextBuilder::build(&config, &blueprint);
        assert_eq!(ctx["DatabaseDriver"], json!("postgresql"));
        assert_eq!(ctx["HasPostgreSQL"], json!(true));

        // then the legacy scalar
        let mut config = base_config();
        config.features = Some(Features {
            database: Some(DatabaseFeature {
                drivers: Vec::new(),
                driver: Some("mysql".to_string()),
                orm: None,
            }),
            ..Default::default()
        });
        let ctx = ContextBuilder::build(&config, &blueprint);
        assert_eq!(ctx["DatabaseDriver"], json!("mysql"));
        assert_eq!(ctx["HasMySQL"], json!(true));

        // then variables
        let mut config = base_config();
        config
            .variables
            .insert("DatabaseDriver".to_string(), "mongodb".to_string());
        let ctx = ContextBuilder::build(&config, &blueprint);
        assert_eq!(ctx["DatabaseDriver"], json!("mongodb"));
        assert_eq!(ctx["HasMongoDB"], json!(true));

        // then the blueprint default
        let ctx = ContextBuilder::build(&base_config(), &blueprint);
        assert_eq!(ctx["DatabaseDriver"], json!("sqlite"));
        assert_eq!(ctx["HasSQLite"], json!(true));
        assert_eq!(ctx["HasDatabase"], json!(true));
    }

    #[test]
    fn test_no_database_means_no_flags() {
        let blueprint = blueprint_with_defaults(&[]);
        let ctx = ContextBuilder::build(&base_config(), &blueprint);
        assert_eq!(ctx["DatabaseDriver"], json!(""));
        assert_eq!(ctx["DatabaseDrivers"], json!([]));
        assert_eq!(ctx["HasDatabase"], json!(false));
        assert!(!ctx.contains_key("HasPostgreSQL"));
        assert!(!ctx.contains_key("HasMultipleDatabases"));
    }

    #[test]
    fn test_multiple_databases_secondary_roles() {
        let blueprint = blueprint_with_defaults(&[]);
        let mut config = base_config();
        config.features = Some(Features {
            database: Some(DatabaseFeature {
                drivers: vec![
                    "postgresql".to_string(),
                    "redis".to_string(),
                    "mongodb".to_string(),
                ],
                driver: None,
                orm: None,
            }),
            ..Default::default()
        });

        let ctx = ContextBuilder::build(&config, &blueprint);
        assert_eq!(ctx["HasMultipleDatabases"], json!(true));
        assert_eq!(ctx["HasRedisCache"], json!(true));
        assert_eq!(ctx["HasMongoAnalytics"], json!(true));
        assert_eq!(ctx["HasPostgreSQL"], json!(true));
        assert_eq!(ctx["HasRedis"], json!(true));
        assert_eq!(ctx["HasMongoDB"], json!(true));
        assert_eq!(
            ctx["DatabaseDrivers"],
            json!(["postgresql", "redis", "mongodb"])
        );
    }

    #[test]
    fn test_auth_type_precedence() {
        let blueprint = blueprint_with_defaults(&[("AuthType", json!("session"))]);

        let mut config = base_config();
        config.features = Some(Features {
            authentication: Some(AuthFeature {
                auth_type: "jwt".to_string(),
            }),
            ..Default::default()
        });
        config
            .variables
            .insert("AuthType".to_string(), "oauth2".to_string());
        let ctx = ContextBuilder::build(&config, &blueprint);
        assert_eq!(ctx["AuthType"], json!("jwt"));

        let mut config = base_config();
        config
            .variables
            .insert("AuthType".to_string(), "oauth2".to_string());
        let ctx = ContextBuilder::build(&config, &blueprint);
        assert_eq!(ctx["AuthType"], json!("oauth2"));

        let ctx = ContextBuilder::build(&base_config(), &blueprint);
        assert_eq!(ctx["AuthType"], json!("session"));
    }

    #[test]
    fn test_unsupported_orm_coerces_to_empty() {
        let blueprint = blueprint_with_defaults(&[]);
        let mut config = base_config();
        config.features = Some(Features {
            database: Some(DatabaseFeature {
                drivers: vec!["postgresql".to_string()],
                driver: None,
                orm: Some("sqlboiler".to_string()),
            }),
            ..Default::default()
        });

        let ctx = ContextBuilder::build(&config, &blueprint);
        assert_eq!(ctx["ORM"], json!(""));
        assert_eq!(ctx["DatabaseORM"], json!(""));

        config.features.as_mut().unwrap().database.as_mut().unwrap().orm =
            Some("gorm".to_string());
        let ctx = ContextBuilder::build(&config, &blueprint);
        assert_eq!(ctx["ORM"], json!("gorm"));
    }

    #[test]
    fn test_context_is_deterministic() {
        let blueprint = blueprint_with_defaults(&[("Framework", json!("gin"))]);
        let mut config = base_config();
        config.logger = Some("slog".to_string());
        config
            .variables
            .insert("AuthType".to_string(), "jwt".to_string());
        config
            .variables
            .insert("Custom".to_string(), "x".to_string());

        let first = ContextBuilder::build(&config, &blueprint);
        let second = ContextBuilder::build(&config, &blueprint);
        assert_eq!(first, second);
    }
}
