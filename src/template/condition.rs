//! Condition evaluation for gating files, dependencies and hooks.
//!
//! A condition is just a template string reduced to a boolean: expand it,
//! trim it, then apply the coercion table. Expansion failures follow the
//! path-expansion rule (diagnostic plus literal fallback), so a literal
//! `true`/`false` still gates correctly even if helper syntax is broken.

use super::{TemplateContext, TemplateExpander};

/// Evaluate a condition template against the context.
pub fn evaluate_condition(
    expander: &TemplateExpander,
    condition: &str,
    context: &TemplateContext,
) -> bool {
    coerce(&expander.expand_path(condition, context))
}

/// Coerce an expanded string to a boolean.
///
/// `true`/`false` literals are taken as-is; integers are truthy when
/// non-zero; anything else is truthy when non-empty.
pub(crate) fn coerce(expanded: &str) -> bool {
    let trimmed = expanded.trim();
    match trimmed {
        "true" => true,
        "false" => false,
        _ => trimmed
            .parse::<i64>()
            .map(|n| n != 0)
            .unwrap_or(!trimmed.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(condition: &str, pairs: &[(&str, serde_json::Value)]) -> bool {
        let expander = TemplateExpander::new();
        let context: TemplateContext = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        evaluate_condition(&expander, condition, &context)
    }

    #[test]
    fn test_literals() {
        assert!(eval("true", &[]));
        assert!(!eval("false", &[]));
        assert!(!eval("", &[]));
        assert!(!eval("  false  ", &[]));
    }

    #[test]
    fn test_integers() {
        assert!(eval("1", &[]));
        assert!(eval("-3", &[]));
        assert!(!eval("0", &[]));
        assert!(!eval(" 0 ", &[]));
    }

    #[test]
    fn test_non_empty_strings_are_truthy() {
        assert!(eval("yes", &[]));
        assert!(eval("anything", &[]));
    }

    #[test]
    fn test_expanded_conditions() {
        assert!(eval(
            r#"{{eq Framework "gin"}}"#,
            &[("Framework", json!("gin"))]
        ));
        assert!(!eval(
            r#"{{eq Framework "gin"}}"#,
            &[("Framework", json!("echo"))]
        ));
        // unresolved identifier expands to empty, which is falsy
        assert!(!eval("{{MissingFlag}}", &[]));
        // bound value expands to its string form
        assert!(eval("{{HasDatabase}}", &[("HasDatabase", json!(true))]));
        assert!(!eval("{{HasDatabase}}", &[("HasDatabase", json!(false))]));
    }

    mod properties {
        use super::super::coerce;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn integer_conditions_follow_sign(n in any::<i64>()) {
                prop_assert_eq!(coerce(&n.to_string()), n != 0);
            }

            #[test]
            fn alphabetic_strings_are_truthy(s in "[a-zA-Z]{1,16}") {
                prop_assume!(s != "true" && s != "false");
                prop_assert!(coerce(&s));
            }

            #[test]
            fn whitespace_only_is_falsy(s in "[ \t\n]{0,8}") {
                prop_assert!(!coerce(&s));
            }
        }
    }
}
