//! Blueprint-facing helper functions.
//!
//! These names are part of the external contract; blueprints reference
//! them verbatim. Comparison helpers (`eq`, `ne`) ship with handlebars
//! itself, so only string manipulation is registered here.

use handlebars::{
    Context, Handlebars, Helper, HelperResult, Output, RenderContext, RenderError,
};

/// Register the helper table on a fresh registry.
pub fn register(registry: &mut Handlebars<'_>) {
    registry.register_helper("replace", Box::new(replace_helper));
    registry.register_helper("lower", Box::new(lower_helper));
    registry.register_helper("upper", Box::new(upper_helper));
    registry.register_helper("title", Box::new(title_helper));
    registry.register_helper("trim", Box::new(trim_helper));
    registry.register_helper("snakecase", Box::new(snakecase_helper));
    registry.register_helper("kebabcase", Box::new(kebabcase_helper));
    registry.register_helper("camelcase", Box::new(camelcase_helper));
    registry.register_helper("pascalcase", Box::new(pascalcase_helper));
}

fn param_str<'a>(h: &'a Helper, index: usize) -> &'a str {
    h.param(index).and_then(|v| v.value().as_str()).unwrap_or("")
}

fn replace_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let input = param_str(h, 0);
    let from = h
        .param(1)
        .and_then(|v| v.value().as_str())
        .ok_or_else(|| RenderError::new("replace requires a search string"))?;
    let to = param_str(h, 2);
    out.write(&input.replace(from, to))?;
    Ok(())
}

fn lower_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&param_str(h, 0).to_lowercase())?;
    Ok(())
}

fn upper_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&param_str(h, 0).to_uppercase())?;
    Ok(())
}

fn title_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let titled = param_str(h, 0)
        .split(' ')
        .map(capitalize_first_letter)
        .collect::<Vec<_>>()
        .join(" ");
    out.write(&titled)?;
    Ok(())
}

fn trim_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(param_str(h, 0).trim())?;
    Ok(())
}

fn snakecase_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&to_separated(param_str(h, 0), '_'))?;
    Ok(())
}

fn kebabcase_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&to_separated(param_str(h, 0), '-'))?;
    Ok(())
}

fn camelcase_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let mut words = split_words(param_str(h, 0)).into_iter();
    let mut result = String::new();
    if let Some(first) = words.next() {
        result.push_str(&first.to_lowercase());
    }
    for word in words {
        result.push_str(&capitalize_first_letter(&word));
    }
    out.write(&result)?;
    Ok(())
}

fn pascalcase_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let result: String = split_words(param_str(h, 0))
        .into_iter()
        .map(|w| capitalize_first_letter(&w))
        .collect();
    out.write(&result)?;
    Ok(())
}

/// Split an identifier on case boundaries, `-`, `_` and spaces.
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for c in input.chars() {
        if matches!(c, '-' | '_' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if c.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
            current.push(c);
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn to_separated(input: &str, separator: char) -> String {
    split_words(input)
        .into_iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(&separator.to_string())
}

fn capitalize_first_letter(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{TemplateContext, TemplateExpander};
    use serde_json::json;

    fn render(template: &str) -> String {
        let expander = TemplateExpander::new();
        let mut context = TemplateContext::new();
        context.insert("Name".to_string(), json!("orders-api"));
        context.insert("Padded".to_string(), json!("  x  "));
        context.insert("Mixed".to_string(), json!("userAccountID"));
        expander.expand_body("t", template, &context).unwrap()
    }

    #[test]
    fn test_case_helpers() {
        assert_eq!(render("{{snakecase Name}}"), "orders_api");
        assert_eq!(render("{{kebabcase Mixed}}"), "user-account-i-d");
        assert_eq!(render("{{pascalcase Name}}"), "OrdersApi");
        assert_eq!(render("{{camelcase Name}}"), "ordersApi");
        assert_eq!(render("{{upper Name}}"), "ORDERS-API");
        assert_eq!(render("{{lower Mixed}}"), "useraccountid");
        assert_eq!(render("{{title Name}}"), "Orders-api");
    }

    #[test]
    fn test_replace_and_trim() {
        assert_eq!(render(r#"{{replace Name "-" "/"}}"#), "orders/api");
        assert_eq!(render("{{trim Padded}}"), "x");
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("user_account-id"), vec!["user", "account", "id"]);
        assert_eq!(split_words("HttpServer"), vec!["Http", "Server"]);
        assert!(split_words("").is_empty());
    }
}
