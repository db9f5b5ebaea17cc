//! Tolerant parser for model output.
//!
//! Model responses are untrusted text. They are decoded into a generic JSON
//! value first and then checked field by field, so a malformed response
//! yields a [`ParseError`] naming the offending path instead of a bare
//! decoder message.

use serde_json::{Map, Value};
use thiserror::Error;

use super::types::{GrocerySection, Recipe, RecipeSet};

/// Errors that can occur while turning model text into domain types.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("model response was empty")]
    Empty,

    #[error("model response is not valid JSON")]
    InvalidJson(#[from] serde_json::Error),

    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("expected {expected} at `{path}`, found {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Decode text into a JSON value.
///
/// If the text as a whole is not JSON, the outermost `{ ... }` span is tried
/// once, which recovers responses with a stray sentence before or after the
/// object. The original decoder error is reported if both attempts fail.
pub fn parse_value(text: &str) -> Result<Value, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(value),
        Err(err) => match outermost_object(trimmed) {
            Some(span) if span.len() < trimmed.len() => {
                serde_json::from_str(span).map_err(|_| ParseError::InvalidJson(err))
            }
            _ => Err(ParseError::InvalidJson(err)),
        },
    }
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse the full-plan response: `{ "lunches": [...], "dinners": [...] }`.
pub fn parse_recipe_set(text: &str) -> Result<RecipeSet, ParseError> {
    let root = parse_value(text)?;
    let obj = as_object(&root, "$")?;
    Ok(RecipeSet {
        lunches: recipe_list(obj, "lunches")?,
        dinners: recipe_list(obj, "dinners")?,
    })
}

/// Parse a single-recipe response.
///
/// A recipe nested under a lone `"recipe"` key is accepted as well.
pub fn parse_recipe(text: &str) -> Result<Recipe, ParseError> {
    let root = parse_value(text)?;
    let obj = as_object(&root, "$")?;
    match obj.get("recipe") {
        Some(inner) if !obj.contains_key("name") => recipe_from(inner, "recipe"),
        _ => recipe_from(&root, ""),
    }
}

/// Parse the grocery response: `{ "groceryList": [...] }`.
///
/// A bare top-level array of sections is accepted as well.
pub fn parse_grocery_list(text: &str) -> Result<Vec<GrocerySection>, ParseError> {
    let root = parse_value(text)?;
    let (sections, base) = match &root {
        Value::Array(items) => (items, String::new()),
        other => {
            let obj = as_object(other, "$")?;
            let list = required(obj, "", "groceryList")?;
            (as_array(list, "groceryList")?, "groceryList".to_string())
        }
    };

    sections
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let path = format!("{base}[{i}]");
            let obj = as_object(v, &path)?;
            Ok(GrocerySection {
                category: string_field(obj, &path, "category")?,
                items: string_list(obj, &path, "items")?,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn recipe_list(obj: &Map<String, Value>, field: &str) -> Result<Vec<Recipe>, ParseError> {
    let list = as_array(required(obj, "", field)?, field)?;
    list.iter()
        .enumerate()
        .map(|(i, v)| recipe_from(v, &format!("{field}[{i}]")))
        .collect()
}

fn recipe_from(value: &Value, path: &str) -> Result<Recipe, ParseError> {
    let display = if path.is_empty() { "$" } else { path };
    let obj = as_object(value, display)?;
    Ok(Recipe {
        id: string_field(obj, path, "id")?,
        name: string_field(obj, path, "name")?,
        description: string_field(obj, path, "description")?,
        cook_time: string_field(obj, path, "cookTime")?,
        servings: string_field(obj, path, "servings")?,
        ingredients: string_list(obj, path, "ingredients")?,
        steps: string_list(obj, path, "steps")?,
    })
}

fn join(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

fn required<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    field: &str,
) -> Result<&'a Value, ParseError> {
    match obj.get(field) {
        Some(Value::Null) | None => Err(ParseError::MissingField(join(path, field))),
        Some(v) => Ok(v),
    }
}

fn string_field(obj: &Map<String, Value>, path: &str, field: &str) -> Result<String, ParseError> {
    let value = required(obj, path, field)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| wrong_type(join(path, field), "string", value))
}

fn string_list(
    obj: &Map<String, Value>,
    path: &str,
    field: &str,
) -> Result<Vec<String>, ParseError> {
    let field_path = join(path, field);
    let items = as_array(required(obj, path, field)?, &field_path)?;
    items
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| wrong_type(format!("{field_path}[{i}]"), "string", v))
        })
        .collect()
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ParseError> {
    value
        .as_object()
        .ok_or_else(|| wrong_type(path.to_string(), "object", value))
}

fn as_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, ParseError> {
    value
        .as_array()
        .ok_or_else(|| wrong_type(path.to_string(), "array", value))
}

fn wrong_type(path: String, expected: &'static str, found: &Value) -> ParseError {
    ParseError::WrongType {
        path,
        expected,
        found: kind(found),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
