use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{ValidationError, ValidationErrors};

use super::definition::Schema;
use super::node::SchemaNode;

// ============================================================================
// ISO 8601 Date Regex
// ============================================================================

/// Compiled once at first use.
fn iso_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d{1,9})?(?:Z|[+-]\d{2}:\d{2})?$")
            .expect("ISO date regex is valid")
    })
}

// ============================================================================
// Validation Context
// ============================================================================

struct ValidationContext {
    errors: Vec<ValidationError>,
    path: Vec<String>,
}

impl ValidationContext {
    fn new() -> Self {
        Self {
            errors: vec![],
            path: vec![],
        }
    }

    fn push_key(&mut self, key: impl Into<String>) {
        self.path.push(key.into());
    }

    fn push_index(&mut self, idx: usize) {
        self.path.push(format!("[{idx}]"));
    }

    fn pop(&mut self) {
        self.path.pop();
    }

    /// Join path segments, collapsing `".[0]"` → `"[0]"`.
    fn current_path(&self) -> String {
        self.path.join(".").replace(".[", "[")
    }

    fn add_error(&mut self, expected: impl Into<String>, received: impl Into<String>) {
        self.errors.push(ValidationError {
            path: self.current_path(),
            expected: expected.into(),
            received: received.into(),
        });
    }
}

// ============================================================================
// Type Name Helpers
// ============================================================================

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validate ISO 8601 format + semantic correctness via chrono.
fn is_valid_iso_date(s: &str) -> bool {
    if !iso_date_regex().is_match(s) {
        return false;
    }
    let has_offset = s.ends_with('Z') || s[10..].contains('+') || s[10..].contains('-');
    let normalised = if has_offset {
        s.to_string()
    } else {
        format!("{s}Z")
    };
    chrono::DateTime::parse_from_rfc3339(&normalised).is_ok()
}

// ============================================================================
// Core Walker
// ============================================================================

fn walk(schema: &SchemaNode, value: &Value, ctx: &mut ValidationContext) {
    match schema {
        SchemaNode::Any => {}
        SchemaNode::Optional(inner) => {
            if !value.is_null() {
                walk(inner, value, ctx);
            }
        }
        SchemaNode::String | SchemaNode::Key | SchemaNode::Reference => {
            if !value.is_string() {
                ctx.add_error("string", type_name(value));
            }
        }
        SchemaNode::Number => {
            if !value.is_number() {
                ctx.add_error("number", type_name(value));
            }
        }
        SchemaNode::Boolean => {
            if !value.is_boolean() {
                ctx.add_error("boolean", type_name(value));
            }
        }
        SchemaNode::Date | SchemaNode::CreatedAt | SchemaNode::UpdatedAt => match value.as_str() {
            Some(s) if is_valid_iso_date(s) => {}
            Some(_) => ctx.add_error("ISO 8601 date", "invalid date string"),
            None => ctx.add_error("ISO 8601 date", type_name(value)),
        },
        SchemaNode::Array(element) => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    ctx.push_index(i);
                    walk(element, item, ctx);
                    ctx.pop();
                }
            }
            None => ctx.add_error("array", type_name(value)),
        },
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Validate a document against a schema.
///
/// Required fields must be present and non-empty. Present, non-null values
/// must match their field type. Keys not declared in the schema are allowed.
pub fn validate_document(schema: &Schema, doc: &Map<String, Value>) -> Result<(), ValidationErrors> {
    let mut ctx = ValidationContext::new();

    for (name, def) in schema.fields() {
        let value = doc.get(name);
        ctx.push_key(name.as_str());
        if is_empty(value) {
            if def.required {
                let received = value.map(type_name).unwrap_or("missing");
                ctx.add_error("required value", received);
            }
        } else if let Some(v) = value {
            walk(&def.node, v, &mut ctx);
        }
        ctx.pop();
    }

    if ctx.errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(ctx.errors))
    }
}
