use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// SchemaNode Types
// ============================================================================

/// A schema node describing the type constraints of a document field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaNode {
    String,
    Number,
    Boolean,
    /// ISO 8601 / RFC 3339 timestamp string.
    Date,
    /// Identifier of another record (the value of its `_id`).
    Reference,
    /// Any JSON value.
    Any,
    Optional(Box<SchemaNode>),
    Array(Box<SchemaNode>),
    /// Auto-field: unique record identifier.
    Key,
    /// Auto-field: creation timestamp.
    CreatedAt,
    /// Auto-field: last-modified timestamp.
    UpdatedAt,
}

// ============================================================================
// Schema Builder API (`t` module)
// ============================================================================

/// Schema builder helpers. Usage: `t::string()`, `t::optional(t::date())`, etc.
pub mod t {
    use super::SchemaNode;

    pub fn string() -> SchemaNode {
        SchemaNode::String
    }

    pub fn number() -> SchemaNode {
        SchemaNode::Number
    }

    pub fn boolean() -> SchemaNode {
        SchemaNode::Boolean
    }

    pub fn date() -> SchemaNode {
        SchemaNode::Date
    }

    pub fn reference() -> SchemaNode {
        SchemaNode::Reference
    }

    pub fn any() -> SchemaNode {
        SchemaNode::Any
    }

    pub fn optional(inner: SchemaNode) -> SchemaNode {
        SchemaNode::Optional(Box::new(inner))
    }

    pub fn array(element: SchemaNode) -> SchemaNode {
        SchemaNode::Array(Box::new(element))
    }
}

// ============================================================================
// FieldDef
// ============================================================================

/// A named field of a [`Schema`](super::Schema).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub node: SchemaNode,
    /// Validation rejects documents where the field is missing, `null` or `""`.
    #[serde(default)]
    pub required: bool,
    /// Value written on insert when the field is missing.
    #[serde(default)]
    pub default: Option<Value>,
    /// Canonical name of a renamed field. Metadata only: documents, filters
    /// and updates always use the stored name.
    #[serde(default)]
    pub alias: Option<String>,
}

impl FieldDef {
    pub fn new(node: SchemaNode) -> Self {
        Self {
            node,
            required: false,
            default: None,
            alias: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

// ============================================================================
// Internal Auto-Field Constructors
// ============================================================================

pub fn key_schema() -> SchemaNode {
    SchemaNode::Key
}

pub fn created_at_schema() -> SchemaNode {
    SchemaNode::CreatedAt
}

pub fn updated_at_schema() -> SchemaNode {
    SchemaNode::UpdatedAt
}

// ============================================================================
// Predicate Helpers
// ============================================================================

/// Returns true for types that can be stored in an index.
pub fn is_indexable_node(node: &SchemaNode) -> bool {
    match node {
        SchemaNode::Optional(inner) => is_indexable_node(inner),
        SchemaNode::Array(_) | SchemaNode::Any => false,
        _ => true,
    }
}
