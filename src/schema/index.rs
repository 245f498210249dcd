//! Index declarations attached to a schema.

use serde::{Deserialize, Serialize};

/// Ascending single-field index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIndex {
    pub name: String,
    pub field: String,
}

impl FieldIndex {
    /// Index on `field`, named `idx_<field>`.
    pub fn single(field: &str) -> Self {
        Self {
            name: format!("idx_{field}"),
            field: field.to_string(),
        }
    }
}
