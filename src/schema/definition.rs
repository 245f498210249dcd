//! Collection schema: named fields, index declarations and the timestamp flag.
//!
//! `_id` is always present as a `Key` auto-field. `with_timestamps()` adds the
//! `createdAt` / `updatedAt` auto-fields that the store maintains on writes.

use std::collections::BTreeMap;

use super::index::FieldIndex;
use super::node::{created_at_schema, key_schema, updated_at_schema, FieldDef, SchemaNode};

/// Name of the record key field.
pub const KEY_FIELD: &str = "_id";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    fields: BTreeMap<String, FieldDef>,
    indexes: Vec<FieldIndex>,
    timestamps: bool,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(KEY_FIELD.to_string(), FieldDef::new(key_schema()));
        Self {
            name: name.into(),
            fields,
            indexes: vec![],
            timestamps: false,
        }
    }

    /// Add an optional field.
    pub fn field(mut self, name: &str, node: SchemaNode) -> Self {
        self.add_field(name, FieldDef::new(node));
        self
    }

    /// Add a field that validation requires to be present and non-empty.
    pub fn required(mut self, name: &str, node: SchemaNode) -> Self {
        self.add_field(name, FieldDef::new(node).required(true));
        self
    }

    /// Enable store-managed `createdAt` / `updatedAt`.
    pub fn with_timestamps(mut self) -> Self {
        self.timestamps = true;
        self.add_field(CREATED_AT_FIELD, FieldDef::new(created_at_schema()));
        self.add_field(UPDATED_AT_FIELD, FieldDef::new(updated_at_schema()));
        self
    }

    /// Insert or replace a field definition.
    pub fn add_field(&mut self, name: &str, def: FieldDef) {
        self.fields.insert(name.to_string(), def);
    }

    pub fn add_index(&mut self, index: FieldIndex) {
        if !self.indexes.iter().any(|i| i.name == index.name) {
            self.indexes.push(index);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldDef> {
        &self.fields
    }

    pub fn indexes(&self) -> &[FieldIndex] {
        &self.indexes
    }

    pub fn timestamps(&self) -> bool {
        self.timestamps
    }
}
