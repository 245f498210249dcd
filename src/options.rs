//! Plugin configuration.
//!
//! `SoftDeleteOptions` deserializes from the camelCase shape used in config
//! files (`{ "deletedAt": true, "overrideMethods": ["find"] }`) and can also be
//! assembled in code with the builder methods.

use serde::{Deserialize, Serialize};

use crate::schema::node::SchemaNode;

// ============================================================================
// Method / Property
// ============================================================================

/// Model methods that can have the default "exclude deleted" filter applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Method {
    Count,
    CountDocuments,
    Find,
    FindOne,
    FindOneAndUpdate,
    Update,
    UpdateOne,
    UpdateMany,
    Aggregate,
}

impl Method {
    pub const ALL: [Method; 9] = [
        Method::Count,
        Method::CountDocuments,
        Method::Find,
        Method::FindOne,
        Method::FindOneAndUpdate,
        Method::Update,
        Method::UpdateOne,
        Method::UpdateMany,
        Method::Aggregate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Count => "count",
            Method::CountDocuments => "countDocuments",
            Method::Find => "find",
            Method::FindOne => "findOne",
            Method::FindOneAndUpdate => "findOneAndUpdate",
            Method::Update => "update",
            Method::UpdateOne => "updateOne",
            Method::UpdateMany => "updateMany",
            Method::Aggregate => "aggregate",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three properties the plugin manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    Deleted,
    DeletedAt,
    DeletedBy,
}

impl Property {
    pub fn as_str(&self) -> &'static str {
        match self {
            Property::Deleted => "deleted",
            Property::DeletedAt => "deletedAt",
            Property::DeletedBy => "deletedBy",
        }
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DeletedField
// ============================================================================

/// Field options for a managed property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FieldOptions {
    /// Stored field name. Falls back to the property name.
    pub name: Option<String>,
    /// Field type override. Defaults per property.
    pub schema: Option<SchemaNode>,
    pub required: bool,
}

impl FieldOptions {
    fn is_empty(&self) -> bool {
        self.name.as_deref().map_or(true, str::is_empty) && self.schema.is_none() && !self.required
    }
}

/// `true` / `false`, a custom stored name, or full field options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeletedField {
    Enabled(bool),
    Name(String),
    Options(FieldOptions),
}

impl Default for DeletedField {
    fn default() -> Self {
        DeletedField::Enabled(false)
    }
}

impl DeletedField {
    /// Whether the option turns the field on. Empty names and empty option
    /// objects count as off.
    pub fn is_enabled(&self) -> bool {
        match self {
            DeletedField::Enabled(b) => *b,
            DeletedField::Name(n) => !n.is_empty(),
            DeletedField::Options(o) => !o.is_empty(),
        }
    }

    /// The configured stored name, if one was given.
    pub fn custom_name(&self) -> Option<&str> {
        match self {
            DeletedField::Name(n) if !n.is_empty() => Some(n),
            DeletedField::Options(FieldOptions { name: Some(n), .. }) if !n.is_empty() => Some(n),
            _ => None,
        }
    }

    pub fn field_options(&self) -> Option<&FieldOptions> {
        match self {
            DeletedField::Options(o) => Some(o),
            _ => None,
        }
    }
}

impl From<bool> for DeletedField {
    fn from(b: bool) -> Self {
        DeletedField::Enabled(b)
    }
}

impl From<&str> for DeletedField {
    fn from(name: &str) -> Self {
        DeletedField::Name(name.to_string())
    }
}

impl From<FieldOptions> for DeletedField {
    fn from(o: FieldOptions) -> Self {
        DeletedField::Options(o)
    }
}

// ============================================================================
// Selections
// ============================================================================

/// `true` (every method), `false` (none) or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MethodSelection {
    All(bool),
    Only(Vec<Method>),
}

impl Default for MethodSelection {
    fn default() -> Self {
        MethodSelection::All(true)
    }
}

impl MethodSelection {
    pub fn includes(&self, method: Method) -> bool {
        match self {
            MethodSelection::All(b) => *b,
            MethodSelection::Only(list) => list.contains(&method),
        }
    }
}

/// `true` (all three), `false` (none) or an explicit list.
/// Default: only `deleted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexSelection {
    All(bool),
    Only(Vec<Property>),
}

impl Default for IndexSelection {
    fn default() -> Self {
        IndexSelection::Only(vec![Property::Deleted])
    }
}

impl IndexSelection {
    pub fn includes(&self, property: Property) -> bool {
        match self {
            IndexSelection::All(b) => *b,
            IndexSelection::Only(list) => list.contains(&property),
        }
    }
}

// ============================================================================
// SoftDeleteOptions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SoftDeleteOptions {
    /// Rename or retype the deleted marker. Disabling it is not possible;
    /// `false` behaves like `true`.
    pub deleted: DeletedField,
    pub deleted_at: DeletedField,
    pub deleted_by: DeletedField,
    pub override_methods: MethodSelection,
    pub index_fields: IndexSelection,
    /// Forces validation on or off for instance delete/restore saves.
    pub validate_before_delete: Option<bool>,
    /// Let delete/restore writes bump store-managed modification timestamps.
    pub touch_timestamps: bool,
}

impl Default for SoftDeleteOptions {
    fn default() -> Self {
        Self {
            deleted: DeletedField::Enabled(true),
            deleted_at: DeletedField::default(),
            deleted_by: DeletedField::default(),
            override_methods: MethodSelection::default(),
            index_fields: IndexSelection::default(),
            validate_before_delete: None,
            touch_timestamps: false,
        }
    }
}

impl SoftDeleteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deleted(mut self, field: impl Into<DeletedField>) -> Self {
        self.deleted = field.into();
        self
    }

    pub fn deleted_at(mut self, field: impl Into<DeletedField>) -> Self {
        self.deleted_at = field.into();
        self
    }

    pub fn deleted_by(mut self, field: impl Into<DeletedField>) -> Self {
        self.deleted_by = field.into();
        self
    }

    pub fn override_methods(mut self, methods: &[Method]) -> Self {
        self.override_methods = MethodSelection::Only(methods.to_vec());
        self
    }

    pub fn override_all_methods(mut self, enabled: bool) -> Self {
        self.override_methods = MethodSelection::All(enabled);
        self
    }

    pub fn index_fields(mut self, properties: &[Property]) -> Self {
        self.index_fields = IndexSelection::Only(properties.to_vec());
        self
    }

    pub fn index_all_fields(mut self, enabled: bool) -> Self {
        self.index_fields = IndexSelection::All(enabled);
        self
    }

    pub fn validate_before_delete(mut self, validate: bool) -> Self {
        self.validate_before_delete = Some(validate);
        self
    }

    pub fn touch_timestamps(mut self, touch: bool) -> Self {
        self.touch_timestamps = touch;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
