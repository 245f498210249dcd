//! SoftDelete: installs the managed fields into a schema and implements the
//! [`Middleware`] hooks that keep deleted records out of default reads.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};
use crate::fields::DeletedFields;
use crate::middleware::Middleware;
use crate::options::{DeletedField, Method, Property, SoftDeleteOptions};
use crate::query::pipeline::rewrite_pipeline;
use crate::query::rewrite::rewrite_query;
use crate::query::types::{DeletedScope, Query, StoreQuery};
use crate::schema::node::{is_indexable_node, t, FieldDef, SchemaNode};
use crate::schema::{FieldIndex, Schema};
use crate::types::{SaveOptions, UpdateOptions};
use crate::update;

// ============================================================================
// SoftDelete
// ============================================================================

/// An installed soft-delete plugin. Immutable after [`SoftDelete::install`].
#[derive(Debug, Clone)]
pub struct SoftDelete {
    fields: DeletedFields,
    options: SoftDeleteOptions,
}

impl SoftDelete {
    /// Install into `schema`: resolve and validate the stored names, add the
    /// managed fields and the selected indexes.
    ///
    /// Nothing is added to the schema when an error is returned.
    pub fn install(schema: &mut Schema, options: SoftDeleteOptions) -> Result<Arc<Self>> {
        let fields = DeletedFields::resolve(&options)?;

        // the marker is always written and queried as a JSON boolean
        if let Some(node) = options.deleted.field_options().and_then(|o| o.schema.as_ref()) {
            if *node != SchemaNode::Boolean {
                return Err(ConfigError::InvalidMarkerType {
                    name: fields.deleted().to_string(),
                    found: format!("{node:?}"),
                }
                .into());
            }
        }

        for (property, name) in fields.enabled() {
            if schema.contains(name) {
                return Err(ConfigError::FieldConflict {
                    schema: schema.name().to_string(),
                    property: property.to_string(),
                    name: name.to_string(),
                }
                .into());
            }
        }

        for (property, name) in fields.enabled() {
            schema.add_field(name, field_def(property, name, option_for(&options, property)));
        }

        let mut indexed = Vec::new();
        for (property, name) in fields.enabled() {
            if !options.index_fields.includes(property) {
                continue;
            }
            // Any / Array fields cannot back an index
            if schema.get(name).is_some_and(|def| is_indexable_node(&def.node)) {
                schema.add_index(FieldIndex::single(name));
                indexed.push(name.to_string());
            } else {
                tracing::warn!(field = name, "skipping index on non-indexable field");
            }
        }

        tracing::debug!(
            schema = schema.name(),
            deleted = fields.deleted(),
            deleted_at = fields.deleted_at(),
            deleted_by = fields.deleted_by(),
            indexes = ?indexed,
            "installed soft delete"
        );

        Ok(Arc::new(Self { fields, options }))
    }

    pub fn fields(&self) -> &DeletedFields {
        &self.fields
    }

    pub fn options(&self) -> &SoftDeleteOptions {
        &self.options
    }

    /// Whether `method` filters out deleted records when no scope is given.
    pub fn filters_by_default(&self, method: Method) -> bool {
        self.options.override_methods.includes(method)
    }

    /// `$set` update for a static delete.
    pub fn delete_update(&self, actor: Option<&Value>) -> Value {
        update::delete_update(&self.fields, &update::now_timestamp(), actor)
    }

    /// `$set` / `$unset` update for a static restore.
    pub fn restore_update(&self) -> Value {
        update::restore_update(&self.fields)
    }

    /// Mark a document deleted in place.
    pub fn mark_deleted(&self, doc: &mut Map<String, Value>, actor: Option<&Value>) {
        update::apply_delete(doc, &self.fields, &update::now_timestamp(), actor);
    }

    /// Clear the deleted state of a document in place.
    pub fn mark_restored(&self, doc: &mut Map<String, Value>) {
        update::apply_restore(doc, &self.fields);
    }

    /// Timestamp option for delete and restore writes.
    fn write_timestamps(&self, requested: Option<bool>) -> Option<bool> {
        if self.options.touch_timestamps {
            requested
        } else {
            Some(false)
        }
    }

    /// Save options for an instance delete or restore.
    pub fn lifecycle_save_options(&self, mut opts: SaveOptions) -> SaveOptions {
        if let Some(validate) = self.options.validate_before_delete {
            opts.validate = Some(validate);
        }
        opts.timestamps = self.write_timestamps(opts.timestamps);
        opts
    }

    /// Update options for a static delete or restore.
    pub fn lifecycle_update_options(&self, mut opts: UpdateOptions) -> UpdateOptions {
        opts.timestamps = self.write_timestamps(opts.timestamps);
        opts
    }
}

fn option_for(options: &SoftDeleteOptions, property: Property) -> &DeletedField {
    match property {
        Property::Deleted => &options.deleted,
        Property::DeletedAt => &options.deleted_at,
        Property::DeletedBy => &options.deleted_by,
    }
}

fn field_def(property: Property, name: &str, option: &DeletedField) -> FieldDef {
    let field_options = option.field_options();
    let required = field_options.is_some_and(|o| o.required);
    let node = field_options
        .and_then(|o| o.schema.clone())
        .unwrap_or_else(|| default_node(property));

    let mut def = match property {
        Property::Deleted => FieldDef::new(node).default_value(Value::Bool(false)),
        Property::DeletedAt | Property::DeletedBy if required => FieldDef::new(node),
        Property::DeletedAt | Property::DeletedBy => FieldDef::new(optional(node)),
    }
    .required(required);

    if name != property.as_str() {
        def = def.alias(property.as_str());
    }
    def
}

fn default_node(property: Property) -> SchemaNode {
    match property {
        Property::Deleted => t::boolean(),
        Property::DeletedAt => t::date(),
        Property::DeletedBy => t::reference(),
    }
}

fn optional(node: SchemaNode) -> SchemaNode {
    match node {
        SchemaNode::Optional(_) => node,
        other => t::optional(other),
    }
}

// ============================================================================
// Middleware
// ============================================================================

impl Middleware for SoftDelete {
    fn on_save(&self, doc: &mut Map<String, Value>) {
        let field = self.fields.deleted();
        if doc.get(field).map_or(true, Value::is_null) {
            doc.insert(field.to_string(), Value::Bool(false));
        }
    }

    fn on_query(&self, method: Method, query: Query) -> StoreQuery {
        let _span = tracing::trace_span!("soft_delete", %method).entered();
        rewrite_query(query, self.fields.deleted(), self.filters_by_default(method))
    }

    fn on_aggregate(&self, stages: &mut Vec<Value>, scope: Option<DeletedScope>) {
        let _span = tracing::trace_span!("soft_delete", method = %Method::Aggregate).entered();
        rewrite_pipeline(
            stages,
            self.fields.deleted(),
            scope,
            self.filters_by_default(Method::Aggregate),
        );
    }
}
