//! Field changes and update documents for delete and restore.

use serde_json::{json, Map, Value};

use crate::fields::DeletedFields;

/// Current time as an RFC 3339 UTC string.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Fields written by a soft delete. The actor is written only when the
/// actor field is enabled and the value is not `null`.
pub fn deleted_values(fields: &DeletedFields, now: &str, actor: Option<&Value>) -> Map<String, Value> {
    let mut values = Map::new();
    values.insert(fields.deleted().to_string(), Value::Bool(true));
    if let Some(name) = fields.deleted_at() {
        values.insert(name.to_string(), Value::String(now.to_string()));
    }
    if let (Some(name), Some(actor)) = (fields.deleted_by(), actor.filter(|a| !a.is_null())) {
        values.insert(name.to_string(), actor.clone());
    }
    values
}

/// `{ $set: { <deleted>: true, <deletedAt>: now, <deletedBy>: actor } }`
pub fn delete_update(fields: &DeletedFields, now: &str, actor: Option<&Value>) -> Value {
    json!({ "$set": Value::Object(deleted_values(fields, now, actor)) })
}

/// `{ $set: { <deleted>: false }, $unset: { <deletedAt>: 1, <deletedBy>: 1 } }`
///
/// `$unset` is omitted when neither optional field is enabled.
pub fn restore_update(fields: &DeletedFields) -> Value {
    let mut set = Map::new();
    set.insert(fields.deleted().to_string(), Value::Bool(false));

    let unset: Map<String, Value> = [fields.deleted_at(), fields.deleted_by()]
        .into_iter()
        .flatten()
        .map(|name| (name.to_string(), json!(1)))
        .collect();

    let mut update = Map::new();
    update.insert("$set".to_string(), Value::Object(set));
    if !unset.is_empty() {
        update.insert("$unset".to_string(), Value::Object(unset));
    }
    Value::Object(update)
}

/// Mark a document in place.
pub fn apply_delete(doc: &mut Map<String, Value>, fields: &DeletedFields, now: &str, actor: Option<&Value>) {
    doc.extend(deleted_values(fields, now, actor));
}

/// Unmark a document in place, removing the timestamp and actor keys.
pub fn apply_restore(doc: &mut Map<String, Value>, fields: &DeletedFields) {
    doc.insert(fields.deleted().to_string(), Value::Bool(false));
    for name in [fields.deleted_at(), fields.deleted_by()].into_iter().flatten() {
        doc.remove(name);
    }
}
