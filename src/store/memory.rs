//! MemoryStore: an in-memory [`DocumentStore`] over a [`Schema`].
//!
//! Records live in insertion order behind a `parking_lot::Mutex`. All work
//! happens in synchronous helpers; the lock is never held across an `.await`.
//!
//! Engine behavior mirrors a document database closely enough to exercise the
//! plugin: `_id` generation, schema defaults, schema validation on insert and
//! save, store-managed `createdAt` / `updatedAt`, `$set` / `$unset` / `$inc`
//! updates with upsert, and a pipeline of `$match`, `$project`, `$sort`,
//! `$skip`, `$limit` and `$count` stages.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use crate::error::StoreError;
use crate::query::execute::{
    count_matching, execute_query, find_first, matching_positions, paginate_records, sort_records,
};
use crate::query::operators::{as_operator, filter_records};
use crate::query::types::{SortDirection, SortEntry, StoreQuery};
use crate::schema::definition::{Schema, CREATED_AT_FIELD, KEY_FIELD, UPDATED_AT_FIELD};
use crate::schema::validate::validate_document;
use crate::types::{SaveOptions, UpdateOptions, UpdateResult};

use super::traits::DocumentStore;

// ============================================================================
// MemoryStore
// ============================================================================

pub struct MemoryStore {
    schema: Schema,
    records: Mutex<Vec<Value>>,
}

impl MemoryStore {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Copy of every stored record, unfiltered.
    pub fn snapshot(&self) -> Vec<Value> {
        self.records.lock().clone()
    }

    /// Remove every record.
    pub fn clear(&self) {
        self.records.lock().clear();
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn now() -> String {
        chrono::Utc::now().to_rfc3339()
    }

    fn use_timestamps(&self, requested: Option<bool>) -> bool {
        self.schema.timestamps() && requested.unwrap_or(true)
    }

    fn validate(&self, doc: &Map<String, Value>) -> Result<(), StoreError> {
        validate_document(&self.schema, doc).map_err(StoreError::from)
    }

    /// Fill `_id`, schema defaults and creation timestamps on a new document.
    fn prepare_new(&self, mut doc: Map<String, Value>, timestamps: bool) -> Map<String, Value> {
        if doc.get(KEY_FIELD).map_or(true, Value::is_null) {
            doc.insert(
                KEY_FIELD.to_string(),
                Value::String(uuid::Uuid::new_v4().to_string()),
            );
        }
        for (name, def) in self.schema.fields() {
            if let Some(default) = &def.default {
                if doc.get(name).map_or(true, Value::is_null) {
                    doc.insert(name.clone(), default.clone());
                }
            }
        }
        if timestamps {
            let now = Self::now();
            doc.entry(CREATED_AT_FIELD.to_string())
                .or_insert_with(|| Value::String(now.clone()));
            doc.insert(UPDATED_AT_FIELD.to_string(), Value::String(now));
        }
        doc
    }

    fn duplicate_check(&self, records: &[Value], doc: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(id) = doc.get(KEY_FIELD) {
            if position_of(records, id).is_some() {
                return Err(StoreError::DuplicateKey {
                    collection: self.schema.name().to_string(),
                    id: display_id(id),
                });
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Synchronous operations
    // -----------------------------------------------------------------------

    fn insert_sync(&self, doc: Value) -> Result<Value, StoreError> {
        let doc = self.prepare_new(into_object(doc)?, self.use_timestamps(None));
        self.validate(&doc)?;

        let mut records = self.records.lock();
        self.duplicate_check(&records, &doc)?;
        let stored = Value::Object(doc);
        records.push(stored.clone());
        Ok(stored)
    }

    fn save_sync(&self, doc: Value, opts: &SaveOptions) -> Result<Value, StoreError> {
        let mut doc = into_object(doc)?;
        let timestamps = self.use_timestamps(opts.timestamps);
        let validate = opts.validate.unwrap_or(true);

        let mut records = self.records.lock();
        let existing = doc.get(KEY_FIELD).and_then(|id| position_of(&records, id));
        match existing {
            Some(idx) => {
                if timestamps && records[idx].as_object() != Some(&doc) {
                    doc.insert(UPDATED_AT_FIELD.to_string(), Value::String(Self::now()));
                }
                if validate {
                    self.validate(&doc)?;
                }
                let stored = Value::Object(doc);
                records[idx] = stored.clone();
                Ok(stored)
            }
            None => {
                let doc = self.prepare_new(doc, timestamps);
                if validate {
                    self.validate(&doc)?;
                }
                let stored = Value::Object(doc);
                records.push(stored.clone());
                Ok(stored)
            }
        }
    }

    fn update_sync(
        &self,
        query: &StoreQuery,
        update: &Value,
        opts: &UpdateOptions,
        many: bool,
    ) -> Result<UpdateResult, StoreError> {
        let timestamps = self.use_timestamps(opts.timestamps);
        let mut records = self.records.lock();

        let mut targets = matching_positions(&records, query)?;
        if !many {
            targets.truncate(1);
        }

        // A failing update leaves every record untouched.
        let mut staged = Vec::with_capacity(targets.len());
        for &idx in &targets {
            if let Some(doc) = updated_copy(&records[idx], update, timestamps)? {
                staged.push((idx, doc));
            }
        }

        let mut result = UpdateResult {
            acknowledged: true,
            matched_count: targets.len() as u64,
            modified_count: staged.len() as u64,
            ..UpdateResult::default()
        };
        for (idx, doc) in staged {
            records[idx] = doc;
        }

        if targets.is_empty() && opts.upsert {
            let doc = self.upsert_document(query, update, timestamps)?;
            self.duplicate_check(&records, &doc)?;
            result.upserted_id = doc.get(KEY_FIELD).cloned();
            result.upserted_count = 1;
            records.push(Value::Object(doc));
        }

        Ok(result)
    }

    fn find_one_and_update_sync(
        &self,
        query: &StoreQuery,
        update: &Value,
        opts: &UpdateOptions,
    ) -> Result<Option<Value>, StoreError> {
        let timestamps = self.use_timestamps(opts.timestamps);
        let mut records = self.records.lock();

        let first = matching_positions(&records, query)?.into_iter().next();
        match first {
            Some(idx) => {
                let before = records[idx].clone();
                if let Some(after) = updated_copy(&before, update, timestamps)? {
                    records[idx] = after;
                }
                Ok(Some(if opts.return_new {
                    records[idx].clone()
                } else {
                    before
                }))
            }
            None if opts.upsert => {
                let doc = self.upsert_document(query, update, timestamps)?;
                self.duplicate_check(&records, &doc)?;
                let stored = Value::Object(doc);
                records.push(stored.clone());
                Ok(opts.return_new.then_some(stored))
            }
            None => Ok(None),
        }
    }

    /// New document for an upsert: filter equalities, then the update.
    fn upsert_document(
        &self,
        query: &StoreQuery,
        update: &Value,
        timestamps: bool,
    ) -> Result<Map<String, Value>, StoreError> {
        let mut doc = upsert_seed(query.filter.as_ref());
        apply_update(&mut doc, update)?;
        Ok(self.prepare_new(doc, timestamps))
    }

    fn aggregate_sync(&self, pipeline: &[Value]) -> Result<Vec<Value>, StoreError> {
        let mut docs = self.snapshot();
        for stage in pipeline {
            let (name, arg) = single_key(stage)?;
            docs = match name {
                "$match" => filter_records(&docs, arg)?,
                "$project" => project(docs, arg)?,
                "$sort" => sort_records(docs, &sort_spec(arg)?),
                "$skip" => paginate_records(docs, Some(stage_count(name, arg)?), None),
                "$limit" => paginate_records(docs, None, Some(stage_count(name, arg)?)),
                "$count" => {
                    let field = arg.as_str().filter(|s| !s.is_empty()).ok_or_else(|| {
                        StoreError::InvalidPipeline("$count expects a field name".to_string())
                    })?;
                    let mut out = Map::new();
                    out.insert(field.to_string(), json!(docs.len()));
                    vec![Value::Object(out)]
                }
                other => {
                    return Err(StoreError::InvalidPipeline(format!("unsupported stage {other}")));
                }
            };
        }
        Ok(docs)
    }
}

// ============================================================================
// DocumentStore impl
// ============================================================================

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, doc: Value) -> Result<Value, StoreError> {
        self.insert_sync(doc)
    }

    async fn save(&self, doc: Value, opts: &SaveOptions) -> Result<Value, StoreError> {
        self.save_sync(doc, opts)
    }

    async fn find(&self, query: &StoreQuery) -> Result<Vec<Value>, StoreError> {
        Ok(execute_query(&self.records.lock(), query)?.records)
    }

    async fn find_one(&self, query: &StoreQuery) -> Result<Option<Value>, StoreError> {
        Ok(find_first(&self.records.lock(), query)?)
    }

    async fn count_documents(&self, query: &StoreQuery) -> Result<u64, StoreError> {
        Ok(count_matching(&self.records.lock(), query)? as u64)
    }

    async fn update_one(
        &self,
        query: &StoreQuery,
        update: &Value,
        opts: &UpdateOptions,
    ) -> Result<UpdateResult, StoreError> {
        self.update_sync(query, update, opts, false)
    }

    async fn update_many(
        &self,
        query: &StoreQuery,
        update: &Value,
        opts: &UpdateOptions,
    ) -> Result<UpdateResult, StoreError> {
        self.update_sync(query, update, opts, true)
    }

    async fn find_one_and_update(
        &self,
        query: &StoreQuery,
        update: &Value,
        opts: &UpdateOptions,
    ) -> Result<Option<Value>, StoreError> {
        self.find_one_and_update_sync(query, update, opts)
    }

    async fn aggregate(&self, pipeline: &[Value]) -> Result<Vec<Value>, StoreError> {
        self.aggregate_sync(pipeline)
    }
}

// ============================================================================
// Free helpers
// ============================================================================

fn into_object(doc: Value) -> Result<Map<String, Value>, StoreError> {
    match doc {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::NotAnObject(other.to_string())),
    }
}

fn display_id(id: &Value) -> String {
    id.as_str().map(str::to_string).unwrap_or_else(|| id.to_string())
}

fn position_of(records: &[Value], id: &Value) -> Option<usize> {
    records.iter().position(|r| r.get(KEY_FIELD) == Some(id))
}

/// The record after `update`, or `None` when nothing changed.
fn updated_copy(record: &Value, update: &Value, timestamps: bool) -> Result<Option<Value>, StoreError> {
    let mut doc = record.as_object().cloned().unwrap_or_default();
    apply_update(&mut doc, update)?;
    if record.as_object() == Some(&doc) {
        return Ok(None);
    }
    if timestamps {
        doc.insert(UPDATED_AT_FIELD.to_string(), Value::String(MemoryStore::now()));
    }
    Ok(Some(Value::Object(doc)))
}

/// Apply an update document. Either every top-level key is an operator
/// (`$set`, `$unset`, `$inc`) or none is, in which case the keys are set.
fn apply_update(doc: &mut Map<String, Value>, update: &Value) -> Result<(), StoreError> {
    let ops = update
        .as_object()
        .ok_or_else(|| StoreError::InvalidUpdate("update must be an object".to_string()))?;

    let operator_keys = ops.keys().filter(|k| k.starts_with('$')).count();
    if operator_keys == 0 {
        for (field, value) in ops {
            set_field(doc, field, value)?;
        }
        return Ok(());
    }
    if operator_keys != ops.len() {
        return Err(StoreError::InvalidUpdate(
            "cannot mix update operators and plain fields".to_string(),
        ));
    }

    for (op, arg) in ops {
        let fields = arg
            .as_object()
            .ok_or_else(|| StoreError::InvalidUpdate(format!("{op} expects an object")))?;
        match op.as_str() {
            "$set" => {
                for (field, value) in fields {
                    set_field(doc, field, value)?;
                }
            }
            "$unset" => {
                for field in fields.keys() {
                    if field == KEY_FIELD {
                        return Err(StoreError::InvalidUpdate(format!("cannot unset {KEY_FIELD}")));
                    }
                    doc.remove(field);
                }
            }
            "$inc" => {
                for (field, by) in fields {
                    let next = increment(doc.get(field), by).ok_or_else(|| {
                        StoreError::InvalidUpdate(format!("$inc on {field} needs numeric operands"))
                    })?;
                    doc.insert(field.clone(), next);
                }
            }
            other => {
                return Err(StoreError::InvalidUpdate(format!("unsupported operator {other}")));
            }
        }
    }
    Ok(())
}

/// `current + by`, integer when both sides are integers. A missing field counts as 0.
fn increment(current: Option<&Value>, by: &Value) -> Option<Value> {
    let zero = json!(0);
    let current = current.filter(|v| !v.is_null()).unwrap_or(&zero);
    if let (Some(a), Some(b)) = (current.as_i64(), by.as_i64()) {
        return a.checked_add(b).map(Value::from);
    }
    Some(json!(current.as_f64()? + by.as_f64()?))
}

fn set_field(doc: &mut Map<String, Value>, field: &str, value: &Value) -> Result<(), StoreError> {
    if field == KEY_FIELD && doc.get(KEY_FIELD).is_some_and(|id| id != value) {
        return Err(StoreError::InvalidUpdate(format!("cannot modify {KEY_FIELD}")));
    }
    doc.insert(field.to_string(), value.clone());
    Ok(())
}

/// Equality conditions of a filter, used as the base of an upserted document.
fn upsert_seed(filter: Option<&Value>) -> Map<String, Value> {
    let mut seed = Map::new();
    let Some(conditions) = filter.and_then(Value::as_object) else {
        return seed;
    };
    for (field, condition) in conditions {
        if field.starts_with('$') {
            continue;
        }
        match as_operator(condition) {
            Some(ops) => {
                if let Some(eq) = ops.get("$eq") {
                    seed.insert(field.clone(), eq.clone());
                }
            }
            None => {
                seed.insert(field.clone(), condition.clone());
            }
        }
    }
    seed
}

fn single_key(stage: &Value) -> Result<(&str, &Value), StoreError> {
    match stage.as_object() {
        Some(obj) if obj.len() == 1 => obj
            .iter()
            .next()
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| StoreError::InvalidPipeline("empty stage".to_string())),
        _ => Err(StoreError::InvalidPipeline(format!(
            "stage must be an object with exactly one key: {stage}"
        ))),
    }
}

fn stage_count(name: &str, arg: &Value) -> Result<usize, StoreError> {
    arg.as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| StoreError::InvalidPipeline(format!("{name} expects a non-negative integer")))
}

fn sort_spec(arg: &Value) -> Result<Vec<SortEntry>, StoreError> {
    let spec = arg
        .as_object()
        .ok_or_else(|| StoreError::InvalidPipeline("$sort expects an object".to_string()))?;
    spec.iter()
        .map(|(field, dir)| {
            let direction = match dir.as_i64() {
                Some(1) => SortDirection::Asc,
                Some(-1) => SortDirection::Desc,
                _ => {
                    return Err(StoreError::InvalidPipeline(format!(
                        "$sort direction for {field} must be 1 or -1"
                    )))
                }
            };
            Ok(SortEntry {
                field: field.clone(),
                direction,
            })
        })
        .collect()
}

fn truthy(flag: &Value) -> Option<bool> {
    match flag {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        _ => None,
    }
}

/// `$project` with inclusion (`{ a: 1 }`) or exclusion (`{ a: 0 }`) specs.
/// `_id` is kept unless excluded explicitly.
fn project(docs: Vec<Value>, arg: &Value) -> Result<Vec<Value>, StoreError> {
    let spec = arg
        .as_object()
        .ok_or_else(|| StoreError::InvalidPipeline("$project expects an object".to_string()))?;

    let mut flags = Map::new();
    for (field, flag) in spec {
        let on = truthy(flag).ok_or_else(|| {
            StoreError::InvalidPipeline(format!("$project value for {field} must be 0/1 or a boolean"))
        })?;
        flags.insert(field.clone(), Value::Bool(on));
    }
    let keep_id = flags.get(KEY_FIELD) != Some(&Value::Bool(false));
    let inclusion = flags
        .iter()
        .any(|(field, on)| field != KEY_FIELD && on == &Value::Bool(true));

    Ok(docs
        .into_iter()
        .map(|doc| {
            let obj = doc.as_object().cloned().unwrap_or_default();
            let projected: Map<String, Value> = obj
                .into_iter()
                .filter(|(field, _)| {
                    if field == KEY_FIELD {
                        return keep_id;
                    }
                    let flag = flags.get(field);
                    if inclusion {
                        flag == Some(&Value::Bool(true))
                    } else {
                        flag != Some(&Value::Bool(false))
                    }
                })
                .collect();
            Value::Object(projected)
        })
        .collect())
}

// ============================================================================
// Tests
// ============================================================================
