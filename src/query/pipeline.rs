//! Aggregation pipelines and their deleted-marker rewriting.
//!
//! A pipeline already references the marker when any `$match` stage names the
//! field at its top level, or inside an element of a top-level `$or` / `$and`
//! array. Such pipelines are left alone. Otherwise a `$match` stage for the
//! effective scope is unshifted in front of the first stage.

use serde_json::{json, Map, Value};

use super::rewrite::{effective_scope, marker_condition};
use super::types::DeletedScope;

const MATCH: &str = "$match";
const COMBINATORS: &[&str] = &["$or", "$and"];

// ============================================================================
// Aggregate builder
// ============================================================================

/// An ordered list of pipeline stages plus the deleted scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    stages: Vec<Value>,
    scope: Option<DeletedScope>,
}

impl Aggregate {
    pub fn new(stages: Vec<Value>) -> Self {
        Self {
            stages,
            scope: None,
        }
    }

    /// Append an arbitrary stage.
    pub fn stage(mut self, stage: Value) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn matching(self, filter: Value) -> Self {
        self.stage(json!({ MATCH: filter }))
    }

    pub fn project(self, spec: Value) -> Self {
        self.stage(json!({ "$project": spec }))
    }

    pub fn sort(self, spec: Value) -> Self {
        self.stage(json!({ "$sort": spec }))
    }

    pub fn skip(self, n: usize) -> Self {
        self.stage(json!({ "$skip": n }))
    }

    pub fn limit(self, n: usize) -> Self {
        self.stage(json!({ "$limit": n }))
    }

    pub fn include_deleted(mut self) -> Self {
        self.scope = Some(DeletedScope::Include);
        self
    }

    pub fn exclude_deleted(mut self) -> Self {
        self.scope = Some(DeletedScope::Exclude);
        self
    }

    pub fn only_deleted(mut self) -> Self {
        self.scope = Some(DeletedScope::Only);
        self
    }

    pub fn stages(&self) -> &[Value] {
        &self.stages
    }

    pub fn scope(&self) -> Option<DeletedScope> {
        self.scope
    }

    pub fn into_parts(self) -> (Vec<Value>, Option<DeletedScope>) {
        (self.stages, self.scope)
    }
}

impl From<Vec<Value>> for Aggregate {
    fn from(stages: Vec<Value>) -> Self {
        Aggregate::new(stages)
    }
}

// ============================================================================
// Detection
// ============================================================================

/// The filter of a `$match` stage, if `stage` is one.
pub fn match_filter(stage: &Value) -> Option<&Map<String, Value>> {
    stage.as_object()?.get(MATCH)?.as_object()
}

fn filter_references(filter: &Map<String, Value>, field: &str) -> bool {
    if filter.contains_key(field) {
        return true;
    }
    COMBINATORS.iter().any(|op| {
        filter
            .get(*op)
            .and_then(Value::as_array)
            .is_some_and(|branches| {
                branches
                    .iter()
                    .filter_map(Value::as_object)
                    .any(|branch| branch.contains_key(field))
            })
    })
}

/// Whether any match stage of the pipeline already conditions on `field`.
pub fn pipeline_references_field(stages: &[Value], field: &str) -> bool {
    stages
        .iter()
        .filter_map(match_filter)
        .any(|filter| filter_references(filter, field))
}

// ============================================================================
// Rewrite
// ============================================================================

/// Unshift a `$match` on `field` for the effective scope unless the pipeline
/// already references the field. Returns the injected marker value.
pub fn rewrite_pipeline(
    stages: &mut Vec<Value>,
    field: &str,
    scope: Option<DeletedScope>,
    default_filter: bool,
) -> Option<Value> {
    if pipeline_references_field(stages, field) {
        return None;
    }
    let scope = effective_scope(scope, default_filter)?;
    let condition = marker_condition(scope)?;

    let mut filter = Map::new();
    filter.insert(field.to_string(), condition.clone());
    stages.insert(0, json!({ MATCH: Value::Object(filter) }));

    tracing::trace!(field, value = %condition, ?scope, "unshifted deleted $match stage");
    Some(condition)
}
