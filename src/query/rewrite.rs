//! Predicate rewriting: injects the deleted-marker condition into filters.
//!
//! A filter that already names the marker field is never touched: the caller's
//! condition takes precedence over any scope. Otherwise the effective scope
//! decides what is injected:
//!
//! | scope     | injected                 |
//! |-----------|--------------------------|
//! | `Exclude` | `{ <deleted>: false }`   |
//! | `Only`    | `{ <deleted>: true }`    |
//! | `Include` | nothing                  |

use serde_json::{Map, Value};

use super::types::{DeletedScope, Query, StoreQuery};

/// The scope a query runs with: the explicit one, else `Exclude` when the
/// calling method has the default filter enabled, else none.
pub fn effective_scope(explicit: Option<DeletedScope>, default_filter: bool) -> Option<DeletedScope> {
    explicit.or(default_filter.then_some(DeletedScope::Exclude))
}

/// Marker value a scope selects, `None` when the scope selects everything.
pub fn marker_condition(scope: DeletedScope) -> Option<Value> {
    match scope {
        DeletedScope::Exclude => Some(Value::Bool(false)),
        DeletedScope::Only => Some(Value::Bool(true)),
        DeletedScope::Include => None,
    }
}

/// Inject the marker condition for `scope` into `filter` unless the filter
/// already has a top-level `field` key. Returns the injected value.
pub fn rewrite_predicate(
    filter: &mut Map<String, Value>,
    field: &str,
    scope: Option<DeletedScope>,
) -> Option<Value> {
    if filter.contains_key(field) {
        return None;
    }
    let condition = marker_condition(scope?)?;
    filter.insert(field.to_string(), condition.clone());
    Some(condition)
}

/// Rewrite a caller query into the plain query the store executes.
///
/// The scope is consumed here and does not appear in the result.
pub fn rewrite_query(query: Query, field: &str, default_filter: bool) -> StoreQuery {
    let Query {
        mut filter,
        sort,
        limit,
        offset,
        scope,
    } = query;

    let scope = effective_scope(scope, default_filter);
    if let Some(value) = rewrite_predicate(&mut filter, field, scope) {
        tracing::trace!(field, %value, ?scope, "injected deleted condition into filter");
    }

    StoreQuery {
        filter: Some(Value::Object(filter)),
        sort,
        limit,
        offset,
    }
}
