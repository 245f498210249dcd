//! Query type definitions: the caller-facing query descriptor, the plain
//! query handed to the store, and sort/pagination types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::definition::KEY_FIELD;

// ============================================================================
// Sort Types
// ============================================================================

/// Sort direction for a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A sort specification for a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortEntry {
    pub field: String,
    pub direction: SortDirection,
}

/// Sort input: either a shorthand field name (ascending) or explicit entries.
#[derive(Debug, Clone, PartialEq)]
pub enum SortInput {
    /// Single field name, sorts ascending.
    Field(String),
    /// Explicit ordered sort entries.
    Entries(Vec<SortEntry>),
}

/// Normalize sort input to a vec of SortEntry.
pub fn normalize_sort(sort: Option<SortInput>) -> Option<Vec<SortEntry>> {
    match sort {
        None => None,
        Some(SortInput::Field(f)) => Some(vec![SortEntry {
            field: f,
            direction: SortDirection::Asc,
        }]),
        Some(SortInput::Entries(e)) => Some(e),
    }
}

// ============================================================================
// DeletedScope
// ============================================================================

/// Read mode of a query with respect to soft-deleted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletedScope {
    /// Only records whose marker is `false` (the default for filtered methods).
    Exclude,
    /// Every record, deleted or not.
    Include,
    /// Only records whose marker is `true`.
    Only,
}

// ============================================================================
// Query (caller-facing)
// ============================================================================

/// A MongoDB-style filter plus sort, pagination and the deleted scope.
///
/// The scope is an option, not part of the filter. It is consumed when the
/// query is rewritten into a [`StoreQuery`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Map<String, Value>,
    pub sort: Option<SortInput>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub scope: Option<DeletedScope>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a filter object. Non-object values yield an empty filter.
    pub fn filter(filter: Value) -> Self {
        Self {
            filter: into_object(filter),
            ..Self::default()
        }
    }

    /// Match a single record by `_id`.
    pub fn by_id(id: impl Into<Value>) -> Self {
        Self::new().eq(KEY_FIELD, id)
    }

    /// Shallow-merge more conditions into the filter; later keys overwrite.
    pub fn and(mut self, conditions: Value) -> Self {
        self.filter.extend(into_object(conditions));
        self
    }

    /// Add an equality condition.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.insert(field.into(), value.into());
        self
    }

    pub fn sort(mut self, sort: SortInput) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Return deleted and non-deleted records alike.
    pub fn include_deleted(self) -> Self {
        self.with_scope(DeletedScope::Include)
    }

    /// Return only non-deleted records, even on methods without the default filter.
    pub fn exclude_deleted(self) -> Self {
        self.with_scope(DeletedScope::Exclude)
    }

    /// Return only deleted records.
    pub fn only_deleted(self) -> Self {
        self.with_scope(DeletedScope::Only)
    }

    /// Set the scope explicitly. The last scope set wins.
    pub fn with_scope(mut self, scope: DeletedScope) -> Self {
        self.scope = Some(scope);
        self
    }
}

impl From<Value> for Query {
    fn from(filter: Value) -> Self {
        Query::filter(filter)
    }
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// ============================================================================
// StoreQuery (what the store receives)
// ============================================================================

/// A plain query: MongoDB-style filter, sort and pagination. Carries no
/// soft-delete options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreQuery {
    /// MongoDB-style filter object.
    pub filter: Option<Value>,
    pub sort: Option<SortInput>,
    /// Maximum number of results to return.
    pub limit: Option<usize>,
    /// Number of results to skip.
    pub offset: Option<usize>,
}

impl StoreQuery {
    pub fn filter(filter: Value) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }
}

/// Plain conversion: the filter passes through as-is and the scope is dropped.
impl From<Query> for StoreQuery {
    fn from(query: Query) -> Self {
        Self {
            filter: Some(Value::Object(query.filter)),
            sort: query.sort,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

// ============================================================================
// Query Result
// ============================================================================

/// Result of executing a query (internal to the in-memory engine).
#[derive(Debug, Clone)]
pub struct ExecuteQueryResult {
    /// Matching records (after filter, sort, and pagination).
    pub records: Vec<Value>,
    /// Total count of matched records before pagination.
    pub total: usize,
}

// ============================================================================
// Tests
// ============================================================================
