//! Middleware trait: hooks a model runs before documents are written,
//! before queries reach the store, and before pipelines are executed.

use serde_json::{Map, Value};

use crate::options::Method;
use crate::query::types::{DeletedScope, Query, StoreQuery};

/// Hooks applied by [`Model`](crate::model::Model).
///
/// All methods have default implementations. A middleware with zero
/// overrides is a valid passthrough.
pub trait Middleware: Send + Sync {
    /// Prepare a document before `create`, `insert_many` or `save` writes it.
    ///
    /// Default: leaves the document unchanged.
    fn on_save(&self, _doc: &mut Map<String, Value>) {}

    /// Turn a caller query for `method` into the query the store executes.
    /// Query options that only the middleware understands must be consumed
    /// here.
    ///
    /// Default: passes the filter through and drops the deleted scope.
    fn on_query(&self, _method: Method, query: Query) -> StoreQuery {
        StoreQuery::from(query)
    }

    /// Adjust an aggregation pipeline before it runs.
    ///
    /// Default: leaves the stages unchanged.
    fn on_aggregate(&self, _stages: &mut Vec<Value>, _scope: Option<DeletedScope>) {}
}

/// Middleware with no overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Middleware for Passthrough {}
