/// Store trait for the document-mapping layer.
///
/// Every method is a single call into the underlying engine. Queries arrive
/// already rewritten; the store sees plain MongoDB-style filters and knows
/// nothing about soft deletes. Errors are returned as the engine produced them.
use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::query::types::StoreQuery;
use crate::types::{SaveOptions, UpdateOptions, UpdateResult};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document, validating it. Returns the stored document
    /// (with `_id` and any defaults filled in).
    async fn insert(&self, doc: Value) -> Result<Value, StoreError>;

    /// Insert several documents in order. Stops at the first failure.
    async fn insert_many(&self, docs: Vec<Value>) -> Result<Vec<Value>, StoreError> {
        let mut stored = Vec::with_capacity(docs.len());
        for doc in docs {
            stored.push(self.insert(doc).await?);
        }
        Ok(stored)
    }

    /// Write a whole document: replace the record with the same `_id`, or
    /// insert it when none exists.
    async fn save(&self, doc: Value, opts: &SaveOptions) -> Result<Value, StoreError>;

    async fn find(&self, query: &StoreQuery) -> Result<Vec<Value>, StoreError>;

    async fn find_one(&self, query: &StoreQuery) -> Result<Option<Value>, StoreError>;

    async fn count_documents(&self, query: &StoreQuery) -> Result<u64, StoreError>;

    /// Apply `update` (`$set` / `$unset` operators, or a plain field map) to
    /// the first matching document.
    async fn update_one(
        &self,
        query: &StoreQuery,
        update: &Value,
        opts: &UpdateOptions,
    ) -> Result<UpdateResult, StoreError>;

    /// Apply `update` to every matching document.
    async fn update_many(
        &self,
        query: &StoreQuery,
        update: &Value,
        opts: &UpdateOptions,
    ) -> Result<UpdateResult, StoreError>;

    /// Update the first matching document and return it (before the update
    /// unless `opts.return_new`).
    async fn find_one_and_update(
        &self,
        query: &StoreQuery,
        update: &Value,
        opts: &UpdateOptions,
    ) -> Result<Option<Value>, StoreError>;

    /// Run an aggregation pipeline over the collection.
    async fn aggregate(&self, pipeline: &[Value]) -> Result<Vec<Value>, StoreError>;
}
