//! Model: a collection bound to a [`DocumentStore`] with the soft-delete
//! hooks applied to every read, write and pipeline.
//!
//! Reads and updates are rewritten through [`Middleware::on_query`] with the
//! [`Method`] they run as, so `overrideMethods` decides per method whether
//! deleted records are filtered out by default. Soft-delete and restore
//! statics live in [`statics`], document operations in [`instance`].

pub mod instance;
pub mod statics;

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{Result, StoreError};
use crate::middleware::Middleware;
use crate::options::Method;
use crate::plugin::SoftDelete;
use crate::query::pipeline::Aggregate;
use crate::query::types::{Query, StoreQuery};
use crate::store::DocumentStore;
use crate::types::{SaveOptions, UpdateOptions, UpdateResult};

pub use instance::Instance;

// ============================================================================
// Model
// ============================================================================

pub struct Model<S: DocumentStore> {
    store: Arc<S>,
    plugin: Arc<SoftDelete>,
}

impl<S: DocumentStore> Model<S> {
    pub fn new(store: S, plugin: Arc<SoftDelete>) -> Self {
        Self {
            store: Arc::new(store),
            plugin,
        }
    }

    /// Create from a shared store.
    pub fn from_arc(store: Arc<S>, plugin: Arc<SoftDelete>) -> Self {
        Self { store, plugin }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn plugin(&self) -> &SoftDelete {
        &self.plugin
    }

    /// Wrap an existing document without writing it.
    pub fn instance(&self, doc: Value) -> Result<Instance<'_, S>> {
        Ok(Instance::new(self, into_object(doc)?))
    }

    fn rewrite(&self, method: Method, query: impl Into<Query>) -> StoreQuery {
        self.plugin.on_query(method, query.into())
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a new document. The deleted marker defaults to `false`.
    pub async fn create(&self, doc: Value) -> Result<Instance<'_, S>> {
        let mut doc = into_object(doc)?;
        self.plugin.on_save(&mut doc);
        let stored = self.store.insert(Value::Object(doc)).await?;
        self.instance(stored)
    }

    pub async fn insert_many(&self, docs: Vec<Value>) -> Result<Vec<Instance<'_, S>>> {
        let mut prepared = Vec::with_capacity(docs.len());
        for doc in docs {
            let mut doc = into_object(doc)?;
            self.plugin.on_save(&mut doc);
            prepared.push(Value::Object(doc));
        }
        self.store
            .insert_many(prepared)
            .await?
            .into_iter()
            .map(|doc| self.instance(doc))
            .collect()
    }

    /// Write a whole document, inserting it when its `_id` is not stored yet.
    pub async fn save(&self, doc: Value, opts: &SaveOptions) -> Result<Value> {
        let mut doc = into_object(doc)?;
        self.plugin.on_save(&mut doc);
        Ok(self.store.save(Value::Object(doc), opts).await?)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn find(&self, query: impl Into<Query>) -> Result<Vec<Value>> {
        let query = self.rewrite(Method::Find, query);
        Ok(self.store.find(&query).await?)
    }

    pub async fn find_one(&self, query: impl Into<Query>) -> Result<Option<Value>> {
        let query = self.rewrite(Method::FindOne, query);
        Ok(self.store.find_one(&query).await?)
    }

    /// `find_one` on `_id`.
    pub async fn find_by_id(&self, id: impl Into<Value>) -> Result<Option<Value>> {
        self.find_one(Query::by_id(id)).await
    }

    /// Count as the legacy `count` method.
    pub async fn count(&self, query: impl Into<Query>) -> Result<u64> {
        let query = self.rewrite(Method::Count, query);
        Ok(self.store.count_documents(&query).await?)
    }

    pub async fn count_documents(&self, query: impl Into<Query>) -> Result<u64> {
        let query = self.rewrite(Method::CountDocuments, query);
        Ok(self.store.count_documents(&query).await?)
    }

    // -----------------------------------------------------------------------
    // Updates
    // -----------------------------------------------------------------------

    /// Legacy `update`: updates the first match.
    pub async fn update(&self, query: impl Into<Query>, update: &Value, opts: &UpdateOptions) -> Result<UpdateResult> {
        let query = self.rewrite(Method::Update, query);
        Ok(self.store.update_one(&query, update, opts).await?)
    }

    pub async fn update_one(
        &self,
        query: impl Into<Query>,
        update: &Value,
        opts: &UpdateOptions,
    ) -> Result<UpdateResult> {
        let query = self.rewrite(Method::UpdateOne, query);
        Ok(self.store.update_one(&query, update, opts).await?)
    }

    pub async fn update_many(
        &self,
        query: impl Into<Query>,
        update: &Value,
        opts: &UpdateOptions,
    ) -> Result<UpdateResult> {
        let query = self.rewrite(Method::UpdateMany, query);
        Ok(self.store.update_many(&query, update, opts).await?)
    }

    /// Update the first match and return it, before the update unless
    /// `opts.return_new` is set.
    pub async fn find_one_and_update(
        &self,
        query: impl Into<Query>,
        update: &Value,
        opts: &UpdateOptions,
    ) -> Result<Option<Value>> {
        let query = self.rewrite(Method::FindOneAndUpdate, query);
        Ok(self.store.find_one_and_update(&query, update, opts).await?)
    }

    pub async fn find_by_id_and_update(
        &self,
        id: impl Into<Value>,
        update: &Value,
        opts: &UpdateOptions,
    ) -> Result<Option<Value>> {
        self.find_one_and_update(Query::by_id(id), update, opts)
            .await
    }

    // -----------------------------------------------------------------------
    // Aggregation
    // -----------------------------------------------------------------------

    pub async fn aggregate(&self, pipeline: impl Into<Aggregate>) -> Result<Vec<Value>> {
        let (mut stages, scope) = pipeline.into().into_parts();
        self.plugin.on_aggregate(&mut stages, scope);
        Ok(self.store.aggregate(&stages).await?)
    }
}

fn into_object(doc: Value) -> Result<Map<String, Value>> {
    match doc {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::NotAnObject(other.to_string()).into()),
    }
}
