//! Instance: one document bound to its [`Model`].
//!
//! `delete`, `delete_by` and `restore` change the marker fields and save the
//! whole document. The in-memory copy is replaced only when the save
//! succeeds.

use serde_json::{Map, Value};

use crate::error::Result;
use crate::schema::definition::KEY_FIELD;
use crate::store::DocumentStore;
use crate::types::SaveOptions;

use super::Model;

pub struct Instance<'m, S: DocumentStore> {
    model: &'m Model<S>,
    doc: Map<String, Value>,
}

impl<'m, S: DocumentStore> Instance<'m, S> {
    pub(super) fn new(model: &'m Model<S>, doc: Map<String, Value>) -> Self {
        Self { model, doc }
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.doc
    }

    pub fn into_inner(self) -> Value {
        Value::Object(self.doc)
    }

    pub fn id(&self) -> Option<&Value> {
        self.doc.get(KEY_FIELD)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.doc.get(field)
    }

    /// Set a field locally. Nothing is written until [`Instance::save`].
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.doc.insert(field.into(), value.into());
        self
    }

    pub fn is_deleted(&self) -> bool {
        self.doc.get(self.model.plugin.fields().deleted()) == Some(&Value::Bool(true))
    }

    /// Write the document as it is.
    pub async fn save(&mut self, opts: &SaveOptions) -> Result<Value> {
        self.commit(self.doc.clone(), opts).await
    }

    /// Mark deleted and save.
    pub async fn delete(&mut self, opts: &SaveOptions) -> Result<Value> {
        self.mark_and_save(None, opts).await
    }

    /// Mark deleted by `actor` and save.
    pub async fn delete_by(&mut self, actor: impl Into<Value>, opts: &SaveOptions) -> Result<Value> {
        let actor = actor.into();
        self.mark_and_save(Some(&actor), opts).await
    }

    /// Clear the deleted state and save.
    pub async fn restore(&mut self, opts: &SaveOptions) -> Result<Value> {
        let plugin = &self.model.plugin;
        let mut doc = self.doc.clone();
        plugin.mark_restored(&mut doc);
        let opts = plugin.lifecycle_save_options(opts.clone());
        self.commit(doc, &opts).await
    }

    async fn mark_and_save(&mut self, actor: Option<&Value>, opts: &SaveOptions) -> Result<Value> {
        let plugin = &self.model.plugin;
        let mut doc = self.doc.clone();
        plugin.mark_deleted(&mut doc, actor);
        let opts = plugin.lifecycle_save_options(opts.clone());
        self.commit(doc, &opts).await
    }

    async fn commit(&mut self, doc: Map<String, Value>, opts: &SaveOptions) -> Result<Value> {
        let stored = self.model.save(Value::Object(doc), opts).await?;
        if let Value::Object(map) = &stored {
            self.doc = map.clone();
        }
        Ok(stored)
    }
}

impl<S: DocumentStore> std::fmt::Debug for Instance<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance").field("doc", &self.doc).finish()
    }
}
