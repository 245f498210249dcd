//! Soft-delete and restore statics.
//!
//! Deletes are `$set` updates issued through the rewritten update paths, so
//! by default they only reach records that are not deleted yet. Restores run
//! with [`DeletedScope::Only`] unless the query sets its own scope or names
//! the deleted field.

use serde_json::Value;

use crate::error::Result;
use crate::query::types::{DeletedScope, Query};
use crate::store::DocumentStore;
use crate::types::{DeleteResult, UpdateOptions, UpdateResult};

use super::Model;

impl<S: DocumentStore> Model<S> {
    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    /// Mark the first matching record deleted.
    pub async fn delete_one(&self, query: impl Into<Query>, opts: &UpdateOptions) -> Result<DeleteResult> {
        self.delete_matching(query, None, false, opts).await
    }

    /// Mark every matching record deleted.
    pub async fn delete_many(&self, query: impl Into<Query>, opts: &UpdateOptions) -> Result<DeleteResult> {
        self.delete_matching(query, None, true, opts).await
    }

    /// `delete_one`, recording `actor` in the deleted-by field.
    pub async fn delete_one_by(
        &self,
        actor: impl Into<Value>,
        query: impl Into<Query>,
        opts: &UpdateOptions,
    ) -> Result<DeleteResult> {
        let actor = actor.into();
        self.delete_matching(query, Some(&actor), false, opts).await
    }

    /// `delete_many`, recording `actor` in the deleted-by field.
    pub async fn delete_many_by(
        &self,
        actor: impl Into<Value>,
        query: impl Into<Query>,
        opts: &UpdateOptions,
    ) -> Result<DeleteResult> {
        let actor = actor.into();
        self.delete_matching(query, Some(&actor), true, opts).await
    }

    async fn delete_matching(
        &self,
        query: impl Into<Query>,
        actor: Option<&Value>,
        many: bool,
        opts: &UpdateOptions,
    ) -> Result<DeleteResult> {
        let update = self.plugin.delete_update(actor);
        let opts = self.plugin.lifecycle_update_options(opts.clone());
        let result = if many {
            self.update_many(query, &update, &opts).await?
        } else {
            self.update_one(query, &update, &opts).await?
        };
        Ok(DeleteResult::from(result))
    }

    /// Mark the first matching record deleted and return it. `opts.return_new`
    /// selects the marked document over the one before the delete.
    pub async fn find_one_and_delete(&self, query: impl Into<Query>, opts: &UpdateOptions) -> Result<Option<Value>> {
        let update = self.plugin.delete_update(None);
        let opts = self.plugin.lifecycle_update_options(opts.clone());
        self.find_one_and_update(query, &update, &opts).await
    }

    pub async fn find_by_id_and_delete(&self, id: impl Into<Value>, opts: &UpdateOptions) -> Result<Option<Value>> {
        self.find_one_and_delete(Query::by_id(id), opts).await
    }

    // -----------------------------------------------------------------------
    // Restore
    // -----------------------------------------------------------------------

    /// Restore the first matching deleted record.
    pub async fn restore_one(&self, query: impl Into<Query>, opts: &UpdateOptions) -> Result<UpdateResult> {
        let update = self.plugin.restore_update();
        let opts = self.plugin.lifecycle_update_options(opts.clone());
        self.update_one(deleted_scope(query.into()), &update, &opts).await
    }

    /// Restore every matching deleted record.
    pub async fn restore_many(&self, query: impl Into<Query>, opts: &UpdateOptions) -> Result<UpdateResult> {
        let update = self.plugin.restore_update();
        let opts = self.plugin.lifecycle_update_options(opts.clone());
        self.update_many(deleted_scope(query.into()), &update, &opts).await
    }
}

fn deleted_scope(mut query: Query) -> Query {
    query.scope.get_or_insert(DeletedScope::Only);
    query
}
