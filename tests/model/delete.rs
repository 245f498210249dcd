//! Instance and static deletes and restores.

use serde_json::json;
use soft_delete::error::StoreError;
use soft_delete::schema::{t, Schema};
use soft_delete::types::{SaveOptions, UpdateOptions};
use soft_delete::{Query, SoftDeleteError, SoftDeleteOptions};

use super::support::{default_model, id_of, jedi_schema, model_with, TestModel};

async fn puffies(model: &TestModel) {
    model.create(json!({ "name": "Puffy1" })).await.unwrap();
    model.create(json!({ "name": "Puffy2" })).await.unwrap();
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn new_records_start_live() {
    let model = default_model();
    let created = model.create(json!({ "name": "Puffy" })).await.unwrap();
    assert_eq!(created.get("deleted"), Some(&json!(false)));
    assert!(!created.is_deleted());

    let saved = model
        .save(json!({ "name": "Fluffy", "deleted": null }), &SaveOptions::default())
        .await
        .unwrap();
    assert_eq!(saved["deleted"], json!(false));
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn instance_delete_marks_record() {
    let model = default_model();
    let mut puffy = model.create(json!({ "name": "Puffy" })).await.unwrap();

    let saved = puffy.delete(&SaveOptions::default()).await.unwrap();
    assert_eq!(saved["deleted"], json!(true));
    assert!(saved.get("deletedAt").is_none());
    assert!(puffy.is_deleted());

    assert!(model.find_by_id(id_of(&saved)).await.unwrap().is_none());
    assert_eq!(model.store().len(), 1);
}

#[tokio::test]
async fn delete_one_marks_first_match() {
    let model = default_model();
    puffies(&model).await;

    let result = model.delete_one(json!({ "name": "Puffy1" }), &UpdateOptions::default()).await.unwrap();
    assert!(result.acknowledged);
    assert_eq!(result.deleted_count, 1);
}

#[tokio::test]
async fn delete_many_marks_every_match_once() {
    let model = default_model();
    puffies(&model).await;

    let result = model.delete_many(json!({}), &UpdateOptions::default()).await.unwrap();
    assert_eq!(result.deleted_count, 2);

    let again = model.delete_many(json!({}), &UpdateOptions::default()).await.unwrap();
    assert_eq!(again.deleted_count, 0);
    assert_eq!(model.count_documents(Query::new().only_deleted()).await.unwrap(), 2);
}

#[tokio::test]
async fn find_by_id_and_delete_returns_marked_record() {
    let model = default_model();
    let puffy = model.create(json!({ "name": "Puffy1" })).await.unwrap().into_inner();

    let result = model
        .find_by_id_and_delete(id_of(&puffy), &UpdateOptions::default().return_new(true))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result["deleted"], json!(true));
}

#[tokio::test]
async fn find_one_and_delete_returns_record_before_delete() {
    let model = default_model();
    puffies(&model).await;

    let before = model
        .find_one_and_delete(json!({ "name": "Puffy1" }), &UpdateOptions::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(before["deleted"], json!(false));

    let stored = model
        .find_one(Query::by_id(id_of(&before)).only_deleted())
        .await
        .unwrap();
    assert!(stored.is_some());
}

// ============================================================================
// Restore
// ============================================================================

#[tokio::test]
async fn instance_restore_clears_marker() {
    let model = default_model();
    let mut puffy = model.create(json!({ "name": "Puffy" })).await.unwrap();
    puffy.delete(&SaveOptions::default()).await.unwrap();

    let restored = puffy.restore(&SaveOptions::default()).await.unwrap();
    assert_eq!(restored["deleted"], json!(false));
    assert!(model.find_by_id(id_of(&restored)).await.unwrap().is_some());
}

#[tokio::test]
async fn restore_one_and_many_only_touch_deleted_records() {
    let model = default_model();
    puffies(&model).await;
    model.delete_many(json!({}), &UpdateOptions::default()).await.unwrap();

    let result = model.restore_one(json!({ "name": "Puffy1" }), &UpdateOptions::default()).await.unwrap();
    assert!(result.acknowledged);
    assert_eq!(result.modified_count, 1);
    let puffy = model.find_one(json!({ "name": "Puffy1" })).await.unwrap().unwrap();
    assert_eq!(puffy["deleted"], json!(false));

    // Puffy1 is live again
    let result = model.restore_one(json!({ "name": "Puffy1" }), &UpdateOptions::default()).await.unwrap();
    assert_eq!(result.matched_count, 0);

    model.delete_many(json!({}), &UpdateOptions::default()).await.unwrap();
    let result = model.restore_many(json!({}), &UpdateOptions::default()).await.unwrap();
    assert_eq!(result.modified_count, 2);
    assert_eq!(model.count_documents(json!({})).await.unwrap(), 2);
}

#[tokio::test]
async fn delete_then_restore_returns_original_record() {
    let model = model_with(jedi_schema().with_timestamps(), SoftDeleteOptions::new().deleted_at(true));
    let mut puffy = model.create(json!({ "name": "Puffy" })).await.unwrap();
    let original = puffy.data().clone();

    puffy.delete(&SaveOptions::default()).await.unwrap();
    puffy.restore(&SaveOptions::default()).await.unwrap();
    assert_eq!(puffy.data(), &original);
}

// ============================================================================
// Timestamps
// ============================================================================

#[tokio::test]
async fn delete_and_restore_leave_updated_at_alone() {
    let model = model_with(jedi_schema().with_timestamps(), SoftDeleteOptions::default());
    let mut puffy = model.create(json!({ "name": "Puffy" })).await.unwrap();
    let updated_at = puffy.get("updatedAt").cloned().unwrap();
    let id = puffy.id().cloned().unwrap();

    let saved = puffy.delete(&SaveOptions::default()).await.unwrap();
    assert_eq!(saved["deleted"], json!(true));
    assert_eq!(saved["updatedAt"], updated_at);

    let saved = puffy.restore(&SaveOptions::default()).await.unwrap();
    assert_eq!(saved["deleted"], json!(false));
    assert_eq!(saved["updatedAt"], updated_at);

    model.delete_one(json!({ "_id": id.clone() }), &UpdateOptions::default()).await.unwrap();
    let stored = model.find_one(Query::by_id(id.clone()).only_deleted()).await.unwrap().unwrap();
    assert_eq!(stored["updatedAt"], updated_at);

    model.restore_one(json!({ "_id": id.clone() }), &UpdateOptions::default()).await.unwrap();
    let stored = model.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored["deleted"], json!(false));
    assert_eq!(stored["updatedAt"], updated_at);
}

#[tokio::test]
async fn touch_timestamps_lets_deletes_bump_updated_at() {
    let model = model_with(
        jedi_schema().with_timestamps(),
        SoftDeleteOptions::new().touch_timestamps(true),
    );
    let puffy = model.create(json!({ "name": "Puffy" })).await.unwrap();
    let mut doc = puffy.into_inner();
    doc["updatedAt"] = json!("2000-01-01T00:00:00+00:00");
    model
        .save(doc.clone(), &SaveOptions::default().timestamps(false))
        .await
        .unwrap();

    model.delete_one(json!({ "_id": id_of(&doc) }), &UpdateOptions::default()).await.unwrap();
    let stored = model
        .find_one(Query::by_id(id_of(&doc)).only_deleted())
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored["updatedAt"], json!("2000-01-01T00:00:00+00:00"));
}

#[tokio::test]
async fn caller_timestamps_option_reaches_static_deletes() {
    let model = model_with(
        jedi_schema().with_timestamps(),
        SoftDeleteOptions::new().touch_timestamps(true),
    );
    puffies(&model).await;
    let before = model.find(json!({})).await.unwrap();

    let result = model
        .delete_many(json!({}), &UpdateOptions::default().timestamps(false))
        .await
        .unwrap();
    assert_eq!(result.deleted_count, 2);

    let after = model.find(Query::new().only_deleted()).await.unwrap();
    for doc in &after {
        let original = before.iter().find(|b| b["_id"] == doc["_id"]).unwrap();
        assert_eq!(doc["updatedAt"], original["updatedAt"]);
    }

    model
        .restore_many(json!({}), &UpdateOptions::default().timestamps(false))
        .await
        .unwrap();
    let restored = model.find(json!({})).await.unwrap();
    assert_eq!(restored.len(), 2);
    for doc in &restored {
        let original = before.iter().find(|b| b["_id"] == doc["_id"]).unwrap();
        assert_eq!(doc["updatedAt"], original["updatedAt"]);
    }
}

#[tokio::test]
async fn delete_many_with_upsert_inserts_deleted_record() {
    let model = default_model();
    puffies(&model).await;

    model
        .delete_many(json!({ "name": "Ghost" }), &UpdateOptions::default().upsert(true))
        .await
        .unwrap();

    let ghost = model
        .find_one(Query::filter(json!({ "name": "Ghost" })).only_deleted())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ghost["deleted"], json!(true));
    assert_eq!(model.count(json!({})).await.unwrap(), 2);
}

// ============================================================================
// validateBeforeDelete
// ============================================================================

fn strict_schema() -> Schema {
    Schema::new("strict").required("name", t::string())
}

#[tokio::test]
async fn validate_before_delete_true_rejects_invalid_record() {
    let model = model_with(strict_schema(), SoftDeleteOptions::new().validate_before_delete(true));
    let mut puffy = model.create(json!({ "name": "Puffy1" })).await.unwrap();
    puffy.set("name", "");

    let err = puffy.delete(&SaveOptions::default()).await.unwrap_err();
    assert!(matches!(
        err,
        SoftDeleteError::Store(StoreError::Validation(_))
    ));
    assert!(!puffy.is_deleted());
    assert_eq!(model.count_documents(json!({})).await.unwrap(), 1);
}

#[tokio::test]
async fn validate_before_delete_false_skips_validation() {
    let model = model_with(strict_schema(), SoftDeleteOptions::new().validate_before_delete(false));
    let mut puffy = model.create(json!({ "name": "Puffy1" })).await.unwrap();
    puffy.set("name", "");

    let saved = puffy.delete(&SaveOptions::default().validate(true)).await.unwrap();
    assert_eq!(saved["deleted"], json!(true));
}

#[tokio::test]
async fn caller_save_options_apply_without_validate_before_delete() {
    let model = model_with(strict_schema(), SoftDeleteOptions::default());
    let mut puffy = model.create(json!({ "name": "Puffy1" })).await.unwrap();
    puffy.set("name", "");

    assert!(puffy.delete(&SaveOptions::default()).await.is_err());
    let saved = puffy.delete(&SaveOptions::default().validate(false)).await.unwrap();
    assert_eq!(saved["deleted"], json!(true));
}
