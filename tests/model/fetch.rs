//! Reads and updates under each deleted scope.

use serde_json::json;
use soft_delete::query::{SortInput, StoreQuery};
use soft_delete::store::DocumentStore;
use soft_delete::types::UpdateOptions;
use soft_delete::Query;

use super::support::{default_model, id_of, names, seed};

// ============================================================================
// Default scope
// ============================================================================

#[tokio::test]
async fn default_reads_skip_deleted_records() {
    let model = default_model();
    seed(&model).await;

    assert_eq!(model.count_documents(json!({})).await.unwrap(), 1);
    assert_eq!(model.count(json!({})).await.unwrap(), 1);

    let docs = model.find(json!({})).await.unwrap();
    assert_eq!(names(&docs), vec!["Darth Vader"]);
}

#[tokio::test]
async fn find_one_and_find_by_id_skip_deleted_records() {
    let model = default_model();
    let docs = seed(&model).await;

    assert!(model.find_one(json!({ "name": "Darth Vader" })).await.unwrap().is_some());
    assert!(model.find_one(json!({ "name": "Obi-Wan Kenobi" })).await.unwrap().is_none());

    assert!(model.find_by_id(id_of(&docs[1])).await.unwrap().is_some());
    assert!(model.find_by_id(id_of(&docs[0])).await.unwrap().is_none());
}

#[tokio::test]
async fn default_updates_skip_deleted_records() {
    let model = default_model();
    let docs = seed(&model).await;
    let opts = UpdateOptions::default();
    let rename = json!({ "$set": { "name": "Anakin Skywalker" } });

    let found = model
        .find_one_and_update(json!({ "name": "Obi-Wan Kenobi" }), &rename, &opts)
        .await
        .unwrap();
    assert!(found.is_none());

    let found = model
        .find_by_id_and_update(id_of(&docs[2]), &rename, &opts)
        .await
        .unwrap();
    assert!(found.is_none());

    let result = model
        .update_one(json!({ "name": "Obi-Wan Kenobi" }), &rename, &opts)
        .await
        .unwrap();
    assert!(result.acknowledged);
    assert_eq!(result.modified_count, 0);

    let result = model.update_many(json!({}), &json!({ "rank": "lord" }), &opts).await.unwrap();
    assert_eq!(result.modified_count, 1);

    let result = model.update(json!({}), &json!({ "rank": "sith" }), &opts).await.unwrap();
    assert_eq!(result.modified_count, 1);
}

#[tokio::test]
async fn find_one_and_update_returns_live_record() {
    let model = default_model();
    seed(&model).await;

    let before = model
        .find_one_and_update(
            json!({ "name": "Darth Vader" }),
            &json!({ "$set": { "rank": "lord" } }),
            &UpdateOptions::default(),
        )
        .await
        .unwrap()
        .unwrap();
    assert!(before.get("rank").is_none());

    let after = model
        .find_one_and_update(
            json!({ "name": "Darth Vader" }),
            &json!({ "$set": { "rank": "emperor" } }),
            &UpdateOptions::default().return_new(true),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after["rank"], json!("emperor"));
}

#[tokio::test]
async fn upsert_over_deleted_record_creates_live_copy() {
    let model = default_model();
    seed(&model).await;

    let result = model
        .update_one(
            json!({ "name": "Obi-Wan Kenobi" }),
            &json!({ "$set": { "rank": "master" } }),
            &UpdateOptions::default().upsert(true),
        )
        .await
        .unwrap();
    assert_eq!(result.modified_count, 0);
    assert_eq!(result.upserted_count, 1);

    let upserted = model
        .find_one(json!({ "_id": result.upserted_id.unwrap() }))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(upserted["deleted"], json!(false));
    assert_eq!(upserted["name"], json!("Obi-Wan Kenobi"));
    assert_eq!(upserted["rank"], json!("master"));

    let all = model.find(Query::new().include_deleted()).await.unwrap();
    assert_eq!(all.len(), 4);
}

// ============================================================================
// only_deleted
// ============================================================================

#[tokio::test]
async fn only_deleted_reads_deleted_records() {
    let model = default_model();
    let docs = seed(&model).await;

    assert_eq!(model.count_documents(Query::new().only_deleted()).await.unwrap(), 2);

    let found = model.find(Query::new().only_deleted()).await.unwrap();
    assert_eq!(names(&found), vec!["Luke Skywalker", "Obi-Wan Kenobi"]);

    let obi = Query::filter(json!({ "name": "Obi-Wan Kenobi" })).only_deleted();
    assert!(model.find_one(obi).await.unwrap().is_some());
    let vader = Query::filter(json!({ "name": "Darth Vader" })).only_deleted();
    assert!(model.find_one(vader).await.unwrap().is_none());

    assert!(model.find_one(Query::by_id(id_of(&docs[1])).only_deleted()).await.unwrap().is_none());
    assert!(model.find_one(Query::by_id(id_of(&docs[0])).only_deleted()).await.unwrap().is_some());
}

#[tokio::test]
async fn only_deleted_updates_deleted_records() {
    let model = default_model();
    seed(&model).await;
    let opts = UpdateOptions::default();
    let update = json!({ "$set": { "rank": "ghost" } });

    let result = model
        .update_one(Query::filter(json!({ "name": "Darth Vader" })).only_deleted(), &update, &opts)
        .await
        .unwrap();
    assert_eq!(result.modified_count, 0);

    let result = model
        .update_one(Query::filter(json!({ "name": "Obi-Wan Kenobi" })).only_deleted(), &update, &opts)
        .await
        .unwrap();
    assert_eq!(result.modified_count, 1);

    let result = model.update_many(Query::new().only_deleted(), &update, &opts).await.unwrap();
    assert_eq!(result.matched_count, 2);
    assert_eq!(result.modified_count, 1);

    let found = model
        .find_one_and_update(Query::new().only_deleted(), &json!({ "$set": { "x": 1 } }), &opts)
        .await
        .unwrap();
    assert!(found.is_some());
}

// ============================================================================
// include_deleted
// ============================================================================

#[tokio::test]
async fn include_deleted_reads_every_record() {
    let model = default_model();
    let docs = seed(&model).await;

    assert_eq!(model.count_documents(Query::new().include_deleted()).await.unwrap(), 3);
    assert_eq!(model.find(Query::new().include_deleted()).await.unwrap().len(), 3);

    for doc in &docs {
        let found = model
            .find_one(Query::by_id(id_of(doc)).include_deleted())
            .await
            .unwrap();
        assert!(found.is_some());
    }
}

#[tokio::test]
async fn include_deleted_updates_every_record() {
    let model = default_model();
    seed(&model).await;

    let result = model
        .update_many(
            Query::new().include_deleted(),
            &json!({ "$set": { "order": "jedi" } }),
            &UpdateOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(result.modified_count, 3);
}

#[tokio::test]
async fn sort_and_pagination_apply_after_rewrite() {
    let model = default_model();
    seed(&model).await;

    let query = Query::new()
        .include_deleted()
        .sort(SortInput::Field("name".to_string()))
        .offset(1)
        .limit(1);
    let docs = model.find(query).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["name"], json!("Luke Skywalker"));
}

// ============================================================================
// Explicit conditions
// ============================================================================

#[tokio::test]
async fn explicit_condition_on_marker_wins() {
    let model = default_model();
    seed(&model).await;

    let docs = model.find(json!({ "deleted": true })).await.unwrap();
    assert_eq!(docs.len(), 2);

    let docs = model
        .find(Query::filter(json!({ "deleted": { "$in": [true, false] } })).only_deleted())
        .await
        .unwrap();
    assert_eq!(docs.len(), 3);
}

#[tokio::test]
async fn raw_store_count_is_unfiltered() {
    let model = default_model();
    seed(&model).await;

    let raw = model
        .store()
        .count_documents(&StoreQuery::filter(json!({})))
        .await
        .unwrap();
    assert_eq!(raw, 3);
}
