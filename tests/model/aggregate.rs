//! Aggregation pipelines.

use serde_json::json;
use soft_delete::query::Aggregate;

use super::support::{default_model, seed};

fn project_name() -> serde_json::Value {
    json!({ "$project": { "name": 1 } })
}

#[tokio::test]
async fn pipeline_skips_deleted_records() {
    let model = default_model();
    seed(&model).await;

    let docs = model.aggregate(vec![project_name()]).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["name"], json!("Darth Vader"));
    assert!(docs[0].get("deleted").is_none());
    assert!(docs[0].get("_id").is_some());
}

#[tokio::test]
async fn builder_pipeline_skips_deleted_records() {
    let model = default_model();
    seed(&model).await;

    let vader = Aggregate::default()
        .matching(json!({ "name": "Darth Vader" }))
        .project(json!({ "name": 1 }));
    assert_eq!(model.aggregate(vader).await.unwrap().len(), 1);

    let luke = Aggregate::default()
        .matching(json!({ "name": "Luke Skywalker" }))
        .project(json!({ "name": 1 }));
    assert!(model.aggregate(luke).await.unwrap().is_empty());
}

#[tokio::test]
async fn explicit_match_on_marker_is_not_filtered_again() {
    let model = default_model();
    seed(&model).await;

    let docs = model
        .aggregate(vec![json!({ "$match": { "deleted": true } }), project_name()])
        .await
        .unwrap();
    assert_eq!(docs.len(), 2);

    let docs = model
        .aggregate(vec![
            json!({ "$match": { "name": "Obi-Wan Kenobi" } }),
            json!({ "$match": { "deleted": { "$in": [true, false] } } }),
            project_name(),
        ])
        .await
        .unwrap();
    assert_eq!(docs.len(), 1);
}

#[tokio::test]
async fn marker_inside_or_counts_as_explicit() {
    let model = default_model();
    seed(&model).await;

    let docs = model
        .aggregate(vec![
            json!({ "$match": { "$or": [{ "deleted": true }, { "name": "Darth Vader" }] } }),
            project_name(),
        ])
        .await
        .unwrap();
    assert_eq!(docs.len(), 3);
}

#[tokio::test]
async fn pipeline_scopes() {
    let model = default_model();
    seed(&model).await;

    let only = Aggregate::new(vec![project_name()]).only_deleted();
    assert_eq!(model.aggregate(only).await.unwrap().len(), 2);

    let all = Aggregate::new(vec![project_name()]).include_deleted();
    assert_eq!(model.aggregate(all).await.unwrap().len(), 3);
}

#[tokio::test]
async fn count_stage_sees_rewritten_input() {
    let model = default_model();
    seed(&model).await;

    let docs = model.aggregate(vec![json!({ "$count": "total" })]).await.unwrap();
    assert_eq!(docs, vec![json!({ "total": 1 })]);

    let docs = model
        .aggregate(
            Aggregate::default()
                .sort(json!({ "name": -1 }))
                .skip(1)
                .limit(1)
                .include_deleted(),
        )
        .await
        .unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["name"], json!("Luke Skywalker"));
}
