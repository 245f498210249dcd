//! Shared fixtures for the model tests.

use serde_json::{json, Value};
use soft_delete::schema::{t, Schema};
use soft_delete::store::MemoryStore;
use soft_delete::{Model, SoftDelete, SoftDeleteOptions};

pub type TestModel = Model<MemoryStore>;

pub fn jedi_schema() -> Schema {
    Schema::new("jedi").field("name", t::string())
}

pub fn model_with(mut schema: Schema, options: SoftDeleteOptions) -> TestModel {
    let plugin = SoftDelete::install(&mut schema, options).expect("install plugin");
    Model::new(MemoryStore::new(schema), plugin)
}

pub fn default_model() -> TestModel {
    model_with(jedi_schema(), SoftDeleteOptions::default())
}

/// One live record and two deleted ones, returned in insertion order.
pub async fn seed(model: &TestModel) -> Vec<Value> {
    model
        .insert_many(vec![
            json!({ "name": "Obi-Wan Kenobi", "deleted": true }),
            json!({ "name": "Darth Vader" }),
            json!({ "name": "Luke Skywalker", "deleted": true }),
        ])
        .await
        .expect("seed")
        .into_iter()
        .map(|instance| instance.into_inner())
        .collect()
}

pub fn id_of(doc: &Value) -> Value {
    doc["_id"].clone()
}

pub fn names(docs: &[Value]) -> Vec<&str> {
    let mut names: Vec<&str> = docs.iter().filter_map(|d| d["name"].as_str()).collect();
    names.sort_unstable();
    names
}
