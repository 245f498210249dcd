use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Options structs
// ============================================================================

/// Options for saving a whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveOptions {
    /// Validate against the schema before writing. `None` = store default (validate).
    pub validate: Option<bool>,
    /// Maintain `updatedAt` / `createdAt`. `None` = follow the schema.
    pub timestamps: Option<bool>,
}

impl SaveOptions {
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = Some(validate);
        self
    }

    pub fn timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = Some(timestamps);
        self
    }
}

/// Options for update_one / update_many / find_one_and_update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateOptions {
    /// Insert a document built from the filter equalities and the update when
    /// nothing matches.
    pub upsert: bool,
    /// Maintain `updatedAt` / `createdAt`. `None` = follow the schema.
    pub timestamps: Option<bool>,
    /// find_one_and_update only: return the document after the update
    /// instead of before.
    pub return_new: bool,
}

impl UpdateOptions {
    pub fn upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }

    pub fn timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = Some(timestamps);
        self
    }

    pub fn return_new(mut self, return_new: bool) -> Self {
        self.return_new = return_new;
        self
    }
}

// ============================================================================
// Results
// ============================================================================

/// Result of update_one / update_many.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    /// Documents whose content actually changed.
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<Value>,
}

/// Result of a soft delete issued through a static.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl From<UpdateResult> for DeleteResult {
    fn from(result: UpdateResult) -> Self {
        Self {
            acknowledged: result.acknowledged,
            deleted_count: result.modified_count,
        }
    }
}
