use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ValidationError / ValidationErrors
// ---------------------------------------------------------------------------

/// A single field-level validation failure reported by the store.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub path: String,
    pub expected: String,
    pub received: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"Validation failed at "{}": expected {}, received {}"#,
            self.path, self.expected, self.received
        )
    }
}

impl std::error::Error for ValidationError {}

/// A collection of one or more `ValidationError`s.
#[derive(Debug, Clone)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed:")?;
        for e in &self.0 {
            write!(f, "\n  - {}: expected {}, received {}", e.path, e.expected, e.received)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ---------------------------------------------------------------------------
// QueryError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Invalid regex: {0}")]
    InvalidRegex(String),
}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Errors raised by a [`DocumentStore`](crate::store::traits::DocumentStore).
///
/// The plugin never wraps or rewrites these; they reach the caller as the
/// store produced them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Duplicate key in collection \"{collection}\": {id}")]
    DuplicateKey { collection: String, id: String },

    #[error("Invalid update document: {0}")]
    InvalidUpdate(String),

    #[error("Invalid aggregation pipeline: {0}")]
    InvalidPipeline(String),

    #[error("Document must be a JSON object, got: {0}")]
    NotAnObject(String),

    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Invalid plugin configuration, detected while installing into a schema.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid field name \"{name}\" for {property}: must match [a-zA-Z_][a-zA-Z0-9_]*")]
    InvalidFieldName { property: String, name: String },

    #[error("Field \"{name}\" for {property} already exists in schema \"{schema}\"")]
    FieldConflict {
        schema: String,
        property: String,
        name: String,
    },

    #[error("Field \"{name}\" for deleted must be Boolean, got {found}")]
    InvalidMarkerType { name: String, found: String },

    #[error("Fields {first} and {second} both resolve to \"{name}\"")]
    DuplicateFieldName {
        first: String,
        second: String,
        name: String,
    },
}

// ---------------------------------------------------------------------------
// SoftDeleteError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SoftDeleteError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<ValidationErrors> for SoftDeleteError {
    fn from(e: ValidationErrors) -> Self {
        SoftDeleteError::Store(StoreError::Validation(e))
    }
}

impl From<QueryError> for SoftDeleteError {
    fn from(e: QueryError) -> Self {
        SoftDeleteError::Store(StoreError::Query(e))
    }
}

/// Result alias; the default error type is `SoftDeleteError`.
pub type Result<T, E = SoftDeleteError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
