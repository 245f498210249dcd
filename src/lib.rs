pub mod error;
pub mod types;

pub mod fields;
pub mod middleware;
pub mod model;
pub mod options;
pub mod plugin;
pub mod query;
pub mod schema;
pub mod store;
pub mod update;

pub use error::{Result, SoftDeleteError};
pub use model::{Instance, Model};
pub use options::SoftDeleteOptions;
pub use plugin::SoftDelete;
pub use query::types::{DeletedScope, Query};
