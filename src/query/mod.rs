pub mod execute;
pub mod operators;
pub mod pipeline;
pub mod rewrite;
pub mod types;

pub use pipeline::Aggregate;
pub use types::{DeletedScope, Query, SortDirection, SortEntry, SortInput, StoreQuery};
