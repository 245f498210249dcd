pub mod definition;
pub mod index;
pub mod node;
pub mod validate;

pub use definition::Schema;
pub use index::FieldIndex;
pub use node::{t, FieldDef, SchemaNode};
