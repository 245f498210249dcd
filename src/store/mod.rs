//! Persistence seam.
//!
//! [`DocumentStore`] is the interface to the document-mapping layer the plugin
//! runs on top of. [`MemoryStore`] is an in-memory implementation for tests.

pub mod memory;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::DocumentStore;
