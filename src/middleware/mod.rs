//! Middleware module: lifecycle hooks run by a [`Model`](crate::model::Model).
//!
//! Provides the [`Middleware`] trait for preparing documents before they are
//! saved, rewriting queries per method, and rewriting aggregation pipelines.

pub mod types;

pub use types::{Middleware, Passthrough};
