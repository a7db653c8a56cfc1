//! # Sift Store
//!
//! The document-store boundary of the retrieval engine. The real store is an
//! external vector-and-text-capable database; this crate owns the
//! [`KnowledgeChunk`] data model, the [`DocumentStore`] trait exposing the
//! store's two query primitives (approximate-nearest-neighbor and full-text)
//! plus a recency scan, and [`MemoryStore`], an in-process reference
//! implementation for tests and local deployments.
//!
//! All queries are tenant-scoped: a chunk belongs to exactly one tenant
//! scope, or to the global corpus when its tenant id is unset.

mod chunk;
mod error;
mod memory;
mod store;

pub use chunk::KnowledgeChunk;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::{DocumentStore, ScoredChunk, TextQuery, VectorQuery};
