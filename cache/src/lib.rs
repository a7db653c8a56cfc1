//! # Sift Cache
//!
//! TTL key/value caching for the retrieval engine. The cache store itself
//! (e.g. a networked key/value service) is an external, optional collaborator
//! behind the [`CacheStore`] trait; every operation degrades to a pass-through
//! miss when the store is absent or failing, so callers never see cache
//! errors.
//!
//! Two layers live here:
//!
//! - [`CacheStore`] — the raw string key/value boundary with TTL-aware `set`,
//!   plus [`MemoryCacheStore`], an in-process implementation used by tests and
//!   single-process deployments.
//! - [`TtlCache`] — a namespaced, serde-typed wrapper with a `wrap` operation
//!   that memoizes an async computation, skipping storage of empty payloads.
//!
//! Cache keys are built with [`fingerprint`] from a fixed tuple of request
//! fields, hashed into a stable hex digest so semantically identical requests
//! always collide to the same key; [`TtlCache`] prepends its namespace.

mod error;
mod key;
mod store;
mod ttl;

pub use error::CacheError;
pub use key::fingerprint;
pub use store::{CacheStore, MemoryCacheStore};
pub use ttl::{Cacheable, TtlCache};
