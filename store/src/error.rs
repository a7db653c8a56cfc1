use thiserror::Error;

/// Errors surfaced by [`crate::DocumentStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The query exceeded its bounded maximum execution time.
    #[error("store query timed out")]
    Timeout,

    /// A required index is missing or misconfigured.
    #[error("index error: {0}")]
    Index(String),

    /// The query itself was rejected by the store.
    #[error("query error: {0}")]
    Query(String),

    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
