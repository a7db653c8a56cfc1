use sift_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the retrieval pipeline.
///
/// Only the vector leg propagates store failures; the keyword leg and the
/// caches degrade internally and never appear here. The caller decides
/// whether a vector-leg failure means "no knowledge base" or a hard failure.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The semantic (vector) search leg failed.
    #[error("vector search failed: {0}")]
    VectorSearch(#[from] StoreError),

    /// The configuration was rejected at construction time.
    #[error("invalid retrieval config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, RetrievalError>;
