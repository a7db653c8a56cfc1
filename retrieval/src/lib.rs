//! Hybrid knowledge retrieval for multi-tenant assistants.
//!
//! A query runs through a fixed pipeline: embed, search the vector and
//! keyword legs concurrently, fuse the two ranked lists by weighted score,
//! then pick a result set through a cascading selection waterfall that
//! bottoms out in a recency fallback. Whole responses are memoized in a TTL
//! cache keyed by query, tenant and limits.
//!
//! The two legs fail differently on purpose: a broken vector store fails
//! the request, a broken text index only dims result quality.

mod config;
mod error;
mod fusion;
mod keyword;
mod language;
mod result;
mod retrieval;
mod select;
mod vector;

pub use config::RetrievalConfig;
pub use error::{Result, RetrievalError};
pub use fusion::FusionEngine;
pub use keyword::KeywordSearch;
pub use language::detect as detect_language;
pub use result::{
    Candidate, RetrievalMeta, RetrievalResponse, ScoredCandidate, SelectionPath,
};
pub use retrieval::{KnowledgeRetrieval, RetrievalRequest};
pub use select::{Selection, SelectionEngine};
pub use vector::VectorSearch;

/// How a pipeline stage treats its own failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Surface the error to the caller.
    Propagate,
    /// Log and continue with an empty contribution.
    Degrade,
}
