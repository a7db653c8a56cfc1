use crate::chunk::KnowledgeChunk;
use crate::error::StoreError;
use async_trait::async_trait;

/// Approximate-nearest-neighbor query over the chunk embedding field.
#[derive(Debug, Clone)]
pub struct VectorQuery {
    /// Tenant scope; `None` searches the whole corpus.
    pub tenant_id: Option<String>,

    /// The query embedding.
    pub vector: Vec<f32>,

    /// Candidate-pool size considered before the store's top-k cut. Kept
    /// substantially larger than `limit` to preserve recall.
    pub num_candidates: usize,

    /// Maximum number of scored hits to return.
    pub limit: usize,
}

/// Full-text query over the chunk content field.
#[derive(Debug, Clone)]
pub struct TextQuery {
    /// Tenant scope; `None` searches the whole corpus.
    pub tenant_id: Option<String>,

    /// The raw query text.
    pub text: String,

    /// Tolerate small edit distances when matching terms.
    pub fuzzy: bool,

    /// Maximum number of scored hits to return.
    pub limit: usize,
}

/// A chunk with the store's native relevance score attached.
///
/// Vector hits carry a similarity score, text hits a text-relevance score;
/// the two scales are unrelated and the caller keeps them apart.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: KnowledgeChunk,
    pub score: f32,
}

/// The external vector-and-text-capable document store.
///
/// Implementations expose the store's two search primitives and a recency
/// scan, all tenant-scoped. Errors are reported as-is; whether a failure is
/// fatal is the caller's decision, not the store's.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Approximate-nearest-neighbor search, best hits first.
    async fn vector_query(&self, query: &VectorQuery) -> Result<Vec<ScoredChunk>, StoreError>;

    /// Full-text search, best hits first.
    async fn text_query(&self, query: &TextQuery) -> Result<Vec<ScoredChunk>, StoreError>;

    /// Most recently updated chunks in scope, newest first.
    async fn recent(
        &self,
        tenant_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<KnowledgeChunk>, StoreError>;
}
