use serde::{Deserialize, Serialize};
use sift_cache::Cacheable;
use sift_store::KnowledgeChunk;

/// Which selection strategy produced the final result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPath {
    /// Fused candidates above the primary threshold.
    FusionPrimary,
    /// Fused candidates above the (lower) secondary threshold.
    FusionSecondary,
    /// Raw keyword results, re-scored by their text relevance.
    Keyword,
    /// Most recently updated chunks; also reported with zero results when
    /// the tenant's corpus is empty.
    Fallback,
}

impl SelectionPath {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectionPath::FusionPrimary => "fusion-primary",
            SelectionPath::FusionSecondary => "fusion-secondary",
            SelectionPath::Keyword => "keyword",
            SelectionPath::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for SelectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chunk scored during one request.
///
/// Per-leg scores default to zero when the chunk was absent from that leg,
/// never to a missing value, so score arithmetic is always well-defined.
/// Candidates live for the duration of a request and are never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredCandidate {
    pub chunk: KnowledgeChunk,

    /// Current relevance score; which leg it reflects depends on the
    /// pipeline stage (native score in an adapter, combined score after
    /// fusion, text score on the keyword selection path).
    pub score: f32,

    /// Similarity score from the vector leg, 0 when absent.
    pub vector_score: f32,

    /// Relevance score from the keyword leg, 0 when absent.
    pub text_score: f32,

    /// Position after the most recent sort (0 = best).
    pub rank: usize,
}

impl ScoredCandidate {
    pub fn from_vector(chunk: KnowledgeChunk, score: f32) -> Self {
        Self {
            chunk,
            score,
            vector_score: score,
            text_score: 0.0,
            rank: 0,
        }
    }

    pub fn from_text(chunk: KnowledgeChunk, score: f32) -> Self {
        Self {
            chunk,
            score,
            vector_score: 0.0,
            text_score: score,
            rank: 0,
        }
    }
}

/// One entry of the final response, stripped to the caller-facing fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub content: String,
    pub score: f32,
    pub vector_score: f32,
    pub text_score: f32,
    pub language: Option<String>,
}

impl From<&ScoredCandidate> for Candidate {
    fn from(candidate: &ScoredCandidate) -> Self {
        Self {
            id: candidate.chunk.id.clone(),
            content: candidate.chunk.content.clone(),
            score: candidate.score,
            vector_score: candidate.vector_score,
            text_score: candidate.text_score,
            language: candidate.chunk.language.clone(),
        }
    }
}

/// Observability metadata for one retrieval; callers log this but do not
/// branch on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalMeta {
    pub path: SelectionPath,
    pub query_language: Option<String>,
    pub vector_count: usize,
    pub keyword_count: usize,
    pub fused_count: usize,
    pub primary_threshold: f32,
    pub secondary_threshold: f32,
    pub cache_hit: bool,
}

/// Final ranked, deduplicated response for one retrieval request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResponse {
    pub results: Vec<Candidate>,
    pub meta: RetrievalMeta,
}

impl RetrievalResponse {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Get the top N results.
    pub fn top(&self, n: usize) -> &[Candidate] {
        &self.results[..n.min(self.results.len())]
    }
}

impl Cacheable for RetrievalResponse {
    // An empty response must not shadow later non-empty results for the
    // whole TTL window (the corpus may be mid-ingestion).
    fn worth_caching(&self) -> bool {
        !self.results.is_empty()
    }

    fn mark_cache_hit(&mut self) {
        self.meta.cache_hit = true;
    }
}
