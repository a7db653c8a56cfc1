use crate::FailurePolicy;
use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::result::ScoredCandidate;
use log::debug;
use sift_store::{DocumentStore, StoreError, VectorQuery};
use std::sync::Arc;
use tokio::time::timeout;

/// Semantic search leg: approximate-nearest-neighbor lookup over chunk
/// embeddings.
///
/// Store failures propagate — losing the semantic leg of a hybrid search is
/// a serious degradation, and the orchestrator's caller decides whether that
/// means "no knowledge base" or a failed request. Compare
/// [`crate::keyword::KeywordSearch`], which degrades instead.
pub struct VectorSearch {
    config: RetrievalConfig,
    store: Arc<dyn DocumentStore>,
}

impl VectorSearch {
    pub const POLICY: FailurePolicy = FailurePolicy::Propagate;

    pub fn new(config: RetrievalConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self { config, store }
    }

    /// Top-`k` candidates by embedding similarity within the tenant scope.
    ///
    /// An empty query vector (embedding degraded upstream) yields an empty
    /// list without touching the store.
    pub async fn search(
        &self,
        tenant_id: Option<&str>,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        if vector.is_empty() {
            debug!("empty query vector; skipping vector search");
            return Ok(Vec::new());
        }

        let query = VectorQuery {
            tenant_id: tenant_id.map(str::to_string),
            vector: vector.to_vec(),
            num_candidates: self.candidate_pool(k),
            limit: k,
        };

        let hits = timeout(self.config.store_timeout, self.store.vector_query(&query))
            .await
            .map_err(|_| StoreError::Timeout)??;

        debug!("vector search returned {} candidates", hits.len());
        Ok(hits
            .into_iter()
            .map(|hit| ScoredCandidate::from_vector(hit.chunk, hit.score))
            .collect())
    }

    /// Candidate-pool size kept well above `k` to preserve recall before the
    /// store's internal top-k cut.
    fn candidate_pool(&self, k: usize) -> usize {
        (self.config.candidate_multiplier * k).max(self.config.min_candidate_pool)
    }
}
