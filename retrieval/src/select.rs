use crate::config::RetrievalConfig;
use crate::result::{ScoredCandidate, SelectionPath};
use log::{debug, warn};
use sift_store::DocumentStore;
use std::sync::Arc;
use tokio::time::timeout;

/// Outcome of the selection waterfall: the surviving candidates plus which
/// tier produced them.
pub struct Selection {
    pub results: Vec<ScoredCandidate>,
    pub path: SelectionPath,
}

/// Cascading candidate selection.
///
/// Tiers are tried strictly in order and the first non-empty one wins:
/// fused candidates above the primary threshold, then above the secondary
/// threshold, then the raw keyword leg, then the most recently updated
/// chunks in scope. Selection never fails; an empty outcome means the
/// tenant's corpus itself is empty or unreachable.
pub struct SelectionEngine {
    config: RetrievalConfig,
    store: Arc<dyn DocumentStore>,
}

impl SelectionEngine {
    pub fn new(config: RetrievalConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self { config, store }
    }

    pub async fn select(
        &self,
        fused: &[ScoredCandidate],
        keyword: &[ScoredCandidate],
        tenant_id: Option<&str>,
        target_k: usize,
    ) -> Selection {
        let (candidates, path) = if let Some(primary) =
            self.above_threshold(fused, self.config.primary_threshold)
        {
            (primary, SelectionPath::FusionPrimary)
        } else if let Some(secondary) =
            self.above_threshold(fused, self.config.secondary_threshold)
        {
            (secondary, SelectionPath::FusionSecondary)
        } else if !keyword.is_empty() {
            (keyword.to_vec(), SelectionPath::Keyword)
        } else {
            (self.recent_fallback(tenant_id).await, SelectionPath::Fallback)
        };

        let limit = self.config.rerank_limit.min(target_k.max(1));
        let mut results = candidates;
        results.truncate(limit);
        for (rank, candidate) in results.iter_mut().enumerate() {
            candidate.rank = rank;
        }

        debug!("selected {} candidates via {path}", results.len());
        Selection { results, path }
    }

    fn above_threshold(
        &self,
        fused: &[ScoredCandidate],
        threshold: f32,
    ) -> Option<Vec<ScoredCandidate>> {
        let passing: Vec<ScoredCandidate> = fused
            .iter()
            .filter(|candidate| candidate.score >= threshold)
            .cloned()
            .collect();
        if passing.is_empty() { None } else { Some(passing) }
    }

    /// Last-resort tier: recently updated chunks in scope, scored zero.
    /// Store failures here degrade to empty rather than surfacing an error
    /// from what is already the failure path.
    async fn recent_fallback(&self, tenant_id: Option<&str>) -> Vec<ScoredCandidate> {
        let lookup = self
            .store
            .recent(tenant_id, self.config.fallback_limit);
        match timeout(self.config.store_timeout, lookup).await {
            Ok(Ok(chunks)) => chunks
                .into_iter()
                .map(|chunk| ScoredCandidate {
                    chunk,
                    score: 0.0,
                    vector_score: 0.0,
                    text_score: 0.0,
                    rank: 0,
                })
                .collect(),
            Ok(Err(err)) => {
                warn!("recency fallback degraded to empty: {err}");
                Vec::new()
            }
            Err(_) => {
                warn!("recency fallback timed out; degrading to empty");
                Vec::new()
            }
        }
    }
}
