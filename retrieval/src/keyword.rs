use crate::FailurePolicy;
use crate::config::RetrievalConfig;
use crate::result::ScoredCandidate;
use log::{debug, warn};
use sift_store::{DocumentStore, TextQuery};
use std::sync::Arc;
use tokio::time::timeout;

/// Lexical search leg: term matching with optional fuzzy expansion.
///
/// Every failure degrades to an empty result with a warning. The keyword leg
/// is an enrichment on top of semantic recall, so a broken text index dims
/// result quality rather than failing the request.
pub struct KeywordSearch {
    config: RetrievalConfig,
    store: Arc<dyn DocumentStore>,
}

impl KeywordSearch {
    pub const POLICY: FailurePolicy = FailurePolicy::Degrade;

    pub fn new(config: RetrievalConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self { config, store }
    }

    /// Top-`k` candidates by lexical match within the tenant scope.
    ///
    /// Infallible by design: disabled search, blank queries, store errors
    /// and timeouts all produce an empty list.
    pub async fn search(
        &self,
        tenant_id: Option<&str>,
        text: &str,
        k: usize,
    ) -> Vec<ScoredCandidate> {
        if !self.config.enable_keyword {
            debug!("keyword search disabled by configuration");
            return Vec::new();
        }
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let query = TextQuery {
            tenant_id: tenant_id.map(str::to_string),
            text: text.to_string(),
            fuzzy: self.config.enable_fuzzy,
            limit: k,
        };

        match timeout(self.config.store_timeout, self.store.text_query(&query)).await {
            Ok(Ok(hits)) => {
                debug!("keyword search returned {} candidates", hits.len());
                hits.into_iter()
                    .map(|hit| ScoredCandidate::from_text(hit.chunk, hit.score))
                    .collect()
            }
            Ok(Err(err)) => {
                warn!("keyword search degraded to empty: {err}");
                Vec::new()
            }
            Err(_) => {
                warn!("keyword search timed out; degrading to empty");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use sift_store::{
        KnowledgeChunk, MemoryStore, ScoredChunk, StoreError, VectorQuery,
    };

    struct FailingStore;

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn vector_query(
            &self,
            _query: &VectorQuery,
        ) -> Result<Vec<ScoredChunk>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }

        async fn text_query(
            &self,
            _query: &TextQuery,
        ) -> Result<Vec<ScoredChunk>, StoreError> {
            Err(StoreError::Index("text index missing".into()))
        }

        async fn recent(
            &self,
            _tenant_id: Option<&str>,
            _limit: usize,
        ) -> Result<Vec<KnowledgeChunk>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    fn engine(store: Arc<dyn DocumentStore>, config: RetrievalConfig) -> KeywordSearch {
        KeywordSearch::new(config, store)
    }

    #[tokio::test]
    async fn test_matches_exact_terms() {
        let store = MemoryStore::new();
        store
            .upsert(KnowledgeChunk::new("c1", "refund policy details").with_tenant("t1"))
            .await;
        store
            .upsert(KnowledgeChunk::new("c2", "shipping rates").with_tenant("t1"))
            .await;

        let results = engine(Arc::new(store), RetrievalConfig::default())
            .search(Some("t1"), "refund", 5)
            .await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.id, "c1");
        assert_eq!(results[0].score, results[0].text_score);
        assert_eq!(results[0].vector_score, 0.0);
    }

    #[tokio::test]
    async fn test_store_error_degrades_to_empty() {
        let results = engine(Arc::new(FailingStore), RetrievalConfig::default())
            .search(Some("t1"), "refund", 5)
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_is_empty() {
        let results = engine(Arc::new(MemoryStore::new()), RetrievalConfig::default())
            .search(None, "   ", 5)
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_search_is_empty() {
        let store = MemoryStore::new();
        store
            .upsert(KnowledgeChunk::new("c1", "refund policy").with_tenant("t1"))
            .await;
        let config = RetrievalConfig {
            enable_keyword: false,
            ..RetrievalConfig::default()
        };

        let results = engine(Arc::new(store), config)
            .search(Some("t1"), "refund", 5)
            .await;
        assert!(results.is_empty());
    }

    #[test]
    fn test_policy_is_degrade() {
        assert_eq!(KeywordSearch::POLICY, FailurePolicy::Degrade);
    }
}
