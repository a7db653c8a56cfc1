use crate::chunk::KnowledgeChunk;
use crate::error::StoreError;
use crate::store::{DocumentStore, ScoredChunk, TextQuery, VectorQuery};
use async_trait::async_trait;
use log::debug;
use std::cmp::Ordering;
use std::collections::HashSet;
use tokio::sync::RwLock;

/// In-process reference [`DocumentStore`].
///
/// Vector search is exact cosine similarity mapped to the store's native
/// `0..=1` scale; text search scores by query-term overlap with optional
/// single-edit fuzzy tolerance. Intended for tests and local deployments;
/// a real ANN/full-text store plugs in behind the same trait.
#[derive(Default)]
pub struct MemoryStore {
    chunks: RwLock<Vec<KnowledgeChunk>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a chunk by id.
    pub async fn upsert(&self, chunk: KnowledgeChunk) {
        let mut chunks = self.chunks.write().await;
        match chunks.iter_mut().find(|c| c.id == chunk.id) {
            Some(existing) => *existing = chunk,
            None => chunks.push(chunk),
        }
    }

    pub async fn upsert_many(&self, batch: Vec<KnowledgeChunk>) {
        for chunk in batch {
            self.upsert(chunk).await;
        }
    }

    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn vector_query(&self, query: &VectorQuery) -> Result<Vec<ScoredChunk>, StoreError> {
        if query.vector.is_empty() {
            return Err(StoreError::Query("empty query vector".into()));
        }

        let chunks = self.chunks.read().await;
        let mut hits: Vec<ScoredChunk> = chunks
            .iter()
            .filter(|c| c.in_scope(query.tenant_id.as_deref()))
            .filter(|c| !c.embedding.is_empty())
            .map(|c| ScoredChunk {
                chunk: c.clone(),
                // Native scale: cosine in [-1, 1] mapped to [0, 1].
                score: (1.0 + cosine_similarity(&query.vector, &c.embedding)) / 2.0,
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        hits.truncate(query.limit.min(query.num_candidates));

        debug!("vector query returned {} hits", hits.len());
        Ok(hits)
    }

    async fn text_query(&self, query: &TextQuery) -> Result<Vec<ScoredChunk>, StoreError> {
        let terms: Vec<String> = tokenize(&query.text);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let chunks = self.chunks.read().await;
        let mut hits: Vec<ScoredChunk> = chunks
            .iter()
            .filter(|c| c.in_scope(query.tenant_id.as_deref()))
            .filter_map(|c| {
                let score = text_score(&terms, &c.content, query.fuzzy);
                (score > 0.0).then(|| ScoredChunk {
                    chunk: c.clone(),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.chunk.updated_at.cmp(&a.chunk.updated_at))
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        hits.truncate(query.limit);

        debug!("text query returned {} hits", hits.len());
        Ok(hits)
    }

    async fn recent(
        &self,
        tenant_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<KnowledgeChunk>, StoreError> {
        let chunks = self.chunks.read().await;
        let mut in_scope: Vec<KnowledgeChunk> = chunks
            .iter()
            .filter(|c| c.in_scope(tenant_id))
            .cloned()
            .collect();

        in_scope.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        in_scope.truncate(limit);
        Ok(in_scope)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_string()))
        .map(str::to_string)
        .collect()
}

/// Term-overlap relevance: one point per exact term hit, half a point per
/// fuzzy hit (single edit, terms of four or more chars only).
fn text_score(terms: &[String], content: &str, fuzzy: bool) -> f32 {
    let content_terms = tokenize(content);
    let mut score = 0.0;
    for term in terms {
        if content_terms.iter().any(|t| t == term) {
            score += 1.0;
        } else if fuzzy
            && term.len() >= 4
            && content_terms.iter().any(|t| within_one_edit(term, t))
        {
            score += 0.5;
        }
    }
    score
}

/// Whether `a` and `b` are within Levenshtein distance one.
fn within_one_edit(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    if long.len() - short.len() > 1 {
        return false;
    }

    let mut i = 0;
    let mut j = 0;
    let mut edits = 0;
    while i < short.len() && j < long.len() {
        if short[i] == long[j] {
            i += 1;
            j += 1;
            continue;
        }
        edits += 1;
        if edits > 1 {
            return false;
        }
        if short.len() == long.len() {
            // Substitution.
            i += 1;
        }
        j += 1;
    }
    edits + (long.len() - j) + (short.len() - i) <= 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunk(id: &str, content: &str) -> KnowledgeChunk {
        KnowledgeChunk::new(id, content)
    }

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .upsert_many(vec![
                chunk("refund", "We refund within 30 days")
                    .with_tenant("t1")
                    .with_embedding(vec![1.0, 0.0, 0.0])
                    .with_updated_at(300),
                chunk("shipping", "Shipping takes five business days")
                    .with_tenant("t1")
                    .with_embedding(vec![0.0, 1.0, 0.0])
                    .with_updated_at(200),
                chunk("global", "Our support desk is open weekdays")
                    .with_embedding(vec![0.0, 0.0, 1.0])
                    .with_updated_at(100),
                chunk("other-tenant", "Completely unrelated corpus")
                    .with_tenant("t2")
                    .with_embedding(vec![1.0, 0.0, 0.0])
                    .with_updated_at(400),
            ])
            .await;
        store
    }

    #[tokio::test]
    async fn test_vector_query_orders_by_similarity() {
        let store = seeded_store().await;
        let hits = store
            .vector_query(&VectorQuery {
                tenant_id: Some("t1".into()),
                vector: vec![1.0, 0.0, 0.0],
                num_candidates: 100,
                limit: 10,
            })
            .await
            .unwrap();

        assert_eq!(hits[0].chunk.id, "refund");
        assert!((hits[0].score - 1.0).abs() < 1e-6);
        // Orthogonal embeddings land mid-scale.
        assert!((hits[1].score - 0.5).abs() < 1e-6);
        // t2's chunk is out of scope.
        assert!(hits.iter().all(|h| h.chunk.id != "other-tenant"));
    }

    #[tokio::test]
    async fn test_vector_query_includes_global_corpus() {
        let store = seeded_store().await;
        let hits = store
            .vector_query(&VectorQuery {
                tenant_id: Some("t1".into()),
                vector: vec![0.0, 0.0, 1.0],
                num_candidates: 100,
                limit: 10,
            })
            .await
            .unwrap();
        assert_eq!(hits[0].chunk.id, "global");
    }

    #[tokio::test]
    async fn test_vector_query_rejects_empty_vector() {
        let store = seeded_store().await;
        let result = store
            .vector_query(&VectorQuery {
                tenant_id: None,
                vector: vec![],
                num_candidates: 100,
                limit: 10,
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_text_query_exact_and_fuzzy() {
        let store = seeded_store().await;
        let hits = store
            .text_query(&TextQuery {
                tenant_id: Some("t1".into()),
                text: "refund policy".to_string(),
                fuzzy: true,
                limit: 10,
            })
            .await
            .unwrap();
        assert_eq!(hits[0].chunk.id, "refund");
        assert!((hits[0].score - 1.0).abs() < 1e-6);

        // One-edit typo still matches at half weight.
        let fuzzy_hits = store
            .text_query(&TextQuery {
                tenant_id: Some("t1".into()),
                text: "refnud".to_string(),
                fuzzy: true,
                limit: 10,
            })
            .await
            .unwrap();
        assert!(fuzzy_hits.is_empty());

        let fuzzy_hits = store
            .text_query(&TextQuery {
                tenant_id: Some("t1".into()),
                text: "refunds".to_string(),
                fuzzy: true,
                limit: 10,
            })
            .await
            .unwrap();
        assert_eq!(fuzzy_hits[0].chunk.id, "refund");
        assert!((fuzzy_hits[0].score - 0.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_text_query_no_match_is_empty() {
        let store = seeded_store().await;
        let hits = store
            .text_query(&TextQuery {
                tenant_id: Some("t1".into()),
                text: "xyz123nonsense".to_string(),
                fuzzy: true,
                limit: 10,
            })
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_recent_orders_by_updated_at() {
        let store = seeded_store().await;
        let recent = store.recent(Some("t1"), 2).await.unwrap();
        let ids: Vec<&str> = recent.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["refund", "shipping"]);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = MemoryStore::new();
        store.upsert(chunk("a", "old")).await;
        store.upsert(chunk("a", "new")).await;
        assert_eq!(store.len().await, 1);

        let recent = store.recent(None, 10).await.unwrap();
        assert_eq!(recent[0].content, "new");
    }

    #[test]
    fn test_within_one_edit() {
        assert!(within_one_edit("refund", "refund"));
        assert!(within_one_edit("refund", "refunds"));
        assert!(within_one_edit("refund", "refond"));
        assert!(!within_one_edit("refund", "refnud"));
        assert!(!within_one_edit("refund", "shipping"));
    }
}
