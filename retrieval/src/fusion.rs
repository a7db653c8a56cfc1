use crate::config::RetrievalConfig;
use crate::result::ScoredCandidate;
use log::debug;
use sift_store::KnowledgeChunk;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Weighted-score fusion of the vector and keyword legs.
///
/// Candidates present in both legs merge into one entry carrying both
/// component scores. The combined score is
/// `vector_score * vector_weight + text_score + language_bonus`, so a chunk
/// matched by both legs always outranks the same chunk matched by one.
pub struct FusionEngine {
    config: RetrievalConfig,
}

struct Fused {
    chunk: KnowledgeChunk,
    vector_score: f32,
    text_score: f32,
    vector_rank: usize,
    text_rank: usize,
}

impl FusionEngine {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    /// Merge both result lists into a single ranked list.
    ///
    /// The output is sorted by combined score descending; exact ties break
    /// by vector rank, then text rank, so fusion is deterministic for a
    /// fixed pair of inputs. No truncation happens here.
    pub fn fuse(
        &self,
        vector: &[ScoredCandidate],
        text: &[ScoredCandidate],
        query_language: Option<&str>,
    ) -> Vec<ScoredCandidate> {
        let mut merged: HashMap<String, Fused> = HashMap::with_capacity(vector.len());

        for (rank, candidate) in vector.iter().enumerate() {
            merged.insert(
                candidate.chunk.id.clone(),
                Fused {
                    chunk: candidate.chunk.clone(),
                    vector_score: candidate.vector_score,
                    text_score: 0.0,
                    vector_rank: rank,
                    text_rank: usize::MAX,
                },
            );
        }

        if self.config.enable_fusion {
            for (rank, candidate) in text.iter().enumerate() {
                merged
                    .entry(candidate.chunk.id.clone())
                    .and_modify(|fused| {
                        fused.text_score = candidate.text_score;
                        fused.text_rank = rank;
                    })
                    .or_insert_with(|| Fused {
                        chunk: candidate.chunk.clone(),
                        vector_score: 0.0,
                        text_score: candidate.text_score,
                        vector_rank: usize::MAX,
                        text_rank: rank,
                    });
            }
        }

        let mut fused: Vec<Fused> = merged.into_values().collect();
        let mut scored: Vec<(f32, Fused)> = fused
            .drain(..)
            .map(|entry| (self.combined_score(&entry, query_language), entry))
            .collect();

        scored.sort_by(|(a_score, a), (b_score, b)| {
            b_score
                .partial_cmp(a_score)
                .unwrap_or(Ordering::Equal)
                .then(a.vector_rank.cmp(&b.vector_rank))
                .then(a.text_rank.cmp(&b.text_rank))
        });

        debug!(
            "fused {} vector + {} keyword candidates into {}",
            vector.len(),
            text.len(),
            scored.len()
        );

        scored
            .into_iter()
            .enumerate()
            .map(|(rank, (score, entry))| ScoredCandidate {
                chunk: entry.chunk,
                score,
                vector_score: entry.vector_score,
                text_score: entry.text_score,
                rank,
            })
            .collect()
    }

    fn combined_score(&self, entry: &Fused, query_language: Option<&str>) -> f32 {
        let mut score = entry.vector_score * self.config.vector_weight + entry.text_score;
        if let (Some(query_lang), Some(chunk_lang)) =
            (query_language, entry.chunk.language.as_deref())
            && query_lang == chunk_lang
        {
            score += self.config.language_boost;
        }
        score
    }
}
