use anyhow::Result;

use crate::embedding::RuleEmbedder;
use crate::rules::PolicyRule;

/// Immutable nearest-neighbor index over embedded rule texts. Built once at
/// process start; search only ever borrows the vectors.
#[derive(Clone)]
pub struct RuleIndex {
    rules: Vec<PolicyRule>,
    vectors: Vec<Vec<f32>>,
}

#[derive(Debug, Clone)]
pub struct ScoredRule {
    pub text: String,
    pub source: Option<String>,
    pub score: f32,
}

impl RuleIndex {
    pub fn build(rules: Vec<PolicyRule>, embedder: &RuleEmbedder) -> Result<Self> {
        let vectors = embedder.embed_rules(&rules)?;
        Ok(Self { rules, vectors })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Exact top-K retrieval by cosine similarity.
    pub fn search(&self, query_embedding: &[f32], top_k: usize) -> Vec<ScoredRule> {
        let mut hits: Vec<ScoredRule> = self
            .rules
            .iter()
            .zip(self.vectors.iter())
            .map(|(rule, vector)| ScoredRule {
                text: rule.rule.clone(),
                source: rule.source.clone(),
                score: cosine_similarity(query_embedding, vector),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if hits.len() > top_k {
            hits.truncate(top_k);
        }
        hits
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut a_norm = 0.0f32;
    let mut b_norm = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        a_norm += x * x;
        b_norm += y * y;
    }
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    dot / (a_norm.sqrt() * b_norm.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(text: &str) -> PolicyRule {
        PolicyRule {
            rule: text.to_string(),
            source: Some("policies.json".to_string()),
        }
    }

    fn sample_index() -> (RuleIndex, RuleEmbedder) {
        let embedder = RuleEmbedder::hash(crate::embedding::DEFAULT_HASH_DIMENSIONS);
        let rules = vec![
            rule("Pre-authorization is required for elective cardiology procedures."),
            rule("Claims must be submitted within 60 days of the service date."),
            rule("Denied claims may be appealed within 30 days."),
        ];
        let index = RuleIndex::build(rules, &embedder).unwrap();
        (index, embedder)
    }

    #[test]
    fn search_ranks_overlapping_rule_first() {
        let (index, embedder) = sample_index();
        let query = embedder
            .embed_question("Do I need pre-authorization for cardiology?")
            .unwrap();
        let hits = index.search(&query, 2);
        assert_eq!(hits.len(), 2);
        assert!(hits[0].text.contains("Pre-authorization"), "{:?}", hits[0]);
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn search_truncates_to_top_k() {
        let (index, embedder) = sample_index();
        let query = embedder.embed_question("claims").unwrap();
        assert_eq!(index.search(&query, 1).len(), 1);
        assert_eq!(index.search(&query, 10).len(), 3);
    }

    #[test]
    fn cosine_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
