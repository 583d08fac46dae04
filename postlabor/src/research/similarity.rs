use std::collections::HashSet;
use std::sync::Arc;

use crate::config::SimilarityKind;
use crate::models::normalize_topic;

/// Decides whether two topics cover the same ground.
pub trait TopicSimilarity: Send + Sync {
    fn similar(&self, a: &str, b: &str) -> bool;

    /// Similarity in `[0.0, 1.0]`.
    fn score(&self, a: &str, b: &str) -> f64;
}

/// Two topics match when one normalized form contains the other.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringSimilarity;

impl TopicSimilarity for SubstringSimilarity {
    fn similar(&self, a: &str, b: &str) -> bool {
        let (a, b) = (normalize_topic(a), normalize_topic(b));
        if a.is_empty() || b.is_empty() {
            return false;
        }
        a.contains(&b) || b.contains(&a)
    }

    fn score(&self, a: &str, b: &str) -> f64 {
        let (a, b) = (normalize_topic(a), normalize_topic(b));
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
        if long.contains(short.as_str()) {
            short.len() as f64 / long.len() as f64
        } else {
            0.0
        }
    }
}

/// Jaccard overlap of topic words, ignoring very short words.
#[derive(Debug, Clone, Copy)]
pub struct KeywordOverlapSimilarity {
    pub threshold: f64,
}

impl Default for KeywordOverlapSimilarity {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

fn keywords(topic: &str) -> HashSet<String> {
    normalize_topic(topic)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

impl TopicSimilarity for KeywordOverlapSimilarity {
    fn similar(&self, a: &str, b: &str) -> bool {
        self.score(a, b) >= self.threshold
    }

    fn score(&self, a: &str, b: &str) -> f64 {
        let (a, b) = (keywords(a), keywords(b));
        let union = a.union(&b).count();
        if union == 0 {
            return 0.0;
        }
        a.intersection(&b).count() as f64 / union as f64
    }
}

pub fn similarity_for(kind: SimilarityKind) -> Arc<dyn TopicSimilarity> {
    match kind {
        SimilarityKind::Substring => Arc::new(SubstringSimilarity),
        SimilarityKind::Keyword => Arc::new(KeywordOverlapSimilarity::default()),
    }
}
