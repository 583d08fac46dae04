use std::collections::HashSet;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::models::normalize_topic;

/// Picks topics for a batch, preferring ones that overlap little with what
/// was researched before.
pub struct TopicSelector {
    overlap_threshold: usize,
    rng: Mutex<StdRng>,
}

impl TopicSelector {
    /// A fixed `seed` makes the sequence of selections reproducible.
    pub fn new(overlap_threshold: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            overlap_threshold,
            rng: Mutex::new(rng),
        }
    }

    /// Select up to `count` distinct topics from `pool`.
    ///
    /// Candidates whose first three words share at least `overlap_threshold`
    /// words with the history, or that `is_stale` rejects, are skipped on the
    /// first pass. The rest of the batch is then backfilled from the pool
    /// regardless, so `count` topics come back whenever the pool has that
    /// many distinct entries.
    pub fn select_topics(
        &self,
        count: usize,
        pool: &[String],
        history: &[String],
        is_stale: &dyn Fn(&str) -> bool,
    ) -> Vec<String> {
        if count == 0 {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut candidates: Vec<&String> = pool
            .iter()
            .filter(|t| {
                let key = normalize_topic(t);
                !key.is_empty() && seen.insert(key)
            })
            .collect();

        {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            candidates.shuffle(&mut *rng);
        }

        let history_keywords: HashSet<String> =
            history.iter().flat_map(|t| leading_keywords(t)).collect();

        let mut selected: Vec<String> = Vec::with_capacity(count);
        for candidate in &candidates {
            if selected.len() == count {
                break;
            }
            let overlap = leading_keywords(candidate)
                .iter()
                .filter(|w| history_keywords.contains(*w))
                .count();

            if overlap < self.overlap_threshold && !is_stale(candidate) {
                selected.push((*candidate).clone());
            }
        }

        let fresh = selected.len();
        for candidate in &candidates {
            if selected.len() == count {
                break;
            }
            if !selected.contains(*candidate) {
                selected.push((*candidate).clone());
            }
        }

        tracing::debug!(
            requested = count,
            fresh,
            backfilled = selected.len() - fresh,
            "Selected research topics"
        );

        selected
    }
}

/// First three lowercase words of a topic.
fn leading_keywords(topic: &str) -> Vec<String> {
    normalize_topic(topic)
        .split_whitespace()
        .take(3)
        .map(str::to_string)
        .collect()
}
