use std::sync::Arc;

use chrono::Utc;

use crate::llm::prompts::{analysis_prompt, analysis_system_prompt, format_search_results};
use crate::llm::TextGenerator;
use crate::models::{Analysis, ResearchMode, SearchResult, Source};
use crate::research::parser::parse_analysis;

/// Turns ranked search results into an [`Analysis`]. Never fails: model
/// errors degrade to a placeholder summary.
pub struct Summarizer {
    text: Arc<dyn TextGenerator>,
    truncate_chars: usize,
    max_tokens: u32,
}

impl Summarizer {
    pub fn new(text: Arc<dyn TextGenerator>, truncate_chars: usize, max_tokens: u32) -> Self {
        Self {
            text,
            truncate_chars,
            max_tokens,
        }
    }

    pub async fn summarize(
        &self,
        topic: &str,
        results: &[SearchResult],
        mode: ResearchMode,
    ) -> Analysis {
        let now = Utc::now();
        let sources: Vec<Source> = results
            .iter()
            .map(|r| Source::from_result(r, now))
            .collect();

        let prompt = analysis_prompt(
            topic,
            &format_search_results(results, self.truncate_chars),
            mode,
        );

        let content = match self
            .text
            .generate(analysis_system_prompt(mode), &prompt, self.max_tokens)
            .await
        {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(topic, error = %e, "Summarization call failed");
                String::new()
            }
        };

        if content.trim().is_empty() {
            return fallback_analysis(topic, sources);
        }

        let parsed = parse_analysis(&content);
        Analysis {
            summary: parsed.summary,
            key_stats: parsed.key_stats,
            insight: parsed.insight,
            breaking: parsed.breaking,
            sources,
        }
    }
}

pub fn fallback_analysis(topic: &str, sources: Vec<Source>) -> Analysis {
    Analysis {
        summary: format!("Research on {topic} is being processed."),
        sources,
        ..Default::default()
    }
}
