//! Prompt templates for the research pipeline.
//!
//! Templates use plain `format!()` interpolation so a missing variable is a
//! compile-time error.

use crate::models::{ResearchMode, SearchResult};

/// System instructions for the summarization step.
pub fn analysis_system_prompt(mode: ResearchMode) -> &'static str {
    match mode {
        ResearchMode::Standard => {
            "You are a research analyst specializing in post-labor economics, AI automation, \
             and the future of work. Always respond with valid JSON."
        }
        ResearchMode::News => {
            "You are a news analyst tracking AI-driven job displacement, automation policy \
             and post-labor economics. Only report genuinely new developments. Always respond \
             with valid JSON."
        }
    }
}

/// Render search results as a numbered list, each content excerpt cut to
/// `truncate_chars` characters and followed by `...`.
///
/// # Example
/// ```
/// use postlabor::llm::prompts::format_search_results;
/// use postlabor::models::SearchResult;
///
/// let results = vec![SearchResult::new("Title", "https://a.example", "abcdef")];
/// let text = format_search_results(&results, 3);
/// assert!(text.contains("Content: abc..."));
/// ```
pub fn format_search_results(results: &[SearchResult], truncate_chars: usize) -> String {
    let mut text = String::new();
    for (i, result) in results.iter().enumerate() {
        let excerpt: String = result.content.chars().take(truncate_chars).collect();
        text.push_str(&format!(
            "\n{}. Title: {}\n   URL: {}\n   Content: {}...\n",
            i + 1,
            or_na(&result.title),
            or_na(&result.url),
            excerpt
        ));
    }
    text
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

/// User prompt for the summarization step.
pub fn analysis_prompt(topic: &str, results_text: &str, mode: ResearchMode) -> String {
    match mode {
        ResearchMode::Standard => format!(
            r#"You are a Post-Labor Economics Research Analyst. Analyze the following search results about "{topic}" and provide:

1. A comprehensive 2-3 paragraph SUMMARY of the key findings
2. A list of 3-5 KEY STATISTICS (specific numbers, percentages, dates)
3. The most important INSIGHT or trend

Search Results:
{results_text}

Respond in this exact JSON format:
{{
    "summary": "Your 2-3 paragraph summary here...",
    "key_stats": ["Statistic 1", "Statistic 2", "Statistic 3"],
    "insight": "The main insight or trend"
}}

Focus on recent data only. Be factual and cite specific numbers."#
        ),
        ResearchMode::News => format!(
            r#"You are monitoring breaking developments for the query "{topic}". Read the search results below and decide whether they contain a significant new development about AI, automation, jobs or post-labor economics.

Search Results:
{results_text}

Respond in this exact JSON format:
{{
    "summary": "A 1-2 paragraph summary of the development, or an empty string if nothing significant happened",
    "key_stats": ["Statistic 1", "Statistic 2", "Statistic 3"],
    "breaking": true
}}

Set "breaking" to false and leave "summary" empty when the results only repeat known or minor news. Cite specific numbers, companies and dates."#
        ),
    }
}

pub const IMAGE_PROMPT_SYSTEM: &str =
    "You are an expert at creating evocative image generation prompts. Return only the prompt.";

/// Characters of the summary quoted in the image prompt request.
const IMAGE_CONTEXT_CHARS: usize = 300;

/// Ask the model for a short, abstract image prompt for a research topic,
/// grounded in what the summary found when there is one.
pub fn image_prompt_request(topic: &str, summary: &str) -> String {
    let context: String = summary.trim().chars().take(IMAGE_CONTEXT_CHARS).collect();
    let findings = if context.is_empty() {
        String::new()
    } else {
        format!("\nKey findings: \"{context}\"\n")
    };

    format!(
        r#"Create a short image generation prompt (max 200 chars) for this research topic: "{topic}"
{findings}
The image should be:
- Abstract and cinematic, NOT literal
- Futuristic, ethereal atmosphere
- Dark moody background with glowing accents
- No text, no words, no letters
- Style: digital art, volumetric lighting, atmospheric

Return ONLY the prompt, nothing else."#
    )
}

/// Used when the model produces no image prompt.
pub fn fallback_image_prompt(topic: &str) -> String {
    let head: String = topic.chars().take(50).collect();
    format!(
        "Abstract futuristic digital art representing {head}, dark moody atmosphere, \
         glowing blue and purple accents, volumetric lighting, cinematic, no text"
    )
}
