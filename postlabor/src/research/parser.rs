use serde::Deserialize;

/// Fields the model is asked to return. Everything is optional so partial
/// answers still parse.
#[derive(Debug, Default, Deserialize, PartialEq)]
struct RawAnalysis {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    key_stats: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    insight: Option<String>,
    #[serde(default)]
    breaking: Option<bool>,
}

/// Model output reduced to the fields the pipeline uses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedAnalysis {
    pub summary: String,
    pub key_stats: Vec<String>,
    pub insight: String,
    pub breaking: bool,
}

/// Remove a ```` ```json ```` or bare ```` ``` ```` fence, keeping only the
/// first fenced block.
pub fn strip_code_fence(content: &str) -> &str {
    let inner = if let Some((_, rest)) = content.split_once("```json") {
        rest
    } else if let Some((_, rest)) = content.split_once("```") {
        rest
    } else {
        return content.trim();
    };

    inner.split("```").next().unwrap_or(inner).trim()
}

/// Parse a model response. Malformed JSON becomes a summary made of the
/// raw text with empty stats and insight.
pub fn parse_analysis(content: &str) -> ParsedAnalysis {
    match serde_json::from_str::<RawAnalysis>(strip_code_fence(content)) {
        Ok(raw) => ParsedAnalysis {
            summary: raw.summary.unwrap_or_default(),
            key_stats: raw
                .key_stats
                .unwrap_or_default()
                .into_iter()
                .filter_map(|v| match v {
                    serde_json::Value::String(s) => Some(s),
                    serde_json::Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
            insight: raw.insight.unwrap_or_default(),
            breaking: raw.breaking.unwrap_or(false),
        },
        Err(e) => {
            tracing::debug!(error = %e, "Model response is not valid JSON, keeping raw text");
            ParsedAnalysis {
                summary: content.to_string(),
                ..Default::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BODY: &str = r#"{"summary": "Layoffs rose.", "key_stats": ["40,000 jobs", "12%", 3], "insight": "Acceleration"}"#;

    #[test]
    fn parses_plain_json() {
        let parsed = parse_analysis(BODY);
        assert_eq!(parsed.summary, "Layoffs rose.");
        assert_eq!(parsed.key_stats, vec!["40,000 jobs", "12%", "3"]);
        assert_eq!(parsed.insight, "Acceleration");
        assert!(!parsed.breaking);
    }

    #[test]
    fn parses_bare_fenced_block() {
        let parsed = parse_analysis(&format!("Here you go:\n```\n{BODY}\n```\nThanks"));
        assert_eq!(parsed.summary, "Layoffs rose.");
    }

    #[test]
    fn parses_json_tagged_fence() {
        let parsed = parse_analysis(&format!("```json\n{BODY}\n```"));
        assert_eq!(parsed.insight, "Acceleration");
        assert_eq!(parsed.key_stats.len(), 3);
    }

    #[test]
    fn malformed_json_falls_back_to_raw_text() {
        let raw = "```json\n{\"summary\": \"cut off";
        let parsed = parse_analysis(raw);
        assert_eq!(parsed.summary, raw);
        assert!(parsed.key_stats.is_empty());
        assert!(parsed.insight.is_empty());
    }

    #[test]
    fn news_fields() {
        let parsed = parse_analysis(r#"{"summary": "", "key_stats": [], "breaking": false}"#);
        assert!(parsed.summary.is_empty());
        assert!(!parsed.breaking);

        let parsed = parse_analysis(r#"{"summary": "Big", "breaking": true}"#);
        assert!(parsed.breaking);
        assert!(parsed.key_stats.is_empty());
    }

    #[test]
    fn strip_code_fence_without_fence_trims() {
        assert_eq!(strip_code_fence("  {} \n"), "{}");
    }
}
