use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::models::ResearchMode;
use crate::research::topics::{DEFAULT_NEWS_QUERIES, DEFAULT_RESEARCH_TOPICS};

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

/// Like [`parse_env_or`], but zero is rejected as well.
fn parse_env_nonzero(var: &str, default: u64) -> u64 {
    match parse_env_or(var, default) {
        0 => {
            tracing::warn!("{} must be greater than zero. Using default {}.", var, default);
            default
        }
        value => value,
    }
}

/// Parse a `|`-separated topic list, e.g.
/// `RESEARCH_TOPICS="AI job automation statistics|robot taxation policy"`.
/// Falls back to `default` when unset or when every entry is blank.
fn parse_topic_list(var: &str, default: &[&str]) -> Vec<String> {
    let parsed: Vec<String> = match env::var(var) {
        Ok(val) => val
            .split('|')
            .map(|topic| topic.trim().to_string())
            .filter(|topic| !topic.is_empty())
            .collect(),
        Err(_) => Vec::new(),
    };

    if parsed.is_empty() {
        default.iter().map(|topic| topic.to_string()).collect()
    } else {
        parsed
    }
}

/// First non-empty value among the given env vars.
fn first_env(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|var| env::var(var).ok())
        .find(|val| !val.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: Option<LlmConfig>,
    pub search: SearchConfig,
    pub image: ImageConfig,
    pub research: ResearchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
}

/// LLM configuration for chat/completion models
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
}

/// Tavily web search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_results: u32,
    pub search_depth: String,
}

/// Image synthesis configuration (OpenAI-compatible `/images/generations`)
#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    pub enabled: bool,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub size: String,
    pub quality: String,
    pub style: String,
    pub timeout_secs: u64,
    /// Download the generated image and persist the bytes instead of
    /// keeping only the provider's temporary URL.
    pub embed_bytes: bool,
    pub prompt_max_chars: usize,
}

/// Which topic-similarity heuristic the freshness oracle uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityKind {
    Substring,
    Keyword,
}

impl FromStr for SimilarityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "keyword" | "keywords" => Ok(Self::Keyword),
            other => Err(format!("unknown similarity strategy '{other}'")),
        }
    }
}

/// Research orchestration policy. Every window and threshold is
/// configuration rather than fixed behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct ResearchConfig {
    pub topics: Vec<String>,
    pub news_queries: Vec<String>,
    pub mode: ResearchMode,
    pub generate_images: bool,
    pub cache_hours: i64,
    pub freshness_window_hours: i64,
    pub min_new_urls: usize,
    pub freshness_history: u32,
    pub overlap_threshold: usize,
    pub similarity: SimilarityKind,
    pub content_truncate_chars: usize,
    pub analysis_max_tokens: u32,
    pub image_prompt_max_tokens: u32,
    /// Topics per scheduled batch picked by the fresh-topic selector.
    /// Zero runs the whole pool instead.
    pub selection_count: usize,
    pub selection_seed: Option<u64>,
    pub schedule_interval_secs: u64,
    pub retention_keep_count: u32,
}

impl ResearchConfig {
    /// Candidate pool for the given mode.
    pub fn pool(&self, mode: ResearchMode) -> &[String] {
        match mode {
            ResearchMode::Standard => &self.topics,
            ResearchMode::News => &self.news_queries,
        }
    }
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            topics: DEFAULT_RESEARCH_TOPICS.iter().map(|t| t.to_string()).collect(),
            news_queries: DEFAULT_NEWS_QUERIES.iter().map(|t| t.to_string()).collect(),
            mode: ResearchMode::Standard,
            generate_images: true,
            cache_hours: 12,
            freshness_window_hours: 48,
            min_new_urls: 2,
            freshness_history: 20,
            overlap_threshold: 2,
            similarity: SimilarityKind::Substring,
            content_truncate_chars: 500,
            analysis_max_tokens: 1000,
            image_prompt_max_tokens: 100,
            selection_count: 0,
            selection_seed: None,
            schedule_interval_secs: 6 * 3600,
            retention_keep_count: 100,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.tavily.com".to_string(),
            timeout_secs: 30,
            max_results: 5,
            search_depth: "basic".to_string(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "dall-e-3".to_string(),
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            size: "1792x1024".to_string(),
            quality: "standard".to_string(),
            style: "vivid".to_string(),
            timeout_secs: 120,
            embed_bytes: false,
            prompt_max_chars: 400,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let research_defaults = ResearchConfig::default();
        let search_defaults = SearchConfig::default();
        let image_defaults = ImageConfig::default();
        let openai_key = env::var("OPENAI_API_KEY").ok();

        Self {
            server: ServerConfig {
                host: env::var("POSTLABOR_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("POSTLABOR_PORT", 8000),
                api_keys: env::var("POSTLABOR_API_KEYS")
                    .map(|keys| {
                        keys.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:postlabor.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
            },
            llm: env::var("LLM_MODEL")
                .ok()
                .or_else(|| openai_key.as_ref().map(|_| "openai/gpt-4o-mini".to_string()))
                .map(|model| LlmConfig {
                    model,
                    api_key: first_env(&["LLM_API_KEY", "OPENAI_API_KEY"]),
                    base_url: env::var("LLM_BASE_URL").ok(),
                    timeout_secs: parse_env_or("LLM_TIMEOUT", 60),
                    temperature: parse_env_or("LLM_TEMPERATURE", 0.7),
                }),
            search: SearchConfig {
                api_key: first_env(&["TAVILY_API_KEY"]),
                base_url: env::var("TAVILY_BASE_URL").unwrap_or(search_defaults.base_url),
                timeout_secs: parse_env_or("SEARCH_TIMEOUT", search_defaults.timeout_secs),
                max_results: parse_env_or("SEARCH_MAX_RESULTS", search_defaults.max_results),
                search_depth: env::var("SEARCH_DEPTH").unwrap_or(search_defaults.search_depth),
            },
            image: ImageConfig {
                enabled: parse_env_or("IMAGE_GENERATION_ENABLED", image_defaults.enabled),
                model: env::var("IMAGE_MODEL").unwrap_or(image_defaults.model),
                api_key: first_env(&["IMAGE_API_KEY", "OPENAI_API_KEY"]),
                base_url: env::var("IMAGE_BASE_URL").unwrap_or(image_defaults.base_url),
                size: env::var("IMAGE_SIZE").unwrap_or(image_defaults.size),
                quality: env::var("IMAGE_QUALITY").unwrap_or(image_defaults.quality),
                style: env::var("IMAGE_STYLE").unwrap_or(image_defaults.style),
                timeout_secs: parse_env_or("IMAGE_TIMEOUT", image_defaults.timeout_secs),
                embed_bytes: parse_env_or("IMAGE_EMBED_BYTES", image_defaults.embed_bytes),
                prompt_max_chars: parse_env_or(
                    "IMAGE_PROMPT_MAX_CHARS",
                    image_defaults.prompt_max_chars,
                ),
            },
            research: ResearchConfig {
                topics: parse_topic_list("RESEARCH_TOPICS", DEFAULT_RESEARCH_TOPICS),
                news_queries: parse_topic_list("NEWS_QUERIES", DEFAULT_NEWS_QUERIES),
                mode: parse_env_or("RESEARCH_MODE", research_defaults.mode),
                generate_images: parse_env_or(
                    "RESEARCH_GENERATE_IMAGES",
                    research_defaults.generate_images,
                ),
                cache_hours: parse_env_or("RESEARCH_CACHE_HOURS", research_defaults.cache_hours),
                freshness_window_hours: parse_env_or(
                    "RESEARCH_FRESHNESS_WINDOW_HOURS",
                    research_defaults.freshness_window_hours,
                ),
                min_new_urls: parse_env_or("RESEARCH_MIN_NEW_URLS", research_defaults.min_new_urls),
                freshness_history: parse_env_or(
                    "RESEARCH_FRESHNESS_HISTORY",
                    research_defaults.freshness_history,
                ),
                overlap_threshold: parse_env_or(
                    "RESEARCH_OVERLAP_THRESHOLD",
                    research_defaults.overlap_threshold,
                ),
                similarity: parse_env_or("RESEARCH_SIMILARITY", research_defaults.similarity),
                content_truncate_chars: parse_env_or(
                    "RESEARCH_CONTENT_TRUNCATE_CHARS",
                    research_defaults.content_truncate_chars,
                ),
                analysis_max_tokens: parse_env_or(
                    "RESEARCH_ANALYSIS_MAX_TOKENS",
                    research_defaults.analysis_max_tokens,
                ),
                image_prompt_max_tokens: parse_env_or(
                    "RESEARCH_IMAGE_PROMPT_MAX_TOKENS",
                    research_defaults.image_prompt_max_tokens,
                ),
                selection_count: parse_env_or(
                    "RESEARCH_SELECTION_COUNT",
                    research_defaults.selection_count,
                ),
                selection_seed: parse_env_opt("RESEARCH_SELECTION_SEED"),
                schedule_interval_secs: parse_env_nonzero(
                    "RESEARCH_INTERVAL_SECS",
                    research_defaults.schedule_interval_secs,
                ),
                retention_keep_count: parse_env_or(
                    "RESEARCH_RETENTION_KEEP",
                    research_defaults.retention_keep_count,
                ),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}
