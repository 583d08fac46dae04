pub mod analysis;
pub mod freshness;
pub mod orchestrator;
pub mod parser;
pub mod selector;
pub mod similarity;
pub mod topics;

pub use analysis::Summarizer;
pub use freshness::FreshnessOracle;
pub use orchestrator::{Collaborators, ResearchOrchestrator};
pub use selector::TopicSelector;
pub use similarity::{KeywordOverlapSimilarity, SubstringSimilarity, TopicSimilarity};
