mod tavily;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::SearchResult;

pub use tavily::TavilyClient;

/// Web search collaborator. Results come back in provider rank order.
#[async_trait]
pub trait WebSearcher: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchResult>>;
}
