use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use postlabor::config::SearchConfig;
use postlabor::error::PostlaborError;
use postlabor::search::{TavilyClient, WebSearcher};

fn client_for(server: &MockServer) -> TavilyClient {
    let config = SearchConfig {
        api_key: Some("tvly-test".to_string()),
        base_url: server.uri(),
        timeout_secs: 5,
        max_results: 5,
        search_depth: "advanced".to_string(),
    };
    TavilyClient::new(&config).expect("client")
}

#[tokio::test]
async fn test_search_posts_query_and_maps_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_json(json!({
            "api_key": "tvly-test",
            "query": "AI layoffs today",
            "max_results": 3,
            "search_depth": "advanced"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "AI layoffs today",
            "results": [
                {
                    "title": "Layoffs tracker",
                    "url": "https://news.example/layoffs",
                    "content": "Another round of cuts.",
                    "score": 0.92,
                    "published_date": "2025-03-01"
                },
                {
                    "title": "Automation and hiring",
                    "url": "https://news.example/hiring",
                    "content": "Hiring is slowing."
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = client_for(&server)
        .search("AI layoffs today", 3)
        .await
        .expect("search should succeed");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Layoffs tracker");
    assert_eq!(results[0].url, "https://news.example/layoffs");
    assert_eq!(results[0].published_date.as_deref(), Some("2025-03-01"));
    assert_eq!(results[1].content, "Hiring is slowing.");
    assert_eq!(results[1].published_date, None);
}

#[tokio::test]
async fn test_empty_result_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;

    let results = client_for(&server).search("robot tax", 5).await.unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn test_http_error_is_search_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(432).set_body_string("plan limit reached"))
        .mount(&server)
        .await;

    let result = client_for(&server).search("robot tax", 5).await;

    match result {
        Err(PostlaborError::Search(message)) => assert!(message.contains("432")),
        other => panic!("Expected Search error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_search_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client_for(&server).search("robot tax", 5).await;

    assert!(matches!(result, Err(PostlaborError::Search(_))));
}

#[tokio::test]
async fn test_missing_key_never_calls_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = TavilyClient::new(&SearchConfig {
        base_url: server.uri(),
        ..SearchConfig::default()
    })
    .unwrap();

    let result = client.search("robot tax", 5).await;

    assert!(matches!(result, Err(PostlaborError::SearchUnavailable(_))));
    assert!(!client.is_available());
}
