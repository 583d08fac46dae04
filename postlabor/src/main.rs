use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postlabor::api::{create_router, AppState};
use postlabor::config::Config;
use postlabor::db::{Database, DatabaseBackend, LibSqlBackend, ResearchStore};
use postlabor::illustration::{ImageApiClient, ImageGenerator};
use postlabor::llm::{LlmProvider, TextGenerator};
use postlabor::research::{Collaborators, ResearchOrchestrator};
use postlabor::search::{TavilyClient, WebSearcher};
use postlabor::services::ResearchScheduler;

#[derive(Parser)]
#[command(name = "postlabor")]
#[command(about = "Research agent tracking post-labor economics")]
struct Args {
    /// Run one scheduled batch, then exit without starting the server
    #[arg(long)]
    once: bool,

    /// Serve the API without the periodic research loop
    #[arg(long)]
    no_scheduler: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    init_tracing();

    let config = Arc::new(Config::from_env());

    if config.server.api_keys.is_empty() {
        tracing::warn!(
            "POSTLABOR_API_KEYS is not set - research triggers and admin routes are open to anyone who can reach the server"
        );
    }

    tracing::info!("Initializing database...");
    let raw_db = Database::new(&config.database).await?;
    let backend = Arc::new(LibSqlBackend::new(raw_db));
    let store: Arc<dyn ResearchStore> = backend.clone();
    let db: Arc<dyn DatabaseBackend> = backend.clone();

    if let Some(llm_config) = &config.llm {
        tracing::info!("Initializing LLM provider: {}...", llm_config.model);
    }
    let llm = LlmProvider::new(config.llm.as_ref());
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - summaries will fall back to placeholders");
    }

    let searcher = TavilyClient::new(&config.search)?;
    if !searcher.is_available() {
        tracing::warn!("TAVILY_API_KEY is not set - every topic will report no results");
    }

    let images: Option<Arc<dyn ImageGenerator>> = if config.image.enabled {
        let client = ImageApiClient::new(&config.image)?;
        if client.is_available() {
            tracing::info!("Image generation enabled: {}", config.image.model);
            Some(Arc::new(client))
        } else {
            tracing::warn!("No image API key - illustrations disabled");
            None
        }
    } else {
        None
    };

    let text: Arc<dyn TextGenerator> = Arc::new(llm.clone());
    let searcher: Arc<dyn WebSearcher> = Arc::new(searcher);
    let orchestrator = Arc::new(ResearchOrchestrator::new(
        &config,
        Collaborators {
            store,
            searcher,
            text,
            images,
        },
    ));

    let scheduler = ResearchScheduler::new(
        orchestrator.clone(),
        db,
        config.research.schedule_interval_secs,
    );

    if args.once {
        let summary = scheduler.run_once().await?;
        tracing::info!(
            topics = summary.topics_researched,
            new = summary.new_results,
            cached = summary.cached_results,
            "Single run finished"
        );
        return Ok(());
    }

    let cancel_token = CancellationToken::new();

    if args.no_scheduler {
        tracing::info!("Periodic research disabled by --no-scheduler");
    } else {
        tracing::info!(
            "Starting research scheduler... (interval={}s, mode={})",
            scheduler.interval_secs(),
            config.research.mode
        );
        let token = cancel_token.child_token();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!("Research scheduler shutting down...");
                        break;
                    }
                    _ = tokio::time::sleep(tokio::time::Duration::from_secs(scheduler.interval_secs())) => {
                        if let Err(e) = scheduler.run_once().await {
                            tracing::error!("Research scheduler error: {}", e);
                        }
                    }
                }
            }
        });
    }

    let state = AppState::new(config.clone(), backend, llm, orchestrator);
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Postlabor starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "postlabor=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
