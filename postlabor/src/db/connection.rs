use libsql::{Builder, Connection};
use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::error::Result;

use super::schema;

/// SQLite tuning applied once when the database is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Pragmas {
    busy_timeout_ms: u64,
    journal_mode: &'static str,
    synchronous: &'static str,
}

impl Pragmas {
    fn from_env() -> Self {
        Self {
            busy_timeout_ms: std::env::var("DATABASE_BUSY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5000),
            journal_mode: normalize_journal_mode(
                &std::env::var("DATABASE_JOURNAL_MODE").unwrap_or_else(|_| "WAL".to_string()),
            ),
            synchronous: normalize_synchronous(
                &std::env::var("DATABASE_SYNCHRONOUS").unwrap_or_else(|_| "NORMAL".to_string()),
            ),
        }
    }

    fn statements(&self) -> [(&'static str, String); 3] {
        [
            (
                "busy_timeout",
                format!("PRAGMA busy_timeout = {}", self.busy_timeout_ms),
            ),
            (
                "journal_mode",
                format!("PRAGMA journal_mode = {}", self.journal_mode),
            ),
            (
                "synchronous",
                format!("PRAGMA synchronous = {}", self.synchronous),
            ),
        ]
    }
}

/// Handle to the research database. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    db: Arc<libsql::Database>,
    pragmas: Pragmas,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let db = if config.url.starts_with("libsql://") || config.url.starts_with("https://") {
            let token = config.auth_token.clone().unwrap_or_default();
            match config.local_path {
                Some(ref local_path) => {
                    Builder::new_remote_replica(local_path, config.url.clone(), token)
                        .build()
                        .await?
                }
                None => Builder::new_remote(config.url.clone(), token).build().await?,
            }
        } else {
            let path = config.url.strip_prefix("file:").unwrap_or(&config.url);
            Builder::new_local(path).build().await?
        };

        let database = Self {
            db: Arc::new(db),
            pragmas: Pragmas::from_env(),
        };
        database.configure().await?;

        let conn = database.connect()?;
        schema::init_schema(&conn).await?;

        tracing::info!(url = %redact_url(&config.url), "Research database ready");
        Ok(database)
    }

    pub fn connect(&self) -> Result<Connection> {
        Ok(self.db.connect()?)
    }

    async fn configure(&self) -> Result<()> {
        let conn = self.connect()?;

        for (name, sql) in self.pragmas.statements() {
            if let Err(error) = conn.execute_batch(&sql).await {
                tracing::warn!(pragma = name, error = %error, "Failed to apply SQLite pragma");
            }
        }

        Ok(())
    }

    pub async fn sync(&self) -> Result<()> {
        if let Ok(sync) = self.db.sync().await {
            tracing::info!("Database synced: {:?}", sync);
        }
        Ok(())
    }
}

fn normalize_journal_mode(value: &str) -> &'static str {
    match value.trim().to_uppercase().as_str() {
        "DELETE" => "DELETE",
        "TRUNCATE" => "TRUNCATE",
        "PERSIST" => "PERSIST",
        "MEMORY" => "MEMORY",
        "OFF" => "OFF",
        _ => "WAL",
    }
}

fn normalize_synchronous(value: &str) -> &'static str {
    match value.trim().to_uppercase().as_str() {
        "OFF" => "OFF",
        "FULL" => "FULL",
        "EXTRA" => "EXTRA",
        _ => "NORMAL",
    }
}

/// Strip query strings so tokens passed as URL parameters never reach logs.
fn redact_url(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
