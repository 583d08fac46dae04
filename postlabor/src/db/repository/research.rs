use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{params, Connection};

use crate::error::Result;
use crate::models::{NewResearchRecord, ResearchRecord, TopicHistoryEntry};

const COLUMNS: &str =
    "id, topic, summary, sources, key_stats, image_url, image_data, image_prompt, created_at";

/// Fixed-width RFC 3339 so lexical order in SQLite matches time order.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

pub struct ResearchRepository;

impl ResearchRepository {
    pub async fn create(conn: &Connection, record: &NewResearchRecord) -> Result<ResearchRecord> {
        let now = format_timestamp(Utc::now());

        // created_at never goes backwards relative to the newest stored row,
        // even if the wall clock does.
        let mut rows = conn
            .query(
                r#"
                INSERT INTO research_updates (
                    topic, summary, sources, key_stats, image_url, image_data, image_prompt, created_at
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                    MAX(?8, COALESCE((SELECT MAX(created_at) FROM research_updates), ?8))
                )
                RETURNING id, created_at
                "#,
                params![
                    record.topic.trim().to_string(),
                    record.summary.clone(),
                    serde_json::to_string(&record.sources)?,
                    serde_json::to_string(&record.key_stats)?,
                    record.image_url.clone(),
                    record.image_data.clone(),
                    record.image_prompt.clone(),
                    now,
                ],
            )
            .await?;

        let row = rows.next().await?.ok_or_else(|| {
            crate::error::PostlaborError::Internal("Insert returned no row".to_string())
        })?;

        Ok(ResearchRecord {
            id: row.get(0)?,
            topic: record.topic.trim().to_string(),
            summary: record.summary.clone(),
            sources: record.sources.clone(),
            key_stats: record.key_stats.clone(),
            image_url: record.image_url.clone(),
            image_data: record.image_data.clone(),
            image_prompt: record.image_prompt.clone(),
            created_at: parse_timestamp(&row.get::<String>(1)?),
        })
    }

    pub async fn get_by_id(conn: &Connection, id: i64) -> Result<Option<ResearchRecord>> {
        let sql = format!("SELECT {COLUMNS} FROM research_updates WHERE id = ?1");
        let mut rows = conn.query(&sql, params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_record(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn get_latest(
        conn: &Connection,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ResearchRecord>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM research_updates ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2"
        );
        let rows = conn.query(&sql, params![limit, offset]).await?;
        Self::collect(rows).await
    }

    pub async fn find_by_topic(
        conn: &Connection,
        topic: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Option<ResearchRecord>> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Ok(None);
        }

        let sql = format!(
            r#"
            SELECT {COLUMNS} FROM research_updates
            WHERE (instr(lower(topic), lower(?1)) > 0 OR instr(lower(?1), lower(topic)) > 0)
              AND (?2 IS NULL OR created_at > ?2)
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#
        );
        let mut rows = conn
            .query(&sql, params![topic, since.map(format_timestamp)])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_record(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn get_since(conn: &Connection, cutoff: DateTime<Utc>) -> Result<Vec<ResearchRecord>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM research_updates WHERE created_at > ?1 ORDER BY created_at DESC, id DESC"
        );
        let rows = conn.query(&sql, params![format_timestamp(cutoff)]).await?;
        Self::collect(rows).await
    }

    /// Exact (case-insensitive) topic recency check.
    pub async fn topic_exists_since(
        conn: &Connection,
        topic: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<bool> {
        let mut rows = conn
            .query(
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM research_updates
                    WHERE lower(topic) = lower(?1) AND created_at > ?2
                )
                "#,
                params![topic.trim(), format_timestamp(cutoff)],
            )
            .await?;

        Ok(match rows.next().await? {
            Some(row) => row.get::<i64>(0)? != 0,
            None => false,
        })
    }

    pub async fn list_topics(conn: &Connection) -> Result<Vec<TopicHistoryEntry>> {
        let mut rows = conn
            .query(
                r#"
                SELECT topic, MAX(created_at) AS last_researched, COUNT(*) AS runs
                FROM research_updates
                GROUP BY topic
                ORDER BY last_researched DESC
                "#,
                (),
            )
            .await?;

        let mut topics = Vec::new();
        while let Some(row) = rows.next().await? {
            topics.push(TopicHistoryEntry {
                topic: row.get(0)?,
                last_researched: parse_timestamp(&row.get::<String>(1)?),
                count: row.get::<i64>(2)?.max(0) as u32,
            });
        }
        Ok(topics)
    }

    pub async fn delete_oldest_beyond(conn: &Connection, keep_count: u32) -> Result<u64> {
        let deleted = conn
            .execute(
                r#"
                DELETE FROM research_updates
                WHERE id NOT IN (
                    SELECT id FROM research_updates
                    ORDER BY created_at DESC, id DESC
                    LIMIT ?1
                )
                "#,
                params![keep_count],
            )
            .await?;

        Ok(deleted)
    }

    pub async fn delete_all(conn: &Connection) -> Result<u64> {
        Ok(conn.execute("DELETE FROM research_updates", ()).await?)
    }

    pub async fn count(conn: &Connection) -> Result<u64> {
        let mut rows = conn
            .query("SELECT COUNT(*) FROM research_updates", ())
            .await?;

        Ok(match rows.next().await? {
            Some(row) => row.get::<i64>(0)?.max(0) as u64,
            None => 0,
        })
    }

    async fn collect(mut rows: libsql::Rows) -> Result<Vec<ResearchRecord>> {
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(Self::row_to_record(&row)?);
        }
        Ok(records)
    }

    fn row_to_record(row: &libsql::Row) -> Result<ResearchRecord> {
        let id: i64 = row.get(0)?;
        let sources = serde_json::from_str(&row.get::<String>(3)?).unwrap_or_else(|e| {
            tracing::warn!(id, error = %e, "Stored sources are not valid JSON");
            Vec::new()
        });
        let key_stats = serde_json::from_str(&row.get::<String>(4)?).unwrap_or_else(|e| {
            tracing::warn!(id, error = %e, "Stored key_stats are not valid JSON");
            Vec::new()
        });

        Ok(ResearchRecord {
            id,
            topic: row.get(1)?,
            summary: row.get(2)?,
            sources,
            key_stats,
            image_url: row.get(5)?,
            image_data: row.get(6)?,
            image_prompt: row.get(7)?,
            created_at: parse_timestamp(&row.get::<String>(8)?),
        })
    }
}
