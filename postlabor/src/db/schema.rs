use libsql::Connection;

use crate::error::Result;

pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Research records. AUTOINCREMENT keeps ids monotonic even after
        -- retention cleanup removes the newest-but-one rows.
        CREATE TABLE IF NOT EXISTS research_updates (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            topic TEXT NOT NULL,
            summary TEXT NOT NULL,
            sources TEXT NOT NULL DEFAULT '[]',
            key_stats TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_research_updates_created_at ON research_updates(created_at);
        CREATE INDEX IF NOT EXISTS idx_research_updates_topic ON research_updates(topic);
        "#,
    )
    .await?;

    migrate_image_columns(conn).await?;

    Ok(())
}

async fn column_exists(conn: &Connection, column: &str) -> Result<bool> {
    let exists = conn
        .query(
            "SELECT COUNT(*) FROM pragma_table_info('research_updates') WHERE name = ?1",
            [column],
        )
        .await?
        .next()
        .await?
        .map(|row| row.get::<i64>(0).unwrap_or(0) > 0)
        .unwrap_or(false);

    Ok(exists)
}

/// Databases created before illustrations existed lack the image columns.
async fn migrate_image_columns(conn: &Connection) -> Result<()> {
    for (column, ddl) in [
        (
            "image_url",
            "ALTER TABLE research_updates ADD COLUMN image_url TEXT",
        ),
        (
            "image_data",
            "ALTER TABLE research_updates ADD COLUMN image_data BLOB",
        ),
        (
            "image_prompt",
            "ALTER TABLE research_updates ADD COLUMN image_prompt TEXT",
        ),
    ] {
        if !column_exists(conn, column).await? {
            tracing::info!(column, "Migrating research_updates table: adding column");
            conn.execute(ddl, ()).await?;
        }
    }

    Ok(())
}
