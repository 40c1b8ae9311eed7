//! Database operations for Skymirror
//!
//! History only: every successful mirrored publish is recorded here for
//! inspection. The dedup decision itself never consults the database; that is
//! the seen-log's job.

use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::path::Path;

use crate::error::Result;
use crate::types::MirrorRecord;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    pub async fn new(db_path: &str) -> Result<Self> {
        // Expand path and create parent directories
        let expanded_path = shellexpand::tilde(db_path).to_string();
        let path = Path::new(&expanded_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(crate::error::DbError::IoError)?;
        }

        // Use forward slashes for SQLite URL (works on both Windows and Unix)
        // Use mode=rwc to allow creating the database file if it doesn't exist
        let db_url = format!("sqlite://{}?mode=rwc", expanded_path.replace('\\', "/"));

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(crate::error::DbError::SqlxError)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(crate::error::DbError::MigrationError)?;

        Ok(Self { pool })
    }

    /// Record a successfully mirrored publish
    pub async fn record_mirror(&self, record: &MirrorRecord) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO mirror_records
                (identifier, content, source, platform, platform_post_id, published_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.identifier)
        .bind(&record.content)
        .bind(&record.source)
        .bind(&record.platform)
        .bind(&record.platform_post_id)
        .bind(record.published_at)
        .execute(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(result.last_insert_rowid())
    }

    /// Most recent records, newest first
    pub async fn recent_records(&self, limit: i64) -> Result<Vec<MirrorRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, identifier, content, source, platform, platform_post_id, published_at
            FROM mirror_records
            ORDER BY published_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(rows
            .into_iter()
            .map(|r| MirrorRecord {
                id: r.get("id"),
                identifier: r.get("identifier"),
                content: r.get("content"),
                source: r.get("source"),
                platform: r.get("platform"),
                platform_post_id: r.get("platform_post_id"),
                published_at: r.get("published_at"),
            })
            .collect())
    }

    /// Total number of mirrored publishes recorded
    pub async fn record_count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM mirror_records")
            .fetch_one(&self.pool)
            .await
            .map_err(crate::error::DbError::SqlxError)?;

        Ok(row.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        // In-memory database, same migrations as the file-backed path
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        Database { pool }
    }

    fn sample_record(identifier: &str, published_at: i64) -> MirrorRecord {
        MirrorRecord {
            id: None,
            identifier: identifier.to_string(),
            content: format!("content for {}", identifier),
            source: "https://bsky.app/profile/alice.example".to_string(),
            platform: "bluesky".to_string(),
            platform_post_id: Some("at://did:plc:abc/app.bsky.feed.post/1".to_string()),
            published_at,
        }
    }

    #[tokio::test]
    async fn test_record_and_count() {
        let db = test_db().await;
        assert_eq!(db.record_count().await.unwrap(), 0);

        let id = db.record_mirror(&sample_record("aaa", 100)).await.unwrap();
        assert!(id > 0);
        assert_eq!(db.record_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_recent_records_newest_first() {
        let db = test_db().await;
        db.record_mirror(&sample_record("older", 100)).await.unwrap();
        db.record_mirror(&sample_record("newer", 200)).await.unwrap();

        let records = db.recent_records(10).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identifier, "newer");
        assert_eq!(records[1].identifier, "older");
    }

    #[tokio::test]
    async fn test_recent_records_respects_limit() {
        let db = test_db().await;
        for i in 0..5 {
            db.record_mirror(&sample_record(&format!("id-{}", i), i))
                .await
                .unwrap();
        }

        let records = db.recent_records(2).await.unwrap();
        assert_eq!(records.len(), 2);
    }
}
