use super::{LinkStore, StoreError};
use crate::{cache::LinkCache, models::LinkRecord};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use std::time::Duration;

/// Durable store backed by a SQLite file, fronted by a read-through
/// [`LinkCache`].
///
/// Reservation is a single `INSERT .. ON CONFLICT DO NOTHING`, so the primary
/// key decides which of several concurrent writers wins, including writers
/// in other processes sharing the file.
pub struct SqliteStore {
    pool: SqlitePool,
    cache: LinkCache,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `database_url`, e.g.
    /// `"sqlite:./microlink.db"`.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = database_url
            .parse::<SqliteConnectOptions>()
            .with_context(|| format!("invalid DATABASE_URL '{database_url}'"))?;
        Self::connect_with(options, max_connections).await
    }

    /// Open with explicit connect options, run migrations and warm the cache.
    pub async fn connect_with(
        options: SqliteConnectOptions,
        max_connections: u32,
    ) -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(
                options
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .busy_timeout(Duration::from_secs(5)),
            )
            .await
            .context("failed to open SQLite database")?;

        // Run embedded migrations (files in migrations/)
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to apply database migrations")?;
        tracing::info!("Database migrations applied");

        let store = Self {
            pool,
            cache: LinkCache::new(),
        };
        store.warm_cache().await?;
        Ok(store)
    }

    /// Load every live link into the in-memory cache.
    async fn warm_cache(&self) -> Result<(), StoreError> {
        let links: Vec<LinkRecord> = sqlx::query_as(
            "SELECT code, target_url, created_at, expires_at
             FROM links
             WHERE expires_at IS NULL OR expires_at > ?1",
        )
        .bind(now())
        .fetch_all(&self.pool)
        .await?;

        for link in links {
            self.cache.insert(link);
        }

        tracing::info!("Cache warmed with {} live link(s)", self.cache.len());
        Ok(())
    }
}

#[async_trait]
impl LinkStore for SqliteStore {
    async fn put_if_absent(&self, code: &str, target_url: &str) -> Result<bool, StoreError> {
        let record = LinkRecord::new(code, target_url);

        let result = sqlx::query(
            "INSERT INTO links (code, target_url, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(code) DO NOTHING",
        )
        .bind(&record.code)
        .bind(&record.target_url)
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("DB error reserving short code '{}': {:?}", code, e);
            StoreError::Unavailable(e)
        })?;

        // Only a committed row may enter the cache.
        let inserted = result.rows_affected() == 1;
        if inserted {
            self.cache.insert(record);
        }
        Ok(inserted)
    }

    async fn get(&self, code: &str) -> Result<LinkRecord, StoreError> {
        if let Some(record) = self.cache.get(code) {
            return Ok(record);
        }

        // Cache miss: the row may have been written by another process.
        let record: Option<LinkRecord> = sqlx::query_as(
            "SELECT code, target_url, created_at, expires_at
             FROM links WHERE code = ?1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("DB error looking up short code '{}': {:?}", code, e);
            StoreError::Unavailable(e)
        })?;

        match record {
            Some(record) if record.is_live() => {
                self.cache.insert(record.clone());
                Ok(record)
            }
            _ => Err(StoreError::NotFound),
        }
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM links WHERE expires_at IS NULL OR expires_at > ?1",
        )
        .bind(now())
        .fetch_one(&self.pool)
        .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}

fn now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}
