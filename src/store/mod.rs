//! The mapping store: sole owner of every [`LinkRecord`].
//!
//! All mutation goes through [`LinkStore::put_if_absent`]. There is no update
//! and no delete, so a code that has been handed out keeps pointing at the
//! same target for as long as the record is live.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::{
    config::{AppConfig, StoreBackend},
    models::LinkRecord,
};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No live record exists for the requested code.
    #[error("no live link for the requested code")]
    NotFound,

    /// The backing store could not complete the read or write. Nothing was
    /// committed.
    #[error("store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Insert a record for `code` unless one already exists, as a single
    /// atomic step. Returns `Ok(true)` if this call created the record and
    /// `Ok(false)` if the code was already taken; an existing record is never
    /// touched. `Err` means nothing was written and says nothing about
    /// whether the code is taken.
    async fn put_if_absent(&self, code: &str, target_url: &str) -> Result<bool, StoreError>;

    /// Fetch the live record for `code`, or [`StoreError::NotFound`].
    async fn get(&self, code: &str) -> Result<LinkRecord, StoreError>;

    /// Number of live records.
    async fn count(&self) -> Result<u64, StoreError>;

    /// Release backing resources. Called once at shutdown.
    async fn close(&self) {}
}

/// Open the backend selected by `config`. Durable backends are migrated and
/// ready to serve when this returns.
pub async fn open(config: &AppConfig) -> anyhow::Result<Arc<dyn LinkStore>> {
    match config.store_backend {
        StoreBackend::Sqlite => {
            let store =
                SqliteStore::connect(&config.database_url, config.database_max_connections)
                    .await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; links will be lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
