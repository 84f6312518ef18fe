use super::{LinkStore, StoreError};
use crate::models::LinkRecord;
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};

/// Non-durable store. The DashMap entry API holds the shard lock across the
/// presence check and the insert, so concurrent reservations of one code
/// cannot both win.
#[derive(Debug, Default)]
pub struct MemoryStore {
    links: DashMap<String, LinkRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn put_if_absent(&self, code: &str, target_url: &str) -> Result<bool, StoreError> {
        match self.links.entry(code.to_owned()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(LinkRecord::new(code, target_url));
                Ok(true)
            }
        }
    }

    async fn get(&self, code: &str) -> Result<LinkRecord, StoreError> {
        self.links
            .get(code)
            .filter(|record| record.is_live())
            .map(|record| record.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let live = self.links.iter().filter(|r| r.is_live()).count();
        Ok(live as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashSet, sync::Arc};

    #[tokio::test]
    async fn put_if_absent_refuses_taken_codes() {
        let store = MemoryStore::new();

        assert!(store.put_if_absent("aZ3xQ9", "https://a.example").await.unwrap());
        assert!(!store.put_if_absent("aZ3xQ9", "https://b.example").await.unwrap());

        let record = store.get("aZ3xQ9").await.unwrap();
        assert_eq!(record.target_url, "https://a.example");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn get_of_unknown_code_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get("zzzzzz").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn expired_records_are_hidden_but_keep_their_code() {
        let store = MemoryStore::new();
        let mut record = LinkRecord::new("gone01", "https://example.com/gone");
        record.expires_at = Some(record.created_at - chrono::Duration::seconds(1));
        store.links.insert(record.code.clone(), record);

        assert!(matches!(store.get("gone01").await, Err(StoreError::NotFound)));
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(!store.put_if_absent("gone01", "https://example.com/new").await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reservations_of_one_code_have_one_winner() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let url = format!("https://example.com/{i}");
                    let won = store.put_if_absent("same01", &url).await.unwrap();
                    (won, url)
                })
            })
            .collect();

        let mut winners = HashSet::new();
        for handle in handles {
            let (won, url) = handle.await.unwrap();
            if won {
                winners.insert(url);
            }
        }

        assert_eq!(winners.len(), 1);
        let stored = store.get("same01").await.unwrap();
        assert!(winners.contains(&stored.target_url));
    }
}
