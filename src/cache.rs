use crate::models::LinkRecord;
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe in-memory cache mapping short_code -> LinkRecord.
///
/// Backed by a DashMap so reads are concurrent and mostly lock-free. Records
/// are immutable once written, so an entry can never go stale; the only
/// reason to drop one is expiry. The cache is warmed on startup from the
/// database and filled after every committed insert. Misses are never
/// cached, so a code reserved by another process is still found in the
/// database.
#[derive(Clone, Debug, Default)]
pub struct LinkCache {
    inner: Arc<DashMap<String, LinkRecord>>,
}

impl LinkCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache a committed record.
    pub fn insert(&self, record: LinkRecord) {
        self.inner.insert(record.code.clone(), record);
    }

    /// Look up a short code. Returns a clone of the record if present and
    /// still live; an expired entry is evicted on the way out.
    pub fn get(&self, code: &str) -> Option<LinkRecord> {
        let record = self.inner.get(code).map(|r| r.clone())?;
        if record.is_live() {
            Some(record)
        } else {
            self.inner.remove(code);
            None
        }
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn returns_inserted_records() {
        let cache = LinkCache::new();
        cache.insert(LinkRecord::new("aZ3xQ9", "https://example.com/a"));

        let hit = cache.get("aZ3xQ9").expect("cached record");
        assert_eq!(hit.target_url, "https://example.com/a");
        assert!(cache.get("zzzzzz").is_none());
    }

    #[test]
    fn evicts_expired_records_on_read() {
        let cache = LinkCache::new();
        let mut record = LinkRecord::new("old123", "https://example.com/old");
        record.expires_at = Some(record.created_at - Duration::minutes(1));
        cache.insert(record);
        assert_eq!(cache.len(), 1);

        assert!(cache.get("old123").is_none());
        assert_eq!(cache.len(), 0);
    }
}
