use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A short-code mapping from the `links` table.
///
/// Records are append-only: once written, neither the code nor the target
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LinkRecord {
    pub code: String,
    pub target_url: String,
    pub created_at: NaiveDateTime,
    /// `None` means the link never expires. Nothing on the create path sets
    /// this yet.
    pub expires_at: Option<NaiveDateTime>,
}

impl LinkRecord {
    /// A fresh, non-expiring record stamped with the current UTC time.
    pub fn new(code: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            target_url: target_url.into(),
            created_at: chrono::Utc::now().naive_utc(),
            expires_at: None,
        }
    }

    /// Whether the record can still be resolved at `now`.
    pub fn is_live_at(&self, now: NaiveDateTime) -> bool {
        self.expires_at.map_or(true, |expires_at| expires_at > now)
    }

    pub fn is_live(&self) -> bool {
        self.is_live_at(chrono::Utc::now().naive_utc())
    }
}

// ── API payloads ───────────────────────────────────────────────────────────

/// Body of `POST /api/shorten`.
#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
}

/// Body returned by `POST /api/shorten`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub original_url: String,
}

/// Body returned by `GET /`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
    pub links_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn records_without_expiry_are_always_live() {
        let record = LinkRecord::new("abc123", "https://example.com");
        let far_future = record.created_at + Duration::days(365 * 100);
        assert!(record.is_live_at(far_future));
    }

    #[test]
    fn records_stop_being_live_at_expiry() {
        let mut record = LinkRecord::new("abc123", "https://example.com");
        let expiry = record.created_at + Duration::hours(1);
        record.expires_at = Some(expiry);

        assert!(record.is_live_at(expiry - Duration::seconds(1)));
        assert!(!record.is_live_at(expiry));
    }
}
