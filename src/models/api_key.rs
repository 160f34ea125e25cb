//! API key model for authentication.
//!
//! API keys are the bearer credentials presented by management API clients.
//! The raw key is generated once, shown to its creator exactly once, and
//! stored only as a SHA-256 hash. A short clear-text prefix of the raw key
//! is kept so key listings stay recognizable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    /// Unique identifier for this API key
    pub id: Uuid,

    /// Organization that owns this key
    pub organization_id: Uuid,

    /// Human-readable label chosen at creation time
    pub name: String,

    /// SHA-256 hash of the raw key (64 hex characters)
    ///
    /// When a request comes in with "Bearer trig_...", the token is hashed
    /// and this column is matched. The raw key itself is never persisted.
    pub key_hash: String,

    /// First characters of the raw key, stored in clear for display
    pub key_prefix: String,

    /// Whether this key is currently active
    ///
    /// Revocation and expiry both flip this to false. Rows are never
    /// deleted, so usage history stays attributable.
    pub is_active: bool,

    /// Optional expiry. A key past this instant is auto-deactivated on its
    /// next use.
    pub expires_at: Option<DateTime<Utc>>,

    /// When the key last authenticated a request (best-effort bookkeeping)
    pub last_used_at: Option<DateTime<Utc>>,

    /// User that minted the key; NULL for keys minted outside a user
    /// session (e.g. the onboarding bootstrap)
    pub created_by: Option<Uuid>,

    /// Timestamp when this key was created
    pub created_at: DateTime<Utc>,
}

impl ApiKey {
    /// Whether the key carries an expiry that has already passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }

    /// A credential is usable iff it is active and not expired.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now)
    }
}

/// Request body for minting a new API key.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "CI integration",
///   "expiry_days": 90
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateApiKeyRequest {
    /// Label for the new key
    pub name: String,

    /// Days until expiry; omit or pass 0 for a non-expiring key
    #[serde(default)]
    pub expiry_days: i64,
}

/// Key metadata returned by list operations.
///
/// Never includes the hash or a raw key, only the display prefix.
#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub id: Uuid,
    pub name: String,
    pub key_prefix: String,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            name: key.name,
            key_prefix: key.key_prefix,
            is_active: key.is_active,
            expires_at: key.expires_at,
            last_used_at: key.last_used_at,
            created_at: key.created_at,
        }
    }
}

/// Response when minting a key: metadata plus the raw key, exactly once.
#[derive(Debug, Serialize)]
pub struct CreatedApiKeyResponse {
    #[serde(flatten)]
    pub key: ApiKeyResponse,

    /// Raw bearer key. This is the only response that ever contains it.
    pub api_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn key(is_active: bool, expires_at: Option<DateTime<Utc>>) -> ApiKey {
        ApiKey {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            name: "test".to_string(),
            key_hash: "0".repeat(64),
            key_prefix: "trig_00000".to_string(),
            is_active,
            expires_at,
            last_used_at: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_active_key_without_expiry_is_valid() {
        let now = Utc::now();
        assert!(key(true, None).is_valid(now));
    }

    #[test]
    fn test_inactive_key_is_invalid_regardless_of_expiry() {
        let now = Utc::now();
        assert!(!key(false, None).is_valid(now));
        assert!(!key(false, Some(now + Duration::days(30))).is_valid(now));
    }

    #[test]
    fn test_expired_key_is_invalid() {
        let now = Utc::now();
        let k = key(true, Some(now - Duration::seconds(1)));
        assert!(k.is_expired(now));
        assert!(!k.is_valid(now));
    }

    #[test]
    fn test_future_expiry_is_valid() {
        let now = Utc::now();
        assert!(key(true, Some(now + Duration::days(1))).is_valid(now));
    }
}
