//! API key service: credential hashing, minting, listing and revocation.
//!
//! Raw keys look like `trig_<64 hex chars>` (32 random bytes). Only the
//! SHA-256 hash of the raw key is ever stored; the raw key is returned to
//! the caller exactly once at mint time. A short prefix of the raw key is
//! kept in clear so key listings stay recognizable.

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::api_key::{ApiKey, CreateApiKeyRequest};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Fixed recognizable prefix carried by every raw key.
pub const KEY_PREFIX: &str = "trig_";

/// How many characters of the raw key are stored in clear for display.
const DISPLAY_PREFIX_LEN: usize = 10;

/// One-way transform of a raw bearer key into its storable fingerprint.
///
/// SHA-256 over the UTF-8 bytes, hex-encoded. Deterministic and unsalted;
/// uniqueness relies on the key's own 32 bytes of entropy.
pub fn hash_key(raw_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a fresh raw key: `trig_` + 32 random bytes hex-encoded.
pub fn generate_raw_key() -> String {
    let bytes: [u8; 32] = rand::random();
    format!("{}{}", KEY_PREFIX, hex::encode(bytes))
}

/// Display prefix of a raw key (first 10 characters).
pub fn display_prefix(raw_key: &str) -> &str {
    &raw_key[..DISPLAY_PREFIX_LEN]
}

/// Expiry instant for a requested lifetime; zero or negative days means a
/// non-expiring key.
fn expiry_from_days(now: DateTime<Utc>, expiry_days: i64) -> Option<DateTime<Utc>> {
    (expiry_days > 0).then(|| now + Duration::days(expiry_days))
}

/// Mint a new API key for an organization.
///
/// Returns the stored record together with the raw key. The raw key never
/// leaves this call path again; the persisted side only has the hash.
pub async fn mint_key(
    pool: &DbPool,
    organization_id: Uuid,
    created_by: Option<Uuid>,
    request: CreateApiKeyRequest,
) -> Result<(ApiKey, String), AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidRequest("name is required".to_string()));
    }

    let raw_key = generate_raw_key();
    let key_hash = hash_key(&raw_key);
    let expires_at = expiry_from_days(Utc::now(), request.expiry_days);

    let key = sqlx::query_as::<_, ApiKey>(
        r#"
        INSERT INTO api_keys (organization_id, name, key_hash, key_prefix, expires_at, created_by)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(organization_id)
    .bind(request.name.trim())
    .bind(&key_hash)
    .bind(display_prefix(&raw_key))
    .bind(expires_at)
    .bind(created_by)
    .fetch_one(pool)
    .await?;

    Ok((key, raw_key))
}

/// List an organization's keys, newest first.
pub async fn list_keys(pool: &DbPool, organization_id: Uuid) -> Result<Vec<ApiKey>, AppError> {
    let keys = sqlx::query_as::<_, ApiKey>(
        "SELECT * FROM api_keys WHERE organization_id = $1 ORDER BY created_at DESC",
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?;

    Ok(keys)
}

/// Revoke a key (is_active → false). The row is kept so usage history
/// stays attributable.
pub async fn revoke_key(
    pool: &DbPool,
    organization_id: Uuid,
    key_id: Uuid,
) -> Result<(), AppError> {
    let result =
        sqlx::query("UPDATE api_keys SET is_active = FALSE WHERE id = $1 AND organization_id = $2")
            .bind(key_id)
            .bind(organization_id)
            .execute(pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::ApiKeyNotFound);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable() {
        let key = "trig_0123456789abcdef";
        assert_eq!(hash_key(key), hash_key(key));
        assert_eq!(hash_key(key).len(), 64);
    }

    #[test]
    fn test_distinct_keys_hash_differently() {
        assert_ne!(hash_key("trig_aaaa"), hash_key("trig_aaab"));
    }

    #[test]
    fn test_known_hash_vector() {
        // SHA-256("abc") from FIPS 180-2
        assert_eq!(
            hash_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_generated_key_format() {
        let raw = generate_raw_key();
        assert!(raw.starts_with(KEY_PREFIX));
        let hex_part = &raw[KEY_PREFIX.len()..];
        assert_eq!(hex_part.len(), 64);
        assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_display_prefix_length() {
        let raw = generate_raw_key();
        let prefix = display_prefix(&raw);
        assert_eq!(prefix.len(), 10);
        assert!(raw.starts_with(prefix));
    }

    #[test]
    fn test_expiry_from_days() {
        let now = Utc::now();
        assert_eq!(expiry_from_days(now, 0), None);
        assert_eq!(expiry_from_days(now, -5), None);
        assert_eq!(expiry_from_days(now, 90), Some(now + Duration::days(90)));
    }
}
