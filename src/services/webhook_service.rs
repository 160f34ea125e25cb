//! Inbound webhook verification and processing.
//!
//! The voice-conversation provider signs each delivery with an
//! `ElevenLabs-Signature` header of the form `t=<unix_seconds>,v0=<hex>`,
//! where `v0` is HMAC-SHA256 over `"<t>.<raw_body>"` keyed by a shared
//! secret. Verification recomputes the MAC and compares it in constant
//! time, rejecting deliveries whose timestamp falls outside a 30-minute
//! replay window in either direction.

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::call_log::TranscriptionData;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted skew between the signature timestamp and now.
pub const REPLAY_WINDOW_SECONDS: i64 = 1800;

/// Signature header components.
#[derive(Debug)]
struct ParsedSignature {
    timestamp: i64,
    signature_hex: String,
}

/// Parse a `t=<unix_seconds>,v0=<hex>` header.
///
/// Both fields are required; anything else in the header is ignored.
fn parse_signature_header(header: &str) -> Option<ParsedSignature> {
    let mut timestamp = None;
    let mut signature_hex = None;

    for part in header.split(',') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix("t=") {
            timestamp = value.parse::<i64>().ok();
        } else if let Some(value) = part.strip_prefix("v0=") {
            signature_hex = Some(value.to_string());
        }
    }

    Some(ParsedSignature {
        timestamp: timestamp?,
        signature_hex: signature_hex?,
    })
}

/// Verify a webhook delivery.
///
/// Returns false on a missing/malformed header, a timestamp outside the
/// replay window, undecodable signature hex, or a MAC mismatch. Never
/// panics on attacker-controlled input.
pub fn verify_signature(
    raw_body: &str,
    signature_header: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> bool {
    let Some(parsed) = parse_signature_header(signature_header) else {
        return false;
    };

    if (now.timestamp() - parsed.timestamp).abs() > REPLAY_WINDOW_SECONDS {
        return false;
    }

    let Ok(provided) = hex::decode(&parsed.signature_hex) else {
        return false;
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC key length is valid");
    mac.update(format!("{}.{}", parsed.timestamp, raw_body).as_bytes());

    // verify_slice is a constant-time comparison; a length mismatch is
    // just a failed verification.
    mac.verify_slice(&provided).is_ok()
}

/// What happened to a transcription event.
#[derive(Debug, PartialEq)]
pub enum TranscriptionOutcome {
    /// A call log row was stored for the resolved page.
    Stored,

    /// No page could be resolved; the event is acknowledged and dropped so
    /// the sender doesn't disable delivery over repeated non-200s.
    PageUnresolved,
}

/// Process a decoded `post_call_transcription` event.
///
/// Page resolution: an explicit page id passed through the embed wins;
/// otherwise the page is looked up by company name. The id is checked for
/// existence so a stale embed id degrades to the company-name fallback
/// instead of a foreign-key failure.
pub async fn process_transcription(
    pool: &DbPool,
    payload: &serde_json::Value,
    data: TranscriptionData,
) -> Result<TranscriptionOutcome, AppError> {
    let Some(page_id) = resolve_page(pool, &data).await? else {
        tracing::warn!(
            conversation_id = %data.conversation_id,
            "could not resolve a page for call transcription; acknowledging"
        );
        return Ok(TranscriptionOutcome::PageUnresolved);
    };

    sqlx::query(
        r#"
        INSERT INTO call_logs (
            page_id,
            conversation_id,
            agent_id,
            call_duration_seconds,
            call_cost_usd,
            started_at,
            ended_at,
            transcript,
            analysis,
            user_email,
            company_name,
            webhook_payload
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(page_id)
    .bind(&data.conversation_id)
    .bind(&data.agent_id)
    .bind(data.call_duration_seconds)
    .bind(data.call_cost_usd)
    .bind(data.started_at)
    .bind(data.ended_at)
    .bind(&data.transcript)
    .bind(&data.analysis)
    .bind(data.user_email().map(str::to_string))
    .bind(data.company_name().map(str::to_string))
    .bind(payload)
    .execute(pool)
    .await?;

    Ok(TranscriptionOutcome::Stored)
}

/// Resolve the page a transcription belongs to.
async fn resolve_page(pool: &DbPool, data: &TranscriptionData) -> Result<Option<Uuid>, AppError> {
    if let Some(page_id) = data.page_id() {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pages WHERE id = $1)")
            .bind(page_id)
            .fetch_one(pool)
            .await?;
        if exists {
            return Ok(Some(page_id));
        }
    }

    if let Some(company_name) = data.company_name() {
        let page_id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM pages WHERE company_name = $1 LIMIT 1")
                .bind(company_name)
                .fetch_optional(pool)
                .await?;
        return Ok(page_id);
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &str = "abc";

    fn sign(secret: &str, timestamp: i64, body: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, body).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn at(timestamp: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(timestamp, 0).unwrap()
    }

    #[test]
    fn test_valid_signature_accepted() {
        let now = 1_700_000_000;
        let body = "{}";
        let header = format!("t={},v0={}", now, sign(SECRET, now, body));
        assert!(verify_signature(body, &header, SECRET, at(now)));
    }

    #[test]
    fn test_body_tamper_rejected() {
        let now = 1_700_000_000;
        let header = format!("t={},v0={}", now, sign(SECRET, now, "{}"));
        assert!(!verify_signature("{ }", &header, SECRET, at(now)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let now = 1_700_000_000;
        let body = "{}";
        let header = format!("t={},v0={}", now, sign("other", now, body));
        assert!(!verify_signature(body, &header, SECRET, at(now)));
    }

    #[test]
    fn test_skew_inside_window_accepted() {
        let sent = 1_700_000_000;
        let body = "{}";
        let header = format!("t={},v0={}", sent, sign(SECRET, sent, body));
        assert!(verify_signature(body, &header, SECRET, at(sent + 1799)));
        assert!(verify_signature(body, &header, SECRET, at(sent - 1799)));
    }

    #[test]
    fn test_skew_past_window_rejected() {
        let sent = 1_700_000_000;
        let body = "{}";
        let header = format!("t={},v0={}", sent, sign(SECRET, sent, body));
        assert!(!verify_signature(body, &header, SECRET, at(sent + 1801)));
        assert!(!verify_signature(body, &header, SECRET, at(sent - 1801)));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let now = 1_700_000_000;
        let body = "{}";
        let v0 = sign(SECRET, now, body);
        assert!(!verify_signature(body, &format!("v0={}", v0), SECRET, at(now)));
        assert!(!verify_signature(body, &format!("t={}", now), SECRET, at(now)));
        assert!(!verify_signature(body, "", SECRET, at(now)));
        assert!(!verify_signature(body, "garbage", SECRET, at(now)));
    }

    #[test]
    fn test_non_numeric_timestamp_rejected() {
        let body = "{}";
        let header = format!("t=soon,v0={}", sign(SECRET, 0, body));
        assert!(!verify_signature(body, &header, SECRET, at(0)));
    }

    #[test]
    fn test_undecodable_hex_rejected() {
        let now = 1_700_000_000;
        let header = format!("t={},v0=zzzz", now);
        assert!(!verify_signature("{}", &header, SECRET, at(now)));
    }

    #[test]
    fn test_truncated_signature_rejected() {
        let now = 1_700_000_000;
        let body = "{}";
        let full = sign(SECRET, now, body);
        let header = format!("t={},v0={}", now, &full[..32]);
        assert!(!verify_signature(body, &header, SECRET, at(now)));
    }
}
