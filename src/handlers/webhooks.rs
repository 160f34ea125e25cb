//! Inbound webhook handler for the voice-conversation provider.
//!
//! `POST /api/webhooks/elevenlabs` receives call-completion events. The
//! raw body is kept byte-exact for signature verification before any JSON
//! parsing happens.
//!
//! Acknowledgment policy: every event the service cannot act on (an
//! unhandled event type, an unresolvable page) is still answered 200, so
//! the provider doesn't disable delivery after repeated non-200 responses.
//! Only a bad signature (401), an undecodable body (400) and a failed
//! insert (500) are surfaced as errors.

use crate::{
    error::AppError,
    models::call_log::InboundEvent,
    services::webhook_service::{self, TranscriptionOutcome},
    state::AppState,
};
use axum::{Json, extract::State, http::HeaderMap};
use chrono::Utc;
use serde::Serialize;

/// Header carrying the provider's signature.
const SIGNATURE_HEADER: &str = "ElevenLabs-Signature";

/// Acknowledgment body returned for every accepted delivery.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub message: &'static str,
}

/// Receive a provider webhook.
///
/// # Flow
///
/// 1. When a webhook secret is configured, verify the signature header
///    against the raw body; mismatch → 401. When no secret is configured
///    the delivery is accepted unverified and a warning is logged, a
///    deliberate permissive mode for environments without the secret.
/// 2. Decode the body into the typed event union; undecodable → 400.
/// 3. Transcription events are resolved to a page and stored; everything
///    else is acknowledged as a no-op.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookAck>, AppError> {
    match &state.config.elevenlabs_webhook_secret {
        Some(secret) => {
            let signature = headers
                .get(SIGNATURE_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("");

            if !webhook_service::verify_signature(&body, signature, secret, Utc::now()) {
                tracing::warn!("rejected webhook with invalid signature");
                return Err(AppError::Unauthenticated("Invalid signature"));
            }
        }
        None => {
            tracing::warn!(
                "ELEVENLABS_WEBHOOK_SECRET is not set; accepting webhook WITHOUT signature verification"
            );
        }
    }

    let payload: serde_json::Value = serde_json::from_str(&body)
        .map_err(|err| AppError::InvalidRequest(format!("Undecodable webhook body: {}", err)))?;
    let event: InboundEvent = serde_json::from_value(payload.clone())
        .map_err(|err| AppError::InvalidRequest(format!("Undecodable webhook body: {}", err)))?;

    let data = match event {
        InboundEvent::PostCallTranscription { data } => data,
        InboundEvent::Unhandled => {
            return Ok(Json(WebhookAck {
                message: "Event type not handled",
            }));
        }
    };

    match webhook_service::process_transcription(&state.pool, &payload, data).await? {
        TranscriptionOutcome::Stored => Ok(Json(WebhookAck {
            message: "Webhook processed successfully",
        })),
        TranscriptionOutcome::PageUnresolved => Ok(Json(WebhookAck {
            message: "Page not found, but acknowledged",
        })),
    }
}
