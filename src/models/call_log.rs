//! Call log model and inbound webhook event types.
//!
//! The voice-conversation provider reports completed calls over a signed
//! webhook. The JSON body is decoded at the boundary into a tagged union on
//! its `type` field: transcription events carry a typed payload, every
//! other event type lands in a catch-all variant and is acknowledged as a
//! no-op. Business logic never sees an unvalidated shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a call log record from the database.
///
/// # Database Table
///
/// Maps to the `call_logs` table. `transcript`, `analysis` and
/// `webhook_payload` hold the provider's JSON verbatim for later review.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct CallLog {
    pub id: Uuid,
    pub page_id: Uuid,
    pub conversation_id: String,
    pub agent_id: Option<String>,
    pub call_duration_seconds: Option<i32>,
    pub call_cost_usd: Option<f64>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub transcript: Option<serde_json::Value>,
    pub analysis: Option<serde_json::Value>,
    pub user_email: Option<String>,
    pub company_name: Option<String>,
    pub webhook_payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl CallLog {
    /// Whether the provider's analysis marked the call successful.
    pub fn is_successful(&self) -> bool {
        self.analysis
            .as_ref()
            .and_then(|analysis| analysis.get("call_successful"))
            .and_then(|value| value.as_str())
            == Some("success")
    }
}

/// Inbound webhook event, discriminated on the `type` field.
///
/// Only transcription events are processed; everything else decodes to
/// [`InboundEvent::Unhandled`] and is acknowledged without side effects.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum InboundEvent {
    #[serde(rename = "post_call_transcription")]
    PostCallTranscription { data: TranscriptionData },

    #[serde(other)]
    Unhandled,
}

/// Payload of a `post_call_transcription` event.
#[derive(Debug, Deserialize)]
pub struct TranscriptionData {
    pub conversation_id: String,
    pub agent_id: Option<String>,
    pub call_duration_seconds: Option<i32>,
    pub call_cost_usd: Option<f64>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub transcript: Option<serde_json::Value>,
    pub analysis: Option<serde_json::Value>,
    pub metadata: Option<CallVariables>,
    pub dynamic_variables: Option<CallVariables>,
    pub variables: Option<CallVariables>,
}

/// Context variables the embed passes through the conversation.
///
/// The provider surfaces them under three different keys depending on how
/// the conversation was started, so lookups fall through
/// `metadata` → `dynamic_variables` → `variables`.
#[derive(Debug, Default, Deserialize)]
pub struct CallVariables {
    #[serde(rename = "userEmail")]
    pub user_email: Option<String>,

    #[serde(rename = "companyName")]
    pub company_name: Option<String>,

    #[serde(rename = "pageId")]
    pub page_id: Option<String>,
}

impl TranscriptionData {
    fn variable<'a, F>(&'a self, select: F) -> Option<&'a str>
    where
        F: Fn(&'a CallVariables) -> Option<&'a str>,
    {
        [
            self.metadata.as_ref(),
            self.dynamic_variables.as_ref(),
            self.variables.as_ref(),
        ]
        .into_iter()
        .flatten()
        .find_map(select)
    }

    /// Email of the visitor who took the call, if the embed passed one.
    pub fn user_email(&self) -> Option<&str> {
        self.variable(|vars| vars.user_email.as_deref())
    }

    /// Company name the page was personalized for.
    pub fn company_name(&self) -> Option<&str> {
        self.variable(|vars| vars.company_name.as_deref())
    }

    /// Page id passed through the embed, when it parses as a UUID.
    pub fn page_id(&self) -> Option<Uuid> {
        self.variable(|vars| vars.page_id.as_deref())
            .and_then(|raw| Uuid::parse_str(raw).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_transcription_event() {
        let body = json!({
            "type": "post_call_transcription",
            "data": {
                "conversation_id": "conv_123",
                "agent_id": "agent_9",
                "call_duration_seconds": 142,
                "call_cost_usd": 0.34,
                "transcript": [{"role": "agent", "message": "Hi"}],
                "analysis": {"call_successful": "success"},
                "metadata": {"userEmail": "user@acme.com", "pageId": "550e8400-e29b-41d4-a716-446655440000"}
            }
        });

        let event: InboundEvent = serde_json::from_value(body).unwrap();
        match event {
            InboundEvent::PostCallTranscription { data } => {
                assert_eq!(data.conversation_id, "conv_123");
                assert_eq!(data.user_email(), Some("user@acme.com"));
                assert_eq!(
                    data.page_id(),
                    Some(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap())
                );
            }
            InboundEvent::Unhandled => panic!("expected transcription event"),
        }
    }

    #[test]
    fn test_decode_unknown_event_type() {
        let body = json!({"type": "conversation_started", "data": {"whatever": 1}});
        let event: InboundEvent = serde_json::from_value(body).unwrap();
        assert!(matches!(event, InboundEvent::Unhandled));
    }

    #[test]
    fn test_variable_precedence() {
        let body = json!({
            "type": "post_call_transcription",
            "data": {
                "conversation_id": "conv_123",
                "metadata": {"userEmail": "meta@acme.com"},
                "dynamic_variables": {"userEmail": "dyn@acme.com", "companyName": "Acme"},
                "variables": {"userEmail": "var@acme.com"}
            }
        });

        let InboundEvent::PostCallTranscription { data } = serde_json::from_value(body).unwrap()
        else {
            panic!("expected transcription event");
        };

        // metadata wins for email; company name falls through to the first
        // bag that carries one.
        assert_eq!(data.user_email(), Some("meta@acme.com"));
        assert_eq!(data.company_name(), Some("Acme"));
    }

    #[test]
    fn test_invalid_page_id_is_ignored() {
        let body = json!({
            "type": "post_call_transcription",
            "data": {
                "conversation_id": "conv_123",
                "metadata": {"pageId": "not-a-uuid"}
            }
        });

        let InboundEvent::PostCallTranscription { data } = serde_json::from_value(body).unwrap()
        else {
            panic!("expected transcription event");
        };
        assert_eq!(data.page_id(), None);
    }

    #[test]
    fn test_call_log_success_flag() {
        let mut log = CallLog {
            id: Uuid::new_v4(),
            page_id: Uuid::new_v4(),
            conversation_id: "conv_123".to_string(),
            agent_id: None,
            call_duration_seconds: None,
            call_cost_usd: None,
            started_at: None,
            ended_at: None,
            transcript: None,
            analysis: Some(json!({"call_successful": "success"})),
            user_email: None,
            company_name: None,
            webhook_payload: json!({}),
            created_at: Utc::now(),
        };
        assert!(log.is_successful());

        log.analysis = Some(json!({"call_successful": "failure"}));
        assert!(!log.is_successful());

        log.analysis = None;
        assert!(!log.is_successful());
    }
}
