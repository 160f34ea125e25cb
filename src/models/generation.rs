//! AI generation record model and request types.
//!
//! Every generation attempt is persisted: a row is written as 'processing'
//! before the model call and updated to 'completed' or 'failed' afterwards,
//! keeping the rendered prompt, token counts and cost for usage review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a generation attempt from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct AiGeneration {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub prompt_id: Option<Uuid>,
    pub call_log_id: Option<Uuid>,
    pub generation_type: String,
    pub input_text: String,
    pub input_length: i32,
    pub prompt_used: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: i32,

    /// 'processing', 'completed' or 'failed'
    pub status: String,

    pub output_text: Option<String>,
    pub output_length: Option<i32>,
    pub tokens_used: Option<i32>,
    pub prompt_tokens: Option<i32>,
    pub completion_tokens: Option<i32>,
    pub processing_time_ms: Option<i32>,
    pub cost_usd: Option<f64>,
    pub error_message: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Request body for generating page content.
///
/// Prompt resolution order: `custom_prompt` wins, then `prompt_id`, then
/// the organization's default active page-content prompt, then a built-in
/// fallback.
///
/// # JSON Example
///
/// ```json
/// {
///   "company_name": "Acme Corp",
///   "context": "Notes from the discovery call...",
///   "prompt_id": "550e8400-e29b-41d4-a716-446655440000"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct GenerateContentRequest {
    pub company_name: String,

    #[serde(default)]
    pub context: String,

    pub prompt_id: Option<Uuid>,

    /// Raw template text overriding any stored prompt
    pub custom_prompt: Option<String>,
}

/// Response for a completed generation.
#[derive(Debug, Serialize)]
pub struct GenerateContentResponse {
    pub generation_id: Uuid,
    pub content: String,
    pub tokens_used: i32,
}
