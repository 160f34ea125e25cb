//! AI prompt template model and request types.
//!
//! Prompt templates drive content generation. A template's
//! `user_prompt_template` may reference `{{company_name}}`, `{{context}}`
//! and `{{transcript}}`; rendering substitutes them before the model call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fallback model used when a prompt doesn't name one.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Represents a prompt template record from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct AiPrompt {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub description: Option<String>,

    /// What the template generates: "page_content" or "transcript_summary"
    pub prompt_type: String,

    pub system_prompt: Option<String>,
    pub user_prompt_template: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: i32,

    /// The default prompt is used when a generation names no prompt
    pub is_default: bool,

    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating or replacing a prompt template.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "Default page content",
///   "prompt_type": "page_content",
///   "user_prompt_template": "Create content for {{company_name}}...",
///   "model": "claude-sonnet-4-5-20250929",
///   "temperature": 0.7,
///   "max_tokens": 2000,
///   "is_default": true
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_prompt_type")]
    pub prompt_type: String,
    pub system_prompt: Option<String>,
    pub user_prompt_template: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i32,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_prompt_type() -> String {
    "page_content".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> i32 {
    2000
}

fn default_true() -> bool {
    true
}
