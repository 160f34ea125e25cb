//! Captured lead model and email-capture request types.
//!
//! A capture is one email address admitted through a page's email gate.
//! Captures are append-only and deduplicated per page by a unique
//! constraint; a repeat submission of the same address is a success.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a captured lead from the database.
///
/// Maps to the `page_email_captures` table. Emails are stored lowercased.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct EmailCapture {
    pub id: Uuid,
    pub page_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub captured_at: DateTime<Utc>,
}

/// Request body for the public email-capture endpoint.
///
/// # JSON Example
///
/// ```json
/// {
///   "pageId": "550e8400-e29b-41d4-a716-446655440000",
///   "email": "user@acme.com"
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureEmailRequest {
    pub page_id: Uuid,
    pub email: String,
}

/// Response for the public email-capture endpoint.
#[derive(Debug, Serialize)]
pub struct CaptureEmailResponse {
    pub success: bool,

    /// Present (true) when the email had already been captured for this
    /// page and the submission deduplicated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing: Option<bool>,
}
