//! Public email-capture handler.
//!
//! `POST /api/public/capture-email` is the submit target of a page's email
//! gate. The gate policy is evaluated here, server-side; the public page
//! payload never contains the policy, so this endpoint is the only place a
//! visitor's email is checked against it.

use crate::{
    error::AppError,
    models::capture::{CaptureEmailRequest, CaptureEmailResponse},
    models::email_gate::validate_email_syntax,
    models::page::Page,
    state::AppState,
};
use axum::{Json, extract::State, http::HeaderMap};

/// Client address from proxy headers, first hop wins.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        })
}

/// Capture a visitor's email for a page.
///
/// # Endpoint
///
/// `POST /api/public/capture-email`
///
/// # Request Body
///
/// ```json
/// {
///   "pageId": "550e8400-e29b-41d4-a716-446655440000",
///   "email": "user@acme.com"
/// }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: `{"success": true}`; a repeat submission of the
///   same address additionally carries `"existing": true`
/// - **Error (400)**: malformed email
/// - **Error (403)**: email rejected by the page's gate policy (the
///   message never reveals which policy is configured)
/// - **Error (404)**: unknown page
pub async fn capture_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CaptureEmailRequest>,
) -> Result<Json<CaptureEmailResponse>, AppError> {
    let page = sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE id = $1")
        .bind(request.page_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::PageNotFound)?;

    // Syntax is checked even when no gate is configured; a gate policy is
    // additionally enforced when one exists.
    match page.gate_policy() {
        Some(policy) => policy.evaluate(&request.email)?,
        None => validate_email_syntax(&request.email)?,
    }

    let ip_address = client_ip(&headers);
    let user_agent = headers
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    // Duplicate captures are a success: the unique constraint dedups them
    // and rows_affected tells us which case we hit.
    let result = sqlx::query(
        r#"
        INSERT INTO page_email_captures (page_id, email, ip_address, user_agent)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (page_id, email) DO NOTHING
        "#,
    )
    .bind(page.id)
    .bind(request.email.to_lowercase())
    .bind(ip_address)
    .bind(user_agent)
    .execute(&state.pool)
    .await?;

    let existing = (result.rows_affected() == 0).then_some(true);
    Ok(Json(CaptureEmailResponse {
        success: true,
        existing,
    }))
}
