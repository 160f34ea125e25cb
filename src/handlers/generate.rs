//! AI content generation handler.
//!
//! `POST /api/v1/generate` renders a prompt template for a company and
//! runs it through the hosted model, recording the attempt either way.

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::generation::{GenerateContentRequest, GenerateContentResponse},
    services::generation_service,
    state::AppState,
};
use axum::{Extension, Json, extract::State};

/// Generate landing page content.
///
/// # Endpoint
///
/// `POST /api/v1/generate`
///
/// # Request Body
///
/// ```json
/// {
///   "company_name": "Acme Corp",
///   "context": "Notes from the discovery call...",
///   "prompt_id": "550e8400-e29b-41d4-a716-446655440000"
/// }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: generated markdown plus token usage
/// - **Error (400)**: blank company_name
/// - **Error (404)**: prompt_id doesn't resolve for this organization
/// - **Error (500)**: model API key not configured
/// - **Error (502)**: model call failed (the attempt is recorded as failed)
pub async fn generate_content(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<GenerateContentRequest>,
) -> Result<Json<GenerateContentResponse>, AppError> {
    let response = generation_service::generate_page_content(
        &state.pool,
        &state.config,
        auth.organization_id,
        request,
    )
    .await?;

    Ok(Json(response))
}
