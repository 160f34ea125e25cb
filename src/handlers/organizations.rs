//! Organization onboarding handler.
//!
//! `POST /api/v1/organizations` creates a tenant together with its first
//! API key. The route sits outside the API-key middleware (there is no key
//! to present yet) and is guarded by the operator bootstrap token instead.

use crate::{
    error::AppError,
    models::organization::{CreateOrganizationRequest, CreateOrganizationResponse},
    services::organization_service,
    state::AppState,
};
use axum::{Json, extract::State, http::HeaderMap, http::StatusCode, response::IntoResponse};

/// Onboard a new organization.
///
/// # Endpoint
///
/// `POST /api/v1/organizations` with `Authorization: Bearer <BOOTSTRAP_TOKEN>`
///
/// # Response (201 Created)
///
/// The organization plus the raw initial API key, shown exactly once.
///
/// # Errors
///
/// - **500**: BOOTSTRAP_TOKEN not configured (onboarding disabled)
/// - **401**: missing header or wrong token
/// - **400**: empty name/slug, or slug already taken
pub async fn create_organization(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateOrganizationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let expected = state.config.bootstrap_token.as_deref().ok_or_else(|| {
        AppError::ServerConfiguration(
            "BOOTSTRAP_TOKEN is not set; organization onboarding is disabled".to_string(),
        )
    })?;

    let presented = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthenticated(
            "Missing or invalid Authorization header",
        ))?;

    if presented != expected {
        return Err(AppError::Unauthenticated("Invalid bootstrap token"));
    }

    let (organization, api_key) = organization_service::onboard(&state.pool, request).await?;

    tracing::info!(organization_id = %organization.id, slug = %organization.slug, "onboarded organization");

    Ok((
        StatusCode::CREATED,
        Json(CreateOrganizationResponse {
            organization,
            api_key,
        }),
    ))
}
