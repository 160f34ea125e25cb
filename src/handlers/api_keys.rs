//! API key management handlers.
//!
//! Keys are self-service: an authenticated key can mint, list and revoke
//! keys for its own organization (rotation without operator involvement).
//! - POST /api/v1/api-keys - Mint a key
//! - GET /api/v1/api-keys - List the organization's keys
//! - DELETE /api/v1/api-keys/{id} - Revoke a key

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::api_key::{ApiKeyResponse, CreateApiKeyRequest, CreatedApiKeyResponse},
    services::api_key_service,
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// Mint a new API key.
///
/// # Endpoint
///
/// `POST /api/v1/api-keys`
///
/// # Request Body
///
/// ```json
/// {
///   "name": "CI integration",
///   "expiry_days": 90
/// }
/// ```
///
/// # Response (201 Created)
///
/// Key metadata plus the raw key. The raw key appears in this response
/// only; it is stored as a hash and can never be retrieved again.
pub async fn create_api_key(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (key, raw_key) =
        api_key_service::mint_key(&state.pool, auth.organization_id, None, request).await?;

    tracing::info!(
        organization_id = %auth.organization_id,
        api_key_id = %key.id,
        "minted API key"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedApiKeyResponse {
            key: key.into(),
            api_key: raw_key,
        }),
    ))
}

/// List the organization's keys, newest first.
///
/// # Endpoint
///
/// `GET /api/v1/api-keys`
///
/// Responses carry the display prefix and usage metadata, never a hash or
/// raw key.
pub async fn list_api_keys(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<ApiKeyResponse>>, AppError> {
    let keys = api_key_service::list_keys(&state.pool, auth.organization_id).await?;

    Ok(Json(keys.into_iter().map(Into::into).collect()))
}

/// Revoke an API key.
///
/// # Endpoint
///
/// `DELETE /api/v1/api-keys/{id}`
///
/// Soft revocation: is_active flips false, the row is kept. Returns 204 on
/// success, 404 when the id doesn't belong to the caller's organization.
/// A key may revoke itself; the request completes and every subsequent
/// request with that key is rejected.
pub async fn revoke_api_key(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(key_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    api_key_service::revoke_key(&state.pool, auth.organization_id, key_id).await?;

    tracing::info!(
        organization_id = %auth.organization_id,
        api_key_id = %key_id,
        "revoked API key"
    );

    Ok(StatusCode::NO_CONTENT)
}
