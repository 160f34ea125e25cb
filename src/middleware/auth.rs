//! API key authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the bearer key from the Authorization header
//! 2. Hash it and look up an active credential in the database
//! 3. Auto-deactivate the credential if its expiry has passed
//! 4. Inject the owning organization's identity into the request
//! 5. Reject unauthenticated requests with HTTP 401
//!
//! The decision is stateless per request apart from two best-effort
//! bookkeeping writes: the expiry deactivation and the last-used timestamp.
//! Neither write's failure is ever surfaced to the caller.

use crate::{error::AppError, services::api_key_service, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Authentication context attached to authenticated requests.
///
/// This struct is inserted into the request's extension map and can be
/// extracted by route handlers to know which tenant made the request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Organization the presented key belongs to
    ///
    /// Every query downstream filters by this id; a request is authorized
    /// for exactly one organization.
    pub organization_id: Uuid,

    /// Display name of the organization
    pub organization_name: String,

    /// ID of the authenticated API key
    pub api_key_id: Uuid,

    /// Label of the authenticated API key
    pub api_key_name: String,
}

/// Credential row joined with its owning organization's name.
#[derive(Debug, sqlx::FromRow)]
struct MatchedKey {
    id: Uuid,
    organization_id: Uuid,
    name: String,
    expires_at: Option<DateTime<Utc>>,
    organization_name: String,
}

/// API key authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <key>` header; missing or malformed
///    → 401 "Missing or invalid Authorization header"
/// 2. Require the `trig_` key prefix → 401 "Invalid API key format"
/// 3. SHA-256 the key and look up an active credential with that hash
///    → 401 "Invalid or expired API key" when nothing matches
/// 4. If the credential's expiry has passed, deactivate it and reject with
///    401 "API key has expired"
/// 5. Otherwise update last_used_at (best-effort), inject [`AuthContext`],
///    call the next handler
///
/// Infrastructure failures (pool exhausted, database down) surface as 500
/// via `AppError::Database`, never as a 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Step 1: Extract bearer token
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthenticated(
            "Missing or invalid Authorization header",
        ))?;

    let api_key = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthenticated(
            "Missing or invalid Authorization header",
        ))?;

    // Step 2: Cheap format check before touching the database
    if !api_key.starts_with(api_key_service::KEY_PREFIX) {
        return Err(AppError::Unauthenticated("Invalid API key format"));
    }

    // Step 3: Hash and look up, joined with the owning organization
    let key_hash = api_key_service::hash_key(api_key);

    let matched = sqlx::query_as::<_, MatchedKey>(
        r#"
        SELECT ak.id, ak.organization_id, ak.name, ak.expires_at, o.name AS organization_name
        FROM api_keys ak
        JOIN organizations o ON o.id = ak.organization_id
        WHERE ak.key_hash = $1 AND ak.is_active = TRUE
        "#,
    )
    .bind(&key_hash)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::Unauthenticated("Invalid or expired API key"))?;

    // Step 4: Expiry check with auto-deactivation. The write is
    // best-effort: a second attempt with the same key still rejects here
    // (or at the lookup once the flag has stuck).
    let now = Utc::now();
    if matched.expires_at.is_some_and(|expires_at| expires_at < now) {
        let deactivate = sqlx::query("UPDATE api_keys SET is_active = FALSE WHERE id = $1")
            .bind(matched.id)
            .execute(&state.pool)
            .await;
        if let Err(err) = deactivate {
            tracing::warn!(api_key_id = %matched.id, error = %err, "failed to deactivate expired API key");
        }

        return Err(AppError::Unauthenticated("API key has expired"));
    }

    // Step 5: Best-effort usage bookkeeping; never fails the request.
    let touch = sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
        .bind(matched.id)
        .execute(&state.pool)
        .await;
    if let Err(err) = touch {
        tracing::warn!(api_key_id = %matched.id, error = %err, "failed to update last_used_at");
    }

    let auth_context = AuthContext {
        organization_id: matched.organization_id,
        organization_name: matched.organization_name,
        api_key_id: matched.id,
        api_key_name: matched.name,
    };

    // Route handlers extract this with Extension<AuthContext>
    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}
