//! Public page fetch handler.
//!
//! `GET /api/public/pages/{slug}` serves published pages to the landing
//! page frontend. The gate policy columns are redacted from the payload;
//! only the fact that a gate exists is exposed.

use crate::{
    error::AppError,
    models::page::{Page, PublicPageResponse},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
};

/// Fetch a published page by slug.
///
/// # Response
///
/// - **Success (200 OK)**: content fields plus `email_gate_enabled`
/// - **Error (404)**: slug unknown or page unpublished (indistinguishable)
pub async fn get_public_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PublicPageResponse>, AppError> {
    let page =
        sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE slug = $1 AND is_published = TRUE")
            .bind(&slug)
            .fetch_optional(&state.pool)
            .await?
            .ok_or(AppError::PageNotFound)?;

    Ok(Json(page.into()))
}
