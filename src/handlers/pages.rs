//! Page management HTTP handlers.
//!
//! This module implements the authenticated page endpoints:
//! - POST /api/v1/pages - Create a page
//! - GET /api/v1/pages - List the organization's pages
//! - GET /api/v1/pages/{id} - Get a page by ID
//! - PUT /api/v1/pages/{id} - Update a page
//! - DELETE /api/v1/pages/{id} - Delete a page
//!
//! All operations are scoped to the authenticated key's organization.

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::page::{CreatePageRequest, Page, PageResponse, UpdatePageRequest, normalize_gate_columns},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// Fetch a page and enforce ownership.
///
/// Returns 404 when the page doesn't exist and 403 when it belongs to a
/// different organization. The split (rather than a combined 404) matches
/// the management API contract: the caller holds a valid credential, so a
/// tenant mismatch is an authorization failure, not a missing resource.
pub async fn fetch_owned_page(
    pool: &DbPool,
    page_id: Uuid,
    organization_id: Uuid,
) -> Result<Page, AppError> {
    let page = sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE id = $1")
        .bind(page_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::PageNotFound)?;

    if page.organization_id != organization_id {
        return Err(AppError::Forbidden("You don't have access to this page"));
    }

    Ok(page)
}

/// Map a duplicate-slug insert/update to a client error.
fn slug_conflict(err: AppError) -> AppError {
    if err.is_unique_violation() {
        AppError::InvalidRequest("A page with this slug already exists".to_string())
    } else {
        err
    }
}

/// Create a new page.
///
/// # Endpoint
///
/// `POST /api/v1/pages`
///
/// # Request Body
///
/// ```json
/// {
///   "slug": "acme-q3",
///   "company_name": "Acme Corp",
///   "is_published": true,
///   "email_gate_enabled": true,
///   "email_gate_type": "domain",
///   "email_gate_domain": "acme.com"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: the stored row plus its public URL
/// - **Error (400)**: missing slug/company_name, or slug already taken
/// - **Error (401)**: invalid API key
///
/// Gate columns are normalized on write: only the column matching the
/// selected gate type is stored, and nothing when the gate is disabled.
pub async fn create_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreatePageRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.slug.trim().is_empty() || request.company_name.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "slug and company_name are required".to_string(),
        ));
    }

    let (gate_type, gate_domain, gate_allowlist) = normalize_gate_columns(
        request.email_gate_enabled,
        request.email_gate_type,
        request.email_gate_domain,
        request.email_gate_allowlist,
    );

    let page = sqlx::query_as::<_, Page>(
        r#"
        INSERT INTO pages (
            organization_id, slug, company_name, title, hero_title, hero_subtitle,
            body_markdown, meeting_transcript, is_published,
            email_gate_enabled, email_gate_type, email_gate_domain, email_gate_allowlist
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *
        "#,
    )
    // Link to the authenticated organization; API-created pages have no
    // creating user.
    .bind(auth.organization_id)
    .bind(request.slug.trim())
    .bind(&request.company_name)
    .bind(&request.title)
    .bind(&request.hero_title)
    .bind(&request.hero_subtitle)
    .bind(&request.body_markdown)
    .bind(&request.meeting_transcript)
    .bind(request.is_published)
    .bind(request.email_gate_enabled)
    .bind(&gate_type)
    .bind(&gate_domain)
    .bind(&gate_allowlist)
    .fetch_one(&state.pool)
    .await
    .map_err(|err| slug_conflict(err.into()))?;

    let url = state.config.page_url(&page.slug);
    Ok((StatusCode::CREATED, Json(PageResponse { page, url })))
}

/// List all pages for the authenticated organization, newest first.
///
/// # Endpoint
///
/// `GET /api/v1/pages`
pub async fn list_pages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<PageResponse>>, AppError> {
    let pages = sqlx::query_as::<_, Page>(
        "SELECT * FROM pages WHERE organization_id = $1 ORDER BY created_at DESC",
    )
    .bind(auth.organization_id)
    .fetch_all(&state.pool)
    .await?;

    let responses = pages
        .into_iter()
        .map(|page| {
            let url = state.config.page_url(&page.slug);
            PageResponse { page, url }
        })
        .collect();

    Ok(Json(responses))
}

/// Get a specific page by ID.
///
/// # Endpoint
///
/// `GET /api/v1/pages/{id}`
///
/// # Response
///
/// - **Success (200 OK)**: the page and its public URL
/// - **Error (404)**: page doesn't exist
/// - **Error (403)**: page belongs to a different organization
pub async fn get_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(page_id): Path<Uuid>,
) -> Result<Json<PageResponse>, AppError> {
    let page = fetch_owned_page(&state.pool, page_id, auth.organization_id).await?;

    let url = state.config.page_url(&page.slug);
    Ok(Json(PageResponse { page, url }))
}

/// Update a page.
///
/// # Endpoint
///
/// `PUT /api/v1/pages/{id}`
///
/// Absent fields are left untouched; text fields submitted as empty
/// strings are cleared to NULL. Gate columns are re-normalized after the
/// merge.
pub async fn update_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(page_id): Path<Uuid>,
    Json(request): Json<UpdatePageRequest>,
) -> Result<Json<PageResponse>, AppError> {
    let mut page = fetch_owned_page(&state.pool, page_id, auth.organization_id).await?;
    request.apply(&mut page);

    if page.slug.trim().is_empty() || page.company_name.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "slug and company_name must not be empty".to_string(),
        ));
    }

    let page = sqlx::query_as::<_, Page>(
        r#"
        UPDATE pages
        SET slug = $2,
            company_name = $3,
            title = $4,
            hero_title = $5,
            hero_subtitle = $6,
            body_markdown = $7,
            meeting_transcript = $8,
            is_published = $9,
            email_gate_enabled = $10,
            email_gate_type = $11,
            email_gate_domain = $12,
            email_gate_allowlist = $13,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(page.id)
    .bind(&page.slug)
    .bind(&page.company_name)
    .bind(&page.title)
    .bind(&page.hero_title)
    .bind(&page.hero_subtitle)
    .bind(&page.body_markdown)
    .bind(&page.meeting_transcript)
    .bind(page.is_published)
    .bind(page.email_gate_enabled)
    .bind(&page.email_gate_type)
    .bind(&page.email_gate_domain)
    .bind(&page.email_gate_allowlist)
    .fetch_one(&state.pool)
    .await
    .map_err(|err| slug_conflict(err.into()))?;

    let url = state.config.page_url(&page.slug);
    Ok(Json(PageResponse { page, url }))
}

/// Delete a page.
///
/// # Endpoint
///
/// `DELETE /api/v1/pages/{id}`
///
/// Hard delete; captures and call logs cascade at the database level.
/// Returns 204 No Content on success.
pub async fn delete_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(page_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let page = fetch_owned_page(&state.pool, page_id, auth.organization_id).await?;

    sqlx::query("DELETE FROM pages WHERE id = $1")
        .bind(page.id)
        .execute(&state.pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
