//! Prompt template management handlers.
//!
//! - POST /api/v1/prompts - Create a template
//! - GET /api/v1/prompts - List the organization's templates
//! - PUT /api/v1/prompts/{id} - Replace a template
//! - DELETE /api/v1/prompts/{id} - Delete a template
//!
//! All operations are scoped to the authenticated key's organization.

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::prompt::{AiPrompt, PromptRequest},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// Create a prompt template.
///
/// # Endpoint
///
/// `POST /api/v1/prompts`
///
/// Returns 201 Created with the stored template.
pub async fn create_prompt(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<PromptRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.name.trim().is_empty() || request.user_prompt_template.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "name and user_prompt_template are required".to_string(),
        ));
    }

    let prompt = sqlx::query_as::<_, AiPrompt>(
        r#"
        INSERT INTO ai_prompts (
            organization_id, name, description, prompt_type, system_prompt,
            user_prompt_template, model, temperature, max_tokens, is_default, is_active
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(auth.organization_id)
    .bind(&request.name)
    .bind(&request.description)
    .bind(&request.prompt_type)
    .bind(&request.system_prompt)
    .bind(&request.user_prompt_template)
    .bind(&request.model)
    .bind(request.temperature)
    .bind(request.max_tokens)
    .bind(request.is_default)
    .bind(request.is_active)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(prompt)))
}

/// List the organization's templates, defaults first.
///
/// # Endpoint
///
/// `GET /api/v1/prompts`
pub async fn list_prompts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<AiPrompt>>, AppError> {
    let prompts = sqlx::query_as::<_, AiPrompt>(
        "SELECT * FROM ai_prompts WHERE organization_id = $1 ORDER BY is_default DESC, name",
    )
    .bind(auth.organization_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(prompts))
}

/// Replace a prompt template.
///
/// # Endpoint
///
/// `PUT /api/v1/prompts/{id}`
///
/// Full replacement with the same body shape as creation. Returns 404 when
/// the id doesn't belong to the caller's organization.
pub async fn update_prompt(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(prompt_id): Path<Uuid>,
    Json(request): Json<PromptRequest>,
) -> Result<Json<AiPrompt>, AppError> {
    if request.name.trim().is_empty() || request.user_prompt_template.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "name and user_prompt_template are required".to_string(),
        ));
    }

    let prompt = sqlx::query_as::<_, AiPrompt>(
        r#"
        UPDATE ai_prompts
        SET name = $3,
            description = $4,
            prompt_type = $5,
            system_prompt = $6,
            user_prompt_template = $7,
            model = $8,
            temperature = $9,
            max_tokens = $10,
            is_default = $11,
            is_active = $12
        WHERE id = $1 AND organization_id = $2
        RETURNING *
        "#,
    )
    .bind(prompt_id)
    .bind(auth.organization_id)
    .bind(&request.name)
    .bind(&request.description)
    .bind(&request.prompt_type)
    .bind(&request.system_prompt)
    .bind(&request.user_prompt_template)
    .bind(&request.model)
    .bind(request.temperature)
    .bind(request.max_tokens)
    .bind(request.is_default)
    .bind(request.is_active)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::PromptNotFound)?;

    Ok(Json(prompt))
}

/// Delete a prompt template.
///
/// # Endpoint
///
/// `DELETE /api/v1/prompts/{id}`
///
/// Hard delete; generation rows that referenced it keep a NULL prompt_id.
/// Returns 204 on success, 404 when the id doesn't belong to the caller's
/// organization.
pub async fn delete_prompt(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(prompt_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM ai_prompts WHERE id = $1 AND organization_id = $2")
        .bind(prompt_id)
        .bind(auth.organization_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::PromptNotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
