//! Organization onboarding.
//!
//! Creates an organization together with its first API key in a single
//! database transaction, so a half-onboarded tenant (org without any
//! credential) can never exist.

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::organization::{CreateOrganizationRequest, Organization};
use crate::services::api_key_service;

/// Name given to the key minted during onboarding.
const INITIAL_KEY_NAME: &str = "Initial key";

/// Create an organization and its first API key atomically.
///
/// Returns the organization and the raw key. The raw key is shown exactly
/// once; only its hash is stored.
///
/// # Errors
///
/// - `InvalidRequest` on empty name/slug or a slug that is already taken
/// - `Database` on other database failures
pub async fn onboard(
    pool: &DbPool,
    request: CreateOrganizationRequest,
) -> Result<(Organization, String), AppError> {
    let name = request.name.trim();
    let slug = request.slug.trim();
    if name.is_empty() || slug.is_empty() {
        return Err(AppError::InvalidRequest(
            "name and slug are required".to_string(),
        ));
    }

    let raw_key = api_key_service::generate_raw_key();
    let key_hash = api_key_service::hash_key(&raw_key);

    let mut tx = pool.begin().await?;

    let organization = sqlx::query_as::<_, Organization>(
        "INSERT INTO organizations (name, slug) VALUES ($1, $2) RETURNING *",
    )
    .bind(name)
    .bind(slug)
    .fetch_one(&mut *tx)
    .await
    .map_err(|err| {
        let err = AppError::from(err);
        if err.is_unique_violation() {
            AppError::InvalidRequest("An organization with this slug already exists".to_string())
        } else {
            err
        }
    })?;

    // Bootstrap keys have no creator: they are minted outside a user session.
    sqlx::query(
        r#"
        INSERT INTO api_keys (organization_id, name, key_hash, key_prefix)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(organization.id)
    .bind(INITIAL_KEY_NAME)
    .bind(&key_hash)
    .bind(api_key_service::display_prefix(&raw_key))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((organization, raw_key))
}
