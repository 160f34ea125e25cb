//! Organization (tenant) model.
//!
//! Every page, API key, prompt and generation belongs to exactly one
//! organization. Organizations are created through the bootstrap onboarding
//! endpoint together with their first API key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an organization record from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Organization {
    /// Unique identifier for this organization
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// URL-safe unique identifier used in dashboards and tooling
    pub slug: String,

    /// Timestamp when the organization was created
    pub created_at: DateTime<Utc>,
}

/// Request body for onboarding a new organization.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "Acme Corp",
///   "slug": "acme"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateOrganizationRequest {
    pub name: String,
    pub slug: String,
}

/// Response for organization onboarding.
///
/// Carries the raw initial API key. This is the only time the raw key is
/// ever returned; only its hash is stored.
#[derive(Debug, Serialize)]
pub struct CreateOrganizationResponse {
    pub organization: Organization,

    /// Raw bearer key for the organization's first credential.
    /// Shown exactly once; save it immediately.
    pub api_key: String,
}
