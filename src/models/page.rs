//! Landing page data models and API request/response types.
//!
//! This module defines:
//! - `Page`: Database entity representing a personalized landing page
//! - `CreatePageRequest` / `UpdatePageRequest`: Request bodies for page CRUD
//! - `PageResponse`: Response echoing the stored row plus its public URL
//! - `PublicPageResponse`: The reduced shape served to unauthenticated
//!   visitors, with the gate policy redacted

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::email_gate::EmailGatePolicy;

/// Represents a page record from the database.
///
/// # Email Gate Columns
///
/// `email_gate_type`, `email_gate_domain` and `email_gate_allowlist` form a
/// discriminated policy: exactly one variant's data column is populated
/// based on the type, and all are NULL when the gate is disabled. The
/// normalization in [`normalize_gate_columns`] maintains this on every
/// write.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Page {
    /// Unique identifier for this page
    pub id: Uuid,

    /// Organization that owns this page
    ///
    /// Queries always filter by organization to keep tenants isolated.
    pub organization_id: Uuid,

    /// URL-safe unique identifier; the public page lives at `/<slug>`
    pub slug: String,

    /// Prospect company this page was personalized for
    pub company_name: String,

    /// Browser title
    pub title: Option<String>,

    /// Hero section heading
    pub hero_title: Option<String>,

    /// Hero section subheading
    pub hero_subtitle: Option<String>,

    /// Main page content, markdown
    pub body_markdown: Option<String>,

    /// Sales meeting transcript used as context for AI generation
    pub meeting_transcript: Option<String>,

    /// Unpublished pages are invisible on the public routes
    pub is_published: bool,

    /// Whether visitors must pass the email gate before seeing content
    pub email_gate_enabled: bool,

    /// Gate policy discriminant: "any", "domain" or "allowlist"
    pub email_gate_type: Option<String>,

    /// Required domain when the type is "domain"
    pub email_gate_domain: Option<String>,

    /// Admitted addresses when the type is "allowlist"
    pub email_gate_allowlist: Option<Vec<String>>,

    /// User that created the page; NULL for API-created pages
    pub created_by: Option<Uuid>,

    /// Timestamp when the page was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last update
    pub updated_at: DateTime<Utc>,
}

impl Page {
    /// The page's gate policy, or `None` when the gate is disabled.
    pub fn gate_policy(&self) -> Option<EmailGatePolicy> {
        EmailGatePolicy::from_columns(
            self.email_gate_enabled,
            self.email_gate_type.as_deref(),
            self.email_gate_domain.as_deref(),
            self.email_gate_allowlist.as_deref(),
        )
    }
}

/// Default gate type used when a gate is enabled without naming one.
fn default_gate_type() -> String {
    "any".to_string()
}

/// Request body for creating a new page.
///
/// # JSON Example
///
/// ```json
/// {
///   "slug": "acme-q3",
///   "company_name": "Acme Corp",
///   "hero_title": "Built for Acme",
///   "is_published": true,
///   "email_gate_enabled": true,
///   "email_gate_type": "domain",
///   "email_gate_domain": "acme.com"
/// }
/// ```
///
/// # Validation
///
/// - `slug` and `company_name` are required and must be non-empty
/// - Gate columns are normalized: only the column matching the selected
///   type is stored, and nothing is stored when the gate is disabled
#[derive(Debug, Deserialize)]
pub struct CreatePageRequest {
    pub slug: String,
    pub company_name: String,
    pub title: Option<String>,
    pub hero_title: Option<String>,
    pub hero_subtitle: Option<String>,
    pub body_markdown: Option<String>,
    pub meeting_transcript: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub email_gate_enabled: bool,
    #[serde(default = "default_gate_type")]
    pub email_gate_type: String,
    pub email_gate_domain: Option<String>,
    pub email_gate_allowlist: Option<Vec<String>>,
}

/// Request body for updating a page.
///
/// Every field is optional; absent fields are left untouched. Text fields
/// submitted as empty strings are stored as NULL, matching how the page
/// form clears them.
#[derive(Debug, Deserialize)]
pub struct UpdatePageRequest {
    pub slug: Option<String>,
    pub company_name: Option<String>,
    pub title: Option<String>,
    pub hero_title: Option<String>,
    pub hero_subtitle: Option<String>,
    pub body_markdown: Option<String>,
    pub meeting_transcript: Option<String>,
    pub is_published: Option<bool>,
    pub email_gate_enabled: Option<bool>,
    pub email_gate_type: Option<String>,
    pub email_gate_domain: Option<String>,
    pub email_gate_allowlist: Option<Vec<String>>,
}

impl UpdatePageRequest {
    /// Merge this update into an existing page row.
    ///
    /// Gate columns are re-normalized after the merge so the discriminant
    /// invariant holds whichever subset of fields was submitted.
    pub fn apply(self, page: &mut Page) {
        if let Some(slug) = self.slug {
            page.slug = slug;
        }
        if let Some(company_name) = self.company_name {
            page.company_name = company_name;
        }
        if let Some(title) = self.title {
            page.title = blank_to_none(title);
        }
        if let Some(hero_title) = self.hero_title {
            page.hero_title = blank_to_none(hero_title);
        }
        if let Some(hero_subtitle) = self.hero_subtitle {
            page.hero_subtitle = blank_to_none(hero_subtitle);
        }
        if let Some(body_markdown) = self.body_markdown {
            page.body_markdown = blank_to_none(body_markdown);
        }
        if let Some(meeting_transcript) = self.meeting_transcript {
            page.meeting_transcript = blank_to_none(meeting_transcript);
        }
        if let Some(is_published) = self.is_published {
            page.is_published = is_published;
        }
        if let Some(email_gate_enabled) = self.email_gate_enabled {
            page.email_gate_enabled = email_gate_enabled;
        }
        if let Some(email_gate_type) = self.email_gate_type {
            page.email_gate_type = Some(email_gate_type);
        }
        if let Some(email_gate_domain) = self.email_gate_domain {
            page.email_gate_domain = blank_to_none(email_gate_domain);
        }
        if let Some(email_gate_allowlist) = self.email_gate_allowlist {
            page.email_gate_allowlist = Some(email_gate_allowlist);
        }

        let (gate_type, domain, allowlist) = normalize_gate_columns(
            page.email_gate_enabled,
            page.email_gate_type.clone().unwrap_or_else(default_gate_type),
            page.email_gate_domain.take(),
            page.email_gate_allowlist.take(),
        );
        page.email_gate_type = gate_type;
        page.email_gate_domain = domain;
        page.email_gate_allowlist = allowlist;
    }
}

/// Normalize gate columns so only the selected variant's data is stored.
///
/// Disabled gate → all three columns NULL. Enabled gate → the type is kept
/// and the domain/allowlist column survives only when it matches the type.
pub fn normalize_gate_columns(
    enabled: bool,
    gate_type: String,
    domain: Option<String>,
    allowlist: Option<Vec<String>>,
) -> (Option<String>, Option<String>, Option<Vec<String>>) {
    if !enabled {
        return (None, None, None);
    }

    let domain = if gate_type == "domain" { domain } else { None };
    let allowlist = if gate_type == "allowlist" {
        allowlist
    } else {
        None
    };

    (Some(gate_type), domain, allowlist)
}

fn blank_to_none(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Response body for the authenticated page endpoints.
///
/// Echoes the stored row plus the computed public URL.
#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub page: Page,
    pub url: String,
}

/// Page shape served to unauthenticated visitors.
///
/// Exposes whether an email gate exists but never its type, domain or
/// allowlist. The gate is evaluated server-side so the policy cannot be
/// probed from the payload.
#[derive(Debug, Serialize)]
pub struct PublicPageResponse {
    pub id: Uuid,
    pub slug: String,
    pub company_name: String,
    pub title: Option<String>,
    pub hero_title: Option<String>,
    pub hero_subtitle: Option<String>,
    pub body_markdown: Option<String>,
    pub email_gate_enabled: bool,
}

impl From<Page> for PublicPageResponse {
    fn from(page: Page) -> Self {
        Self {
            id: page.id,
            slug: page.slug,
            company_name: page.company_name,
            title: page.title,
            hero_title: page.hero_title,
            hero_subtitle: page.hero_subtitle,
            body_markdown: page.body_markdown,
            email_gate_enabled: page.email_gate_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_disabled_gate_clears_all_columns() {
        let (gate_type, domain, allowlist) = normalize_gate_columns(
            false,
            "domain".to_string(),
            Some("acme.com".to_string()),
            Some(vec!["a@x.com".to_string()]),
        );
        assert_eq!(gate_type, None);
        assert_eq!(domain, None);
        assert_eq!(allowlist, None);
    }

    #[test]
    fn test_normalize_keeps_only_matching_variant() {
        let (gate_type, domain, allowlist) = normalize_gate_columns(
            true,
            "domain".to_string(),
            Some("acme.com".to_string()),
            Some(vec!["a@x.com".to_string()]),
        );
        assert_eq!(gate_type.as_deref(), Some("domain"));
        assert_eq!(domain.as_deref(), Some("acme.com"));
        assert_eq!(allowlist, None);
    }

    #[test]
    fn test_update_switching_gate_type_drops_stale_column() {
        let mut page = sample_page();
        page.email_gate_enabled = true;
        page.email_gate_type = Some("domain".to_string());
        page.email_gate_domain = Some("acme.com".to_string());

        let update = UpdatePageRequest {
            slug: None,
            company_name: None,
            title: None,
            hero_title: None,
            hero_subtitle: None,
            body_markdown: None,
            meeting_transcript: None,
            is_published: None,
            email_gate_enabled: None,
            email_gate_type: Some("allowlist".to_string()),
            email_gate_domain: None,
            email_gate_allowlist: Some(vec!["a@x.com".to_string()]),
        };
        update.apply(&mut page);

        assert_eq!(page.email_gate_type.as_deref(), Some("allowlist"));
        assert_eq!(page.email_gate_domain, None);
        assert_eq!(page.email_gate_allowlist, Some(vec!["a@x.com".to_string()]));
    }

    #[test]
    fn test_update_blank_title_clears_it() {
        let mut page = sample_page();
        page.title = Some("Old title".to_string());

        let update = UpdatePageRequest {
            slug: None,
            company_name: None,
            title: Some("".to_string()),
            hero_title: None,
            hero_subtitle: None,
            body_markdown: None,
            meeting_transcript: None,
            is_published: None,
            email_gate_enabled: None,
            email_gate_type: None,
            email_gate_domain: None,
            email_gate_allowlist: None,
        };
        update.apply(&mut page);

        assert_eq!(page.title, None);
    }

    fn sample_page() -> Page {
        Page {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            slug: "acme-q3".to_string(),
            company_name: "Acme Corp".to_string(),
            title: None,
            hero_title: None,
            hero_subtitle: None,
            body_markdown: None,
            meeting_transcript: None,
            is_published: false,
            email_gate_enabled: false,
            email_gate_type: None,
            email_gate_domain: None,
            email_gate_allowlist: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
