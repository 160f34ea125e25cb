//! Lead review handlers.
//!
//! `GET /api/v1/pages/{id}/leads` lists the emails captured through a
//! page's gate, with date/email/domain filtering, pagination and a
//! top-domains breakdown.

use crate::{
    error::AppError,
    handlers::calls::{Pagination, clamp_paging},
    handlers::pages::fetch_owned_page,
    middleware::auth::AuthContext,
    models::capture::EmailCapture,
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Query parameters for the lead list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct LeadsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,

    /// Lower bound on captured_at (inclusive)
    pub from: Option<DateTime<Utc>>,

    /// Upper bound on captured_at (inclusive)
    pub to: Option<DateTime<Utc>>,

    /// Substring match on the email address
    pub email: Option<String>,

    /// Exact domain suffix match, e.g. `domain=acme.com`
    pub domain: Option<String>,
}

/// One entry of the domain breakdown.
#[derive(Debug, PartialEq, Serialize)]
pub struct DomainCount {
    pub domain: String,
    pub count: i64,
}

/// Count leads per email domain and keep the ten biggest.
fn top_domains(leads: &[EmailCapture]) -> Vec<DomainCount> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for lead in leads {
        if let Some((_, domain)) = lead.email.split_once('@') {
            *counts.entry(domain).or_default() += 1;
        }
    }

    let mut ranked: Vec<DomainCount> = counts
        .into_iter()
        .map(|(domain, count)| DomainCount {
            domain: domain.to_string(),
            count,
        })
        .collect();
    // Ties break alphabetically so the ordering is stable.
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.domain.cmp(&b.domain)));
    ranked.truncate(10);
    ranked
}

/// Aggregate block for the lead list response.
#[derive(Debug, Serialize)]
pub struct LeadSummary {
    pub total_leads: i64,
    pub top_domains: Vec<DomainCount>,
}

/// Response body for the lead list endpoint.
#[derive(Debug, Serialize)]
pub struct LeadListResponse {
    pub leads: Vec<EmailCapture>,
    pub pagination: Pagination,
    pub summary: LeadSummary,
}

/// List captured leads for a page.
///
/// # Endpoint
///
/// `GET /api/v1/pages/{id}/leads?limit=50&offset=0&email=ali&domain=acme.com`
///
/// # Response
///
/// - **Success (200 OK)**: leads (newest first), pagination, summary
/// - **Error (404)**: page doesn't exist
/// - **Error (403)**: page belongs to a different organization
pub async fn list_leads(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(page_id): Path<Uuid>,
    Query(query): Query<LeadsQuery>,
) -> Result<Json<LeadListResponse>, AppError> {
    let page = fetch_owned_page(&state.pool, page_id, auth.organization_id).await?;
    let (limit, offset) = clamp_paging(query.limit, query.offset);

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM page_email_captures
        WHERE page_id = $1
          AND ($2::timestamptz IS NULL OR captured_at >= $2)
          AND ($3::timestamptz IS NULL OR captured_at <= $3)
          AND ($4::text IS NULL OR email ILIKE '%' || $4 || '%')
          AND ($5::text IS NULL OR email ILIKE '%@' || $5)
        "#,
    )
    .bind(page.id)
    .bind(query.from)
    .bind(query.to)
    .bind(&query.email)
    .bind(&query.domain)
    .fetch_one(&state.pool)
    .await?;

    let leads = sqlx::query_as::<_, EmailCapture>(
        r#"
        SELECT * FROM page_email_captures
        WHERE page_id = $1
          AND ($2::timestamptz IS NULL OR captured_at >= $2)
          AND ($3::timestamptz IS NULL OR captured_at <= $3)
          AND ($4::text IS NULL OR email ILIKE '%' || $4 || '%')
          AND ($5::text IS NULL OR email ILIKE '%@' || $5)
        ORDER BY captured_at DESC
        LIMIT $6 OFFSET $7
        "#,
    )
    .bind(page.id)
    .bind(query.from)
    .bind(query.to)
    .bind(&query.email)
    .bind(&query.domain)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let summary = LeadSummary {
        total_leads: total,
        top_domains: top_domains(&leads),
    };

    Ok(Json(LeadListResponse {
        pagination: Pagination::new(total, limit, offset),
        summary,
        leads,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(email: &str) -> EmailCapture {
        EmailCapture {
            id: Uuid::new_v4(),
            page_id: Uuid::new_v4(),
            email: email.to_string(),
            first_name: None,
            last_name: None,
            company: None,
            ip_address: None,
            user_agent: None,
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn test_top_domains_ranks_by_count() {
        let leads = vec![
            lead("a@acme.com"),
            lead("b@acme.com"),
            lead("c@other.io"),
        ];
        let ranked = top_domains(&leads);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].domain, "acme.com");
        assert_eq!(ranked[0].count, 2);
        assert_eq!(ranked[1].domain, "other.io");
    }

    #[test]
    fn test_top_domains_caps_at_ten() {
        let leads: Vec<EmailCapture> = (0..12)
            .map(|i| lead(&format!("user@domain{}.com", i)))
            .collect();
        assert_eq!(top_domains(&leads).len(), 10);
    }

    #[test]
    fn test_top_domains_skips_unparseable_emails() {
        let leads = vec![lead("no-at-sign"), lead("a@acme.com")];
        let ranked = top_domains(&leads);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].domain, "acme.com");
    }
}
