//! Call log review handlers.
//!
//! `GET /api/v1/pages/{id}/calls` lists the voice-call transcripts stored
//! for a page, with date filtering, pagination and a summary block.

use crate::{
    error::AppError, handlers::pages::fetch_owned_page, middleware::auth::AuthContext,
    models::call_log::CallLog, state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hard cap on page size.
const MAX_LIMIT: i64 = 100;

/// Default page size.
const DEFAULT_LIMIT: i64 = 50;

/// Query parameters for list endpoints with date filtering.
#[derive(Debug, Default, Deserialize)]
pub struct CallsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,

    /// Lower bound on created_at (inclusive)
    pub from: Option<DateTime<Utc>>,

    /// Upper bound on created_at (inclusive)
    pub to: Option<DateTime<Utc>>,

    /// Keep only calls the provider's analysis marked (un)successful.
    /// Applied after the fetch since the flag lives inside a JSONB column.
    pub successful: Option<bool>,
}

/// Pagination block shared by the review endpoints.
#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(total: i64, limit: i64, offset: i64) -> Self {
        Self {
            total,
            limit,
            offset,
            has_more: total > offset + limit,
        }
    }
}

/// Clamp requested limit/offset into sane bounds.
pub fn clamp_paging(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

/// Aggregate stats over the returned calls.
#[derive(Debug, Serialize)]
pub struct CallSummary {
    pub total_calls: i64,
    pub successful_calls: i64,
    pub success_rate: i64,
    pub total_duration_seconds: i64,
    pub average_duration_seconds: i64,
    pub total_cost_usd: f64,
}

fn summarize(calls: &[CallLog]) -> CallSummary {
    let total_calls = calls.len() as i64;
    let successful_calls = calls.iter().filter(|call| call.is_successful()).count() as i64;
    let total_duration_seconds: i64 = calls
        .iter()
        .filter_map(|call| call.call_duration_seconds)
        .map(i64::from)
        .sum();
    let total_cost_usd: f64 = calls.iter().filter_map(|call| call.call_cost_usd).sum();

    CallSummary {
        total_calls,
        successful_calls,
        success_rate: if total_calls > 0 {
            (successful_calls as f64 / total_calls as f64 * 100.0).round() as i64
        } else {
            0
        },
        total_duration_seconds,
        average_duration_seconds: if total_calls > 0 {
            (total_duration_seconds as f64 / total_calls as f64).round() as i64
        } else {
            0
        },
        total_cost_usd,
    }
}

/// Response body for the call list endpoint.
#[derive(Debug, Serialize)]
pub struct CallListResponse {
    pub calls: Vec<CallLog>,
    pub pagination: Pagination,
    pub summary: CallSummary,
}

/// List call logs for a page.
///
/// # Endpoint
///
/// `GET /api/v1/pages/{id}/calls?limit=50&offset=0&from=...&to=...&successful=true`
///
/// # Response
///
/// - **Success (200 OK)**: calls (newest first), pagination, summary
/// - **Error (404)**: page doesn't exist
/// - **Error (403)**: page belongs to a different organization
pub async fn list_calls(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(page_id): Path<Uuid>,
    Query(query): Query<CallsQuery>,
) -> Result<Json<CallListResponse>, AppError> {
    let page = fetch_owned_page(&state.pool, page_id, auth.organization_id).await?;
    let (limit, offset) = clamp_paging(query.limit, query.offset);

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM call_logs
        WHERE page_id = $1
          AND ($2::timestamptz IS NULL OR created_at >= $2)
          AND ($3::timestamptz IS NULL OR created_at <= $3)
        "#,
    )
    .bind(page.id)
    .bind(query.from)
    .bind(query.to)
    .fetch_one(&state.pool)
    .await?;

    let calls = sqlx::query_as::<_, CallLog>(
        r#"
        SELECT * FROM call_logs
        WHERE page_id = $1
          AND ($2::timestamptz IS NULL OR created_at >= $2)
          AND ($3::timestamptz IS NULL OR created_at <= $3)
        ORDER BY created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(page.id)
    .bind(query.from)
    .bind(query.to)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    // The success flag lives inside the analysis JSONB, so this filter is
    // applied to the fetched page of results rather than in SQL.
    let calls: Vec<CallLog> = match query.successful {
        Some(wanted) => calls
            .into_iter()
            .filter(|call| call.is_successful() == wanted)
            .collect(),
        None => calls,
    };

    let summary = summarize(&calls);

    Ok(Json(CallListResponse {
        pagination: Pagination::new(total, limit, offset),
        summary,
        calls,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(duration: Option<i32>, cost: Option<f64>, successful: bool) -> CallLog {
        CallLog {
            id: Uuid::new_v4(),
            page_id: Uuid::new_v4(),
            conversation_id: "conv".to_string(),
            agent_id: None,
            call_duration_seconds: duration,
            call_cost_usd: cost,
            started_at: None,
            ended_at: None,
            transcript: None,
            analysis: Some(json!({
                "call_successful": if successful { "success" } else { "failure" }
            })),
            user_email: None,
            company_name: None,
            webhook_payload: json!({}),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_over_mixed_calls() {
        let calls = vec![
            call(Some(120), Some(0.5), true),
            call(Some(60), Some(0.25), false),
            call(None, None, true),
        ];
        let summary = summarize(&calls);

        assert_eq!(summary.total_calls, 3);
        assert_eq!(summary.successful_calls, 2);
        assert_eq!(summary.success_rate, 67);
        assert_eq!(summary.total_duration_seconds, 180);
        assert_eq!(summary.average_duration_seconds, 60);
        assert!((summary.total_cost_usd - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_summary_over_no_calls() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_calls, 0);
        assert_eq!(summary.success_rate, 0);
        assert_eq!(summary.average_duration_seconds, 0);
    }

    #[test]
    fn test_clamp_paging() {
        assert_eq!(clamp_paging(None, None), (50, 0));
        assert_eq!(clamp_paging(Some(500), Some(-3)), (100, 0));
        assert_eq!(clamp_paging(Some(0), Some(10)), (1, 10));
    }

    #[test]
    fn test_pagination_has_more() {
        assert!(Pagination::new(120, 50, 50).has_more);
        assert!(!Pagination::new(100, 50, 50).has_more);
    }
}
