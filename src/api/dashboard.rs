use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Datelike, Utc};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::api::error_response;
use crate::services::goal_service;

/// Query parameters for the monthly dashboard summary
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub owner_id: i32,
    /// Defaults to the current month
    pub month: Option<u32>,
    /// Defaults to the current year
    pub year: Option<i32>,
}

/// Query parameters for the annual chart rollup
#[derive(Debug, Deserialize)]
pub struct AnnualQuery {
    pub owner_id: i32,
    pub year: Option<i32>,
}

/// GET /api/dashboard/summary - Received, pending and goal progress for a month
pub async fn monthly_summary(
    State(db): State<DatabaseConnection>,
    Query(params): Query<SummaryQuery>,
) -> impl IntoResponse {
    let today = Utc::now();
    let month = params.month.unwrap_or(today.month());
    let year = params.year.unwrap_or(today.year());

    match goal_service::monthly_summary(&db, params.owner_id, month, year).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "summary": summary
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/dashboard/annual - Twelve monthly buckets plus the annual target
pub async fn annual_rollup(
    State(db): State<DatabaseConnection>,
    Query(params): Query<AnnualQuery>,
) -> impl IntoResponse {
    let year = params.year.unwrap_or_else(|| Utc::now().year());

    match goal_service::annual_rollup(&db, params.owner_id, year).await {
        Ok(rollup) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "rollup": rollup
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
