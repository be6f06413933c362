use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::api::error_response;
use crate::services::goal_service;

/// Query parameters for reading a monthly goal
#[derive(Debug, Deserialize)]
pub struct MonthlyGoalQuery {
    pub owner_id: i32,
    pub month: u32,
    pub year: i32,
}

/// Request body for upserting a monthly goal
#[derive(Debug, Deserialize)]
pub struct UpsertMonthlyGoalRequest {
    pub owner_id: i32,
    pub month: u32,
    pub year: i32,
    pub value: f64,
}

/// Query parameters for reading an annual goal
#[derive(Debug, Deserialize)]
pub struct AnnualGoalQuery {
    pub owner_id: i32,
    pub year: i32,
}

/// Request body for upserting an annual goal
#[derive(Debug, Deserialize)]
pub struct UpsertAnnualGoalRequest {
    pub owner_id: i32,
    pub year: i32,
    pub value: f64,
}

/// GET /api/goals/monthly - Read the monthly target for a period
pub async fn get_monthly_goal(
    State(db): State<DatabaseConnection>,
    Query(params): Query<MonthlyGoalQuery>,
) -> impl IntoResponse {
    match goal_service::get_monthly_goal(&db, params.owner_id, params.month, params.year).await {
        Ok(goal) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "goal": goal
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/goals/monthly - Set or replace the monthly target
pub async fn upsert_monthly_goal(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<UpsertMonthlyGoalRequest>,
) -> impl IntoResponse {
    match goal_service::upsert_monthly_goal(
        &db,
        payload.owner_id,
        payload.month,
        payload.year,
        payload.value,
    )
    .await
    {
        Ok(goal) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "goal": goal
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/goals/annual - Read the annual target for a year
pub async fn get_annual_goal(
    State(db): State<DatabaseConnection>,
    Query(params): Query<AnnualGoalQuery>,
) -> impl IntoResponse {
    match goal_service::get_annual_goal(&db, params.owner_id, params.year).await {
        Ok(goal) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "goal": goal
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/goals/annual - Set or replace the annual target
pub async fn upsert_annual_goal(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<UpsertAnnualGoalRequest>,
) -> impl IntoResponse {
    match goal_service::upsert_annual_goal(&db, payload.owner_id, payload.year, payload.value)
        .await
    {
        Ok(goal) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "goal": goal
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
