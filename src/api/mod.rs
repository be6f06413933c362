pub mod clients;
pub mod commissions;
pub mod dashboard;
pub mod goals;
pub mod health;
pub mod sales;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::json;

use crate::domain::DomainError;
use crate::infrastructure::AppState;

/// Translate a domain error into the JSON error envelope
pub(crate) fn error_response(err: DomainError) -> Response {
    let (status, message) = match &err {
        DomainError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
        DomainError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        DomainError::ReferentialIntegrity(msg) => (StatusCode::CONFLICT, msg.clone()),
        DomainError::Consistency(msg) => (StatusCode::CONFLICT, msg.clone()),
        DomainError::Database(_) | DomainError::Internal(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    };

    (
        status,
        Json(json!({
            "success": false,
            "error": message
        })),
    )
        .into_response()
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Clients
        .route(
            "/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route(
            "/clients/:id",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        // Sales
        .route("/sales", get(sales::list_sales).post(sales::create_sale))
        .route(
            "/sales/:id",
            get(sales::get_sale)
                .put(sales::update_sale)
                .delete(sales::delete_sale),
        )
        // Commissions
        .route("/commissions", get(commissions::list_commissions))
        .route(
            "/commissions/:id",
            get(commissions::get_commission).delete(commissions::delete_commission),
        )
        .route(
            "/commissions/:id/amounts",
            put(commissions::update_amounts),
        )
        .route("/commissions/:id/status", put(commissions::set_status))
        .route("/commissions/:id/justify", post(commissions::justify))
        .route(
            "/commissions/:id/receipts",
            get(commissions::list_receipts).post(commissions::post_receipt),
        )
        // Goals
        .route(
            "/goals/monthly",
            get(goals::get_monthly_goal).post(goals::upsert_monthly_goal),
        )
        .route(
            "/goals/annual",
            get(goals::get_annual_goal).post(goals::upsert_annual_goal),
        )
        // Dashboard
        .route("/dashboard/summary", get(dashboard::monthly_summary))
        .route("/dashboard/annual", get(dashboard::annual_rollup))
        .with_state(state)
}
