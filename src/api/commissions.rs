use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::api::error_response;
use crate::models::receipt::ReceiptDto;
use crate::services::commission_service::{self, CommissionAmountsPatch, CommissionFilter};

/// Query parameters for listing commissions
#[derive(Debug, Deserialize)]
pub struct ListCommissionsQuery {
    pub owner_id: Option<i32>,
    pub status: Option<String>,
    pub value_status: Option<String>,
}

/// Request body for a manual payment-status override
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// Request body for justifying an outdated commission value
#[derive(Debug, Deserialize)]
pub struct JustifyRequest {
    pub justification: String,
}

/// GET /api/commissions - List commissions with receipt totals
pub async fn list_commissions(
    State(db): State<DatabaseConnection>,
    Query(params): Query<ListCommissionsQuery>,
) -> impl IntoResponse {
    let filter = CommissionFilter {
        owner_id: params.owner_id,
        status: params.status,
        value_status: params.value_status,
    };

    match commission_service::list_commissions(&db, filter).await {
        Ok(commissions) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "commissions": commissions,
                "count": commissions.len()
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/commissions/:id - Commission with its payment history
pub async fn get_commission(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match commission_service::get_commission(&db, id).await {
        Ok(details) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "commission": details.commission,
                "receipts": details.receipts,
                "total_received": details.total_received,
                "remaining": details.remaining
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/commissions/:id/amounts - Edit the agency/broker split
pub async fn update_amounts(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(patch): Json<CommissionAmountsPatch>,
) -> impl IntoResponse {
    match commission_service::update_amounts(&db, id, patch).await {
        Ok(commission) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "commission": commission
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/commissions/:id/status - Manual payment-status override
pub async fn set_status(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<SetStatusRequest>,
) -> impl IntoResponse {
    match commission_service::set_status(&db, id, &payload.status).await {
        Ok(commission) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "commission": commission
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/commissions/:id/justify - Acknowledge an outdated value
pub async fn justify(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<JustifyRequest>,
) -> impl IntoResponse {
    match commission_service::justify(&db, id, &payload.justification).await {
        Ok(commission) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "commission": commission
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/commissions/:id/receipts - Record a partial payment
pub async fn post_receipt(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(dto): Json<ReceiptDto>,
) -> impl IntoResponse {
    match commission_service::post_receipt(&db, id, dto).await {
        Ok((commission, receipt)) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "commission": commission,
                "receipt": receipt
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/commissions/:id/receipts - Payment history
pub async fn list_receipts(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match commission_service::list_receipts(&db, id).await {
        Ok(receipts) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "receipts": receipts,
                "count": receipts.len()
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/commissions/:id - Manual terminal deletion
pub async fn delete_commission(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match commission_service::delete_commission(&db, id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Commission deleted"
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
