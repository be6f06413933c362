use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::api::error_response;
use crate::models::sale::SaleDto;
use crate::services::sale_service::{self, SaleFilter, SaleUpdate};

/// Request body for registering a sale
#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    pub client_id: i32,
    pub owner_id: i32,
    pub property_type: String,
    pub address: String,
    pub amount: f64,
    /// Defaults to today if not provided
    pub sale_date: Option<String>,
    pub broker_commission_amount: Option<f64>,
    pub agency_commission_amount: Option<f64>,
    pub notes: Option<String>,
}

/// Query parameters for listing sales
#[derive(Debug, Deserialize)]
pub struct ListSalesQuery {
    pub owner_id: Option<i32>,
    pub client_id: Option<i32>,
    pub property_type: Option<String>,
}

/// POST /api/sales - Register a new sale (creates its commission)
pub async fn create_sale(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CreateSaleRequest>,
) -> impl IntoResponse {
    let today = Utc::now().format("%Y-%m-%d").to_string();

    let dto = SaleDto {
        id: None,
        client_id: payload.client_id,
        owner_id: payload.owner_id,
        property_type: payload.property_type,
        address: payload.address,
        amount: payload.amount,
        sale_date: payload.sale_date.unwrap_or(today),
        broker_commission_amount: payload.broker_commission_amount,
        agency_commission_amount: payload.agency_commission_amount,
        notes: payload.notes,
    };

    match sale_service::create_sale(&db, dto).await {
        Ok(sale) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "sale": sale
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/sales - List sales with optional filters
pub async fn list_sales(
    State(db): State<DatabaseConnection>,
    Query(params): Query<ListSalesQuery>,
) -> impl IntoResponse {
    let filter = SaleFilter {
        owner_id: params.owner_id,
        client_id: params.client_id,
        property_type: params.property_type,
    };

    match sale_service::list_sales(&db, filter).await {
        Ok(sales) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "sales": sales,
                "count": sales.len()
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/sales/:id - Get sale details
pub async fn get_sale(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match sale_service::get_sale(&db, id).await {
        Ok(sale) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "sale": sale
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/sales/:id - Update a sale; an amount change marks the commission
/// value as outdated
pub async fn update_sale(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(patch): Json<SaleUpdate>,
) -> impl IntoResponse {
    match sale_service::update_sale(&db, id, patch).await {
        Ok(sale) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "sale": sale
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/sales/:id - Delete a sale (blocked while its commission exists)
pub async fn delete_sale(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match sale_service::delete_sale(&db, id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Sale deleted"
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
