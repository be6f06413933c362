use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::error_response;
use crate::domain::{ClientFilter, CreateClientInput, UpdateClientInput};
use crate::infrastructure::AppState;

/// Query parameters for listing clients
#[derive(Debug, Deserialize)]
pub struct ListClientsQuery {
    pub owner_id: Option<i32>,
    pub is_active: Option<bool>,
    pub name: Option<String>,
}

/// GET /api/clients - List clients with optional filters
pub async fn list_clients(
    State(state): State<AppState>,
    Query(params): Query<ListClientsQuery>,
) -> impl IntoResponse {
    let filter = ClientFilter {
        owner_id: params.owner_id,
        is_active: params.is_active,
        name: params.name,
    };

    match state.client_repo.find_all(filter).await {
        Ok(clients) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "clients": clients,
                "count": clients.len()
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/clients/:id - Get a single client
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match state.client_repo.find_by_id(id).await {
        Ok(Some(client)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "client": client
            })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "error": "Client not found"
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/clients - Register a new client
pub async fn create_client(
    State(state): State<AppState>,
    Json(input): Json<CreateClientInput>,
) -> impl IntoResponse {
    match state.client_repo.create(input).await {
        Ok(client) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "client": client
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/clients/:id - Update a client
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<UpdateClientInput>,
) -> impl IntoResponse {
    match state.client_repo.update(id, input).await {
        Ok(client) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "client": client
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/clients/:id - Deactivate a client
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match state.client_repo.delete(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Client deactivated"
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
