//! Warehouse handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::ApiMessage;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::Warehouse;
use crate::services::warehouse::{CreateWarehouseInput, UpdateWarehouseInput};
use crate::services::WarehouseService;
use crate::AppState;

/// Warehouses visible to the caller
pub async fn list_warehouses(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> AppResult<Json<Vec<Warehouse>>> {
    let warehouses = WarehouseService::new(state.db.clone()).list(&ctx).await?;
    Ok(Json(warehouses))
}

pub async fn get_warehouse(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Warehouse>> {
    let warehouse = WarehouseService::new(state.db.clone()).get(&ctx, id).await?;
    Ok(Json(warehouse))
}

pub async fn create_warehouse(
    State(state): State<AppState>,
    CurrentUser(_ctx): CurrentUser,
    Json(input): Json<CreateWarehouseInput>,
) -> AppResult<(StatusCode, Json<Warehouse>)> {
    let warehouse = WarehouseService::new(state.db.clone()).create(input).await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

pub async fn update_warehouse(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateWarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    let warehouse = WarehouseService::new(state.db.clone()).update(&ctx, id, input).await?;
    Ok(Json(warehouse))
}

pub async fn delete_warehouse(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiMessage>> {
    WarehouseService::new(state.db.clone()).delete(&ctx, id).await?;
    Ok(Json(ApiMessage::new("Warehouse deleted successfully")))
}
