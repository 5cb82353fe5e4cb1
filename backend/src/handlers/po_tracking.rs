//! Purchase order tracking handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::ApiMessage;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::PoTracking;
use crate::services::po_tracking::{CreatePoTrackingInput, UpdatePoTrackingInput};
use crate::services::PoTrackingService;
use crate::AppState;

pub async fn list_po_tracking(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> AppResult<Json<Vec<PoTracking>>> {
    let records = PoTrackingService::new(state.db.clone()).list(&ctx).await?;
    Ok(Json(records))
}

pub async fn get_po_tracking(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PoTracking>> {
    let record = PoTrackingService::new(state.db.clone()).get(&ctx, id).await?;
    Ok(Json(record))
}

pub async fn create_po_tracking(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(input): Json<CreatePoTrackingInput>,
) -> AppResult<(StatusCode, Json<PoTracking>)> {
    let record = PoTrackingService::new(state.db.clone()).create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_po_tracking(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePoTrackingInput>,
) -> AppResult<Json<PoTracking>> {
    let record = PoTrackingService::new(state.db.clone()).update(&ctx, id, input).await?;
    Ok(Json(record))
}

pub async fn delete_po_tracking(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiMessage>> {
    PoTrackingService::new(state.db.clone()).delete(&ctx, id).await?;
    Ok(Json(ApiMessage::new("PO tracking entry deleted successfully")))
}
