//! Scheme handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::ApiMessage;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::Scheme;
use crate::services::scheme::{CreateSchemeInput, UpdateSchemeInput};
use crate::services::SchemeService;
use crate::AppState;

pub async fn list_schemes(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> AppResult<Json<Vec<Scheme>>> {
    let schemes = SchemeService::new(state.db.clone()).list(&ctx).await?;
    Ok(Json(schemes))
}

pub async fn get_scheme(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Scheme>> {
    let scheme = SchemeService::new(state.db.clone()).get(&ctx, id).await?;
    Ok(Json(scheme))
}

pub async fn create_scheme(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(input): Json<CreateSchemeInput>,
) -> AppResult<(StatusCode, Json<Scheme>)> {
    let scheme = SchemeService::new(state.db.clone()).create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(scheme)))
}

pub async fn update_scheme(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateSchemeInput>,
) -> AppResult<Json<Scheme>> {
    let scheme = SchemeService::new(state.db.clone()).update(&ctx, id, input).await?;
    Ok(Json(scheme))
}

pub async fn delete_scheme(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiMessage>> {
    SchemeService::new(state.db.clone()).delete(&ctx, id).await?;
    Ok(Json(ApiMessage::new("Scheme deleted successfully")))
}
