//! Scheme material mapping handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::types::OneOrMany;
use shared::validation::MappingEntry;
use shared::ApiMessage;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::SchemeMaterialMapping;
use crate::services::MappingService;
use crate::AppState;

fn mapping_service(state: &AppState) -> MappingService {
    MappingService::new(state.db.clone(), state.config.stock.quantity_mode)
}

pub async fn list_mappings(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> AppResult<Json<Vec<SchemeMaterialMapping>>> {
    let mappings = mapping_service(&state).list(&ctx).await?;
    Ok(Json(mappings))
}

/// Save one mapping or an array of them.
///
/// A single object answers 201 when it created a row and 200 when it
/// updated one. An array always answers 200 with every outcome.
pub async fn save_mappings(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(body): Json<OneOrMany<MappingEntry>>,
) -> AppResult<Response> {
    let single = body.is_single();
    let mut outcomes = mapping_service(&state).save(&ctx, body.into_vec()).await?;

    if single {
        let outcome = outcomes
            .pop()
            .ok_or_else(|| AppError::Internal("Mapping save returned no rows".to_string()))?;
        let status = if outcome.created {
            StatusCode::CREATED
        } else {
            StatusCode::OK
        };
        return Ok((status, Json(outcome.record)).into_response());
    }

    Ok((StatusCode::OK, Json(outcomes)).into_response())
}

pub async fn get_scheme_mappings(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(scheme): Path<String>,
) -> AppResult<Json<Vec<SchemeMaterialMapping>>> {
    let mappings = mapping_service(&state).for_scheme(&ctx, &scheme).await?;
    Ok(Json(mappings))
}

pub async fn delete_mapping(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiMessage>> {
    mapping_service(&state).delete(&ctx, id).await?;
    Ok(Json(ApiMessage::new("Scheme material mapping deleted successfully")))
}
