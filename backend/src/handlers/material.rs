//! Material handlers, including JSON export and import

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::ApiMessage;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::Material;
use crate::services::material::{CreateMaterialInput, UpdateMaterialInput};
use crate::services::MaterialService;
use crate::AppState;

/// Result of a material upload
#[derive(Serialize)]
pub struct ImportResponse {
    pub message: String,
    pub imported: usize,
}

pub async fn list_materials(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> AppResult<Json<Vec<Material>>> {
    let materials = MaterialService::new(state.db.clone()).list(&ctx).await?;
    Ok(Json(materials))
}

pub async fn get_material(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Material>> {
    let material = MaterialService::new(state.db.clone()).get(&ctx, id).await?;
    Ok(Json(material))
}

pub async fn create_material(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(input): Json<CreateMaterialInput>,
) -> AppResult<(StatusCode, Json<Material>)> {
    let material = MaterialService::new(state.db.clone()).create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(material)))
}

pub async fn update_material(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateMaterialInput>,
) -> AppResult<Json<Material>> {
    let material = MaterialService::new(state.db.clone()).update(&ctx, id, input).await?;
    Ok(Json(material))
}

pub async fn delete_material(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiMessage>> {
    MaterialService::new(state.db.clone()).delete(&ctx, id).await?;
    Ok(Json(ApiMessage::new("Material deleted successfully")))
}

/// Download the caller's materials as a JSON file
pub async fn download_materials(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> AppResult<Response> {
    let body = MaterialService::new(state.db.clone()).export_json(&ctx).await?;

    let headers = [
        (header::CONTENT_TYPE, "application/json"),
        (header::CONTENT_DISPOSITION, "attachment; filename=\"materials.json\""),
    ];

    Ok((headers, body).into_response())
}

/// Import materials from the multipart field `file`
pub async fn upload_materials(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ImportResponse>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("Failed to read multipart data: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::ValidationError(format!("Failed to read file data: {}", e)))?;

        let imported = MaterialService::new(state.db.clone())
            .import_json(&ctx, &data)
            .await?;

        return Ok((
            StatusCode::CREATED,
            Json(ImportResponse {
                message: "Materials imported successfully".to_string(),
                imported: imported.len(),
            }),
        ));
    }

    Err(AppError::Validation {
        field: "file".to_string(),
        message: "No file uploaded".to_string(),
    })
}
