//! Department handlers
//!
//! Any signed-in user may read departments; writes are for super-admins.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{ApiMessage, UserRole};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::models::Department;
use crate::services::department::{CreateDepartmentInput, UpdateDepartmentInput};
use crate::services::DepartmentService;
use crate::AppState;

pub async fn list_departments(
    State(state): State<AppState>,
    CurrentUser(_ctx): CurrentUser,
) -> AppResult<Json<Vec<Department>>> {
    let departments = DepartmentService::new(state.db.clone()).list().await?;
    Ok(Json(departments))
}

pub async fn get_department(
    State(state): State<AppState>,
    CurrentUser(_ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Department>> {
    let department = DepartmentService::new(state.db.clone()).get(id).await?;
    Ok(Json(department))
}

pub async fn create_department(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(input): Json<CreateDepartmentInput>,
) -> AppResult<(StatusCode, Json<Department>)> {
    require_role(&ctx, &[UserRole::SuperAdmin])?;

    let department = DepartmentService::new(state.db.clone()).create(input).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

pub async fn update_department(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateDepartmentInput>,
) -> AppResult<Json<Department>> {
    require_role(&ctx, &[UserRole::SuperAdmin])?;

    let department = DepartmentService::new(state.db.clone()).update(id, input).await?;
    Ok(Json(department))
}

pub async fn delete_department(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiMessage>> {
    require_role(&ctx, &[UserRole::SuperAdmin])?;

    DepartmentService::new(state.db.clone()).delete(id).await?;
    Ok(Json(ApiMessage::new("Department deleted successfully")))
}
