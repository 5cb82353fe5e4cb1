//! Role management handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use shared::{ApiMessage, UserRole};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::{require_role, CurrentUser};
use crate::models::{Policy, Role};
use crate::services::role::{CreateRoleInput, UpdateRoleInput};
use crate::services::RoleService;
use crate::AppState;

/// Response for list of roles
#[derive(Serialize)]
pub struct RolesResponse {
    pub roles: Vec<Role>,
}

/// Response for the policies of one role
#[derive(Serialize)]
pub struct PoliciesResponse {
    pub policies: Vec<Policy>,
}

/// Get all roles
pub async fn list_roles(
    State(state): State<AppState>,
    CurrentUser(_ctx): CurrentUser,
) -> Result<Json<RolesResponse>, AppError> {
    let role_service = RoleService::new(state.db.clone());
    let roles = role_service.get_roles().await?;

    Ok(Json(RolesResponse { roles }))
}

/// Get a specific role
pub async fn get_role(
    State(state): State<AppState>,
    CurrentUser(_ctx): CurrentUser,
    Path(role_id): Path<Uuid>,
) -> Result<Json<Role>, AppError> {
    let role_service = RoleService::new(state.db.clone());
    let role = role_service.get_role(role_id).await?;

    Ok(Json(role))
}

/// Policies of a role, used by clients to gate what they show
pub async fn get_role_policies(
    State(state): State<AppState>,
    CurrentUser(_ctx): CurrentUser,
    Path(role_id): Path<Uuid>,
) -> Result<Json<PoliciesResponse>, AppError> {
    let role_service = RoleService::new(state.db.clone());
    let policies = role_service.get_policies(role_id).await?;

    Ok(Json(PoliciesResponse { policies }))
}

/// Create a new role
pub async fn create_role(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(input): Json<CreateRoleInput>,
) -> Result<(StatusCode, Json<Role>), AppError> {
    require_role(&ctx, &[UserRole::SuperAdmin])?;

    let role_service = RoleService::new(state.db.clone());
    let role = role_service.create_role(input).await?;

    Ok((StatusCode::CREATED, Json(role)))
}

/// Update a role
pub async fn update_role(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(role_id): Path<Uuid>,
    Json(input): Json<UpdateRoleInput>,
) -> Result<Json<Role>, AppError> {
    require_role(&ctx, &[UserRole::SuperAdmin])?;

    let role_service = RoleService::new(state.db.clone());
    let role = role_service.update_role(role_id, input).await?;

    Ok(Json(role))
}

/// Delete a role
pub async fn delete_role(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(role_id): Path<Uuid>,
) -> Result<Json<ApiMessage>, AppError> {
    require_role(&ctx, &[UserRole::SuperAdmin])?;

    let role_service = RoleService::new(state.db.clone());
    role_service.delete_role(role_id).await?;

    Ok(Json(ApiMessage::new("Role deleted successfully")))
}
