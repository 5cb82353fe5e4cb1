//! Authentication and user account handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{ApiMessage, UserRole};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::{require_role, CurrentUser};
use crate::models::User;
use crate::services::auth::{LoginResponse, RegisterInput};
use crate::services::user::UpdateUserInput;
use crate::services::{AuthService, UserService};
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Register endpoint handler
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<(StatusCode, Json<User>)> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let user = auth_service.register(input).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let response = auth_service.login(&body.email, &body.password).await?;

    tracing::info!(user_id = %response.user.id, "User logged in");

    Ok(Json(response))
}

/// List accounts that have not been deleted
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(_ctx): CurrentUser,
) -> AppResult<Json<Vec<User>>> {
    let users = UserService::new(state.db.clone()).list().await?;
    Ok(Json(users))
}

/// Account of the caller
pub async fn get_me(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> AppResult<Json<User>> {
    let user = UserService::new(state.db.clone()).get(ctx.user_id).await?;
    Ok(Json(user))
}

pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(_ctx): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<User>> {
    let user = UserService::new(state.db.clone()).get(user_id).await?;
    Ok(Json(user))
}

/// Update an account. Only super-admins may edit someone else.
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<User>> {
    if !ctx.is_super_admin() && (user_id != ctx.user_id || input.role.is_some()) {
        return Err(AppError::InsufficientPermissions);
    }

    let user = UserService::new(state.db.clone()).update(user_id, input).await?;
    Ok(Json(user))
}

/// Soft-delete an account
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiMessage>> {
    require_role(&ctx, &[UserRole::SuperAdmin])?;

    UserService::new(state.db.clone()).soft_delete(user_id).await?;

    Ok(Json(ApiMessage::new("User deleted successfully")))
}
