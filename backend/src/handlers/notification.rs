//! HTTP handlers for notification endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use shared::ApiMessage;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::Notification;
use crate::services::notification::{NotificationQuery, NotificationService};
use crate::AppState;

#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[derive(Serialize)]
pub struct MarkAllReadResponse {
    pub updated: i64,
}

/// Notifications addressed to the caller
pub async fn get_notifications(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<NotificationQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let service = NotificationService::new(state.db);
    let notifications = service.list_for_user(current_user.0.user_id, &query).await?;
    Ok(Json(notifications))
}

/// Get unread notification count
pub async fn get_unread_count(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<UnreadCountResponse>> {
    let service = NotificationService::new(state.db);
    let count = service.get_unread_count(current_user.0.user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// Mark notification as read
pub async fn mark_as_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(notification_id): Path<Uuid>,
) -> AppResult<Json<ApiMessage>> {
    let service = NotificationService::new(state.db);
    service
        .mark_as_read(current_user.0.user_id, notification_id)
        .await?;
    Ok(Json(ApiMessage::new("Notification marked as read")))
}

/// Mark all notifications as read
pub async fn mark_all_as_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<MarkAllReadResponse>> {
    let service = NotificationService::new(state.db);
    let updated = service.mark_all_as_read(current_user.0.user_id).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}
