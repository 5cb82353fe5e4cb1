use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::UserRole;
use sqlx::FromRow;
use uuid::Uuid;

/// Account row. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub role_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> UserRole {
        self.role.parse().unwrap_or(UserRole::Unknown)
    }
}

/// A module and the actions a role may perform on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub module: String,
    pub actions: Vec<String>,
}

/// Named permission policy set
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub policies: sqlx::types::Json<Vec<Policy>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "notification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Unread,
    Read,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub from_user: Option<Uuid>,
    pub to_user: Uuid,
    pub message: String,
    pub status: NotificationStatus,
    pub date: DateTime<Utc>,
}
