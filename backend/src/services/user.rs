//! User account management
//!
//! Deleting a user only sets `is_deleted`; such accounts disappear from
//! listings and can no longer log in.

use bcrypt::{hash, DEFAULT_COST};
use serde::Deserialize;
use shared::UserRole;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::User;

/// User service
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// Input for updating a user; absent fields are kept
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub role_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List users that are not soft-deleted
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE is_deleted = false ORDER BY created_at DESC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }

    /// Get an active user by ID
    pub async fn get(&self, id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND is_deleted = false")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// Active users holding a role, optionally within one department
    pub async fn ids_with_role(
        &self,
        role: UserRole,
        department_id: Option<Uuid>,
    ) -> AppResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM users
            WHERE role = $1
              AND is_deleted = false
              AND ($2::uuid IS NULL OR department_id = $2)
            ORDER BY created_at ASC
            "#,
        )
        .bind(role.as_str())
        .bind(department_id)
        .fetch_all(&self.db)
        .await?;

        Ok(ids)
    }

    /// Update a user
    pub async fn update(&self, id: Uuid, input: UpdateUserInput) -> AppResult<User> {
        if let Some(role) = input.role {
            if !role.is_assignable() {
                return Err(AppError::Validation {
                    field: "role".to_string(),
                    message: "Unknown role".to_string(),
                });
            }
        }

        let password_hash = match input.password.as_deref() {
            Some(p) if p.len() < 6 => {
                return Err(AppError::Validation {
                    field: "password".to_string(),
                    message: "Password must be at least 6 characters".to_string(),
                })
            }
            Some(p) => Some(
                hash(p, DEFAULT_COST)
                    .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?,
            ),
            None => None,
        };

        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE(LOWER($3), email),
                password_hash = COALESCE($4, password_hash),
                role = COALESCE($5, role),
                role_id = COALESCE($6, role_id),
                warehouse_id = COALESCE($7, warehouse_id),
                department_id = COALESCE($8, department_id)
            WHERE id = $1 AND is_deleted = false
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name.as_deref().map(str::trim))
        .bind(input.email.as_deref().map(str::trim))
        .bind(password_hash)
        .bind(input.role.map(|r| r.as_str()))
        .bind(input.role_id)
        .bind(input.warehouse_id)
        .bind(input.department_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "email"))?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// Soft-delete a user
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET is_deleted = true WHERE id = $1 AND is_deleted = false",
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        tracing::info!("Soft-deleted user {}", id);

        Ok(())
    }
}
