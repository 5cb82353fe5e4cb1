//! Department management service

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Department;

/// Department service
#[derive(Clone)]
pub struct DepartmentService {
    db: PgPool,
}

/// Input for creating a department
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentInput {
    pub code: String,
    pub name: String,
    pub is_active: Option<bool>,
}

/// Input for updating a department; absent fields are kept
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartmentInput {
    pub code: Option<String>,
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

impl DepartmentService {
    /// Create a new DepartmentService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a department
    pub async fn create(&self, input: CreateDepartmentInput) -> AppResult<Department> {
        if input.code.trim().is_empty() || input.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Department code and name are required".to_string(),
            ));
        }

        sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO departments (code, name, is_active)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(input.code.trim())
        .bind(input.name.trim())
        .bind(input.is_active.unwrap_or(true))
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "code"))
    }

    /// List all departments
    pub async fn list(&self) -> AppResult<Vec<Department>> {
        let departments =
            sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY name ASC")
                .fetch_all(&self.db)
                .await?;

        Ok(departments)
    }

    /// Get a department by ID
    pub async fn get(&self, id: Uuid) -> AppResult<Department> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Department".to_string()))
    }

    /// Check that a department exists
    pub async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM departments WHERE id = $1")
            .bind(id)
            .fetch_one(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Update a department
    pub async fn update(&self, id: Uuid, input: UpdateDepartmentInput) -> AppResult<Department> {
        sqlx::query_as::<_, Department>(
            r#"
            UPDATE departments SET
                code = COALESCE($2, code),
                name = COALESCE($3, name),
                is_active = COALESCE($4, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.code.as_deref().map(str::trim))
        .bind(input.name.as_deref().map(str::trim))
        .bind(input.is_active)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "code"))?
        .ok_or_else(|| AppError::NotFound("Department".to_string()))
    }

    /// Delete a department
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Department".to_string()));
        }

        Ok(())
    }
}
