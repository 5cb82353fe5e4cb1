//! Scheme management service

use serde::Deserialize;
use shared::AuthContext;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Scheme;
use crate::services::WarehouseService;

/// Scheme service
#[derive(Clone)]
pub struct SchemeService {
    db: PgPool,
}

/// Input for creating a scheme
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchemeInput {
    pub code: String,
    pub name: String,
    pub warehouse_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Input for updating a scheme; absent fields are kept
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSchemeInput {
    pub code: Option<String>,
    pub name: Option<String>,
    pub warehouse_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

impl SchemeService {
    /// Create a new SchemeService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a scheme
    pub async fn create(&self, ctx: &AuthContext, input: CreateSchemeInput) -> AppResult<Scheme> {
        if input.code.trim().is_empty() || input.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Scheme code and name are required".to_string(),
            ));
        }

        sqlx::query_as::<_, Scheme>(
            r#"
            INSERT INTO schemes (code, name, warehouse_id, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(input.code.trim())
        .bind(input.name.trim())
        .bind(input.warehouse_id.or(ctx.warehouse_id))
        .bind(input.is_active.unwrap_or(true))
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "code"))
    }

    /// List schemes visible to the caller
    pub async fn list(&self, ctx: &AuthContext) -> AppResult<Vec<Scheme>> {
        let schemes = sqlx::query_as::<_, Scheme>("SELECT * FROM schemes ORDER BY code ASC")
            .fetch_all(&self.db)
            .await?;

        WarehouseService::new(self.db.clone()).scope(ctx, schemes).await
    }

    /// Get a scheme by ID
    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> AppResult<Scheme> {
        let record = sqlx::query_as::<_, Scheme>("SELECT * FROM schemes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Scheme".to_string()))?;

        WarehouseService::new(self.db.clone())
            .ensure_visible(ctx, record, "Scheme")
            .await
    }

    /// Update a scheme
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        input: UpdateSchemeInput,
    ) -> AppResult<Scheme> {
        self.get(ctx, id).await?;
        sqlx::query_as::<_, Scheme>(
            r#"
            UPDATE schemes SET
                code = COALESCE($2, code),
                name = COALESCE($3, name),
                warehouse_id = COALESCE($4, warehouse_id),
                is_active = COALESCE($5, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.code.as_deref().map(str::trim))
        .bind(input.name.as_deref().map(str::trim))
        .bind(input.warehouse_id)
        .bind(input.is_active)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "code"))?
        .ok_or_else(|| AppError::NotFound("Scheme".to_string()))
    }

    /// Delete a scheme
    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> AppResult<()> {
        self.get(ctx, id).await?;

        let result = sqlx::query("DELETE FROM schemes WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Scheme".to_string()));
        }

        Ok(())
    }
}
