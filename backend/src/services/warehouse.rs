//! Warehouse management service
//!
//! Also resolves the warehouses of a department, which the role filter needs
//! for managers.

use std::collections::HashSet;

use serde::Deserialize;
use shared::{filter_records, is_visible, AuthContext, Scoped};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Warehouse;
use crate::services::DepartmentService;

/// Warehouse service
#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

/// Input for creating a warehouse
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWarehouseInput {
    pub code: String,
    pub name: String,
    pub department_id: Uuid,
    pub city: Option<String>,
    pub area: Option<String>,
    pub is_active: Option<bool>,
}

/// Input for updating a warehouse; absent fields are kept
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWarehouseInput {
    pub code: Option<String>,
    pub name: Option<String>,
    pub department_id: Option<Uuid>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub is_active: Option<bool>,
}

impl WarehouseService {
    /// Create a new WarehouseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn ensure_department(&self, department_id: Uuid) -> AppResult<()> {
        if !DepartmentService::new(self.db.clone()).exists(department_id).await? {
            return Err(AppError::Validation {
                field: "departmentId".to_string(),
                message: "Department does not exist".to_string(),
            });
        }
        Ok(())
    }

    /// Create a warehouse under an existing department
    pub async fn create(&self, input: CreateWarehouseInput) -> AppResult<Warehouse> {
        if input.code.trim().is_empty() || input.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Warehouse code and name are required".to_string(),
            ));
        }
        self.ensure_department(input.department_id).await?;

        sqlx::query_as::<_, Warehouse>(
            r#"
            INSERT INTO warehouses (code, name, department_id, city, area, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(input.code.trim())
        .bind(input.name.trim())
        .bind(input.department_id)
        .bind(&input.city)
        .bind(&input.area)
        .bind(input.is_active.unwrap_or(true))
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "code"))
    }

    /// List warehouses visible to the caller
    pub async fn list(&self, ctx: &AuthContext) -> AppResult<Vec<Warehouse>> {
        let warehouses = sqlx::query_as::<_, Warehouse>("SELECT * FROM warehouses ORDER BY name ASC")
            .fetch_all(&self.db)
            .await?;

        self.scope(ctx, warehouses).await
    }

    /// Get a warehouse by ID, if the caller may see it
    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> AppResult<Warehouse> {
        let warehouse = sqlx::query_as::<_, Warehouse>("SELECT * FROM warehouses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))?;

        self.ensure_visible(ctx, warehouse, "Warehouse").await
    }

    /// Update a warehouse
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        input: UpdateWarehouseInput,
    ) -> AppResult<Warehouse> {
        self.get(ctx, id).await?;
        if let Some(department_id) = input.department_id {
            self.ensure_department(department_id).await?;
        }

        sqlx::query_as::<_, Warehouse>(
            r#"
            UPDATE warehouses SET
                code = COALESCE($2, code),
                name = COALESCE($3, name),
                department_id = COALESCE($4, department_id),
                city = COALESCE($5, city),
                area = COALESCE($6, area),
                is_active = COALESCE($7, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.code.as_deref().map(str::trim))
        .bind(input.name.as_deref().map(str::trim))
        .bind(input.department_id)
        .bind(&input.city)
        .bind(&input.area)
        .bind(input.is_active)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "code"))?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))
    }

    /// Delete a warehouse
    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> AppResult<()> {
        self.get(ctx, id).await?;

        let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        Ok(())
    }

    /// IDs of warehouses belonging to a department
    pub async fn department_warehouse_ids(&self, department_id: Uuid) -> AppResult<HashSet<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM warehouses WHERE department_id = $1")
            .bind(department_id)
            .fetch_all(&self.db)
            .await?;

        Ok(ids.into_iter().collect())
    }

    async fn caller_department_warehouses(&self, ctx: &AuthContext) -> AppResult<HashSet<Uuid>> {
        match ctx.department_id {
            Some(department_id) if ctx.needs_department_warehouses() => {
                self.department_warehouse_ids(department_id).await
            }
            _ => Ok(HashSet::new()),
        }
    }

    /// Narrow fetched records to what the caller may see
    pub async fn scope<T: Scoped + Send>(&self, ctx: &AuthContext, records: Vec<T>) -> AppResult<Vec<T>> {
        let department_warehouses = self.caller_department_warehouses(ctx).await?;
        Ok(filter_records(records, ctx, &department_warehouses))
    }

    /// Pass `record` through if the caller may see it. Records outside the
    /// caller's scope are reported as missing, so their existence is not
    /// leaked.
    pub async fn ensure_visible<T: Scoped + Send>(
        &self,
        ctx: &AuthContext,
        record: T,
        what: &str,
    ) -> AppResult<T> {
        let department_warehouses = self.caller_department_warehouses(ctx).await?;
        if is_visible(&record, ctx, &department_warehouses) {
            Ok(record)
        } else {
            Err(AppError::NotFound(what.to_string()))
        }
    }
}
