//! Scheme material mapping service
//!
//! Mappings pre-declare which materials and quantities a scheme expects. They
//! are independent of actual store-in and stock-out movements.

use shared::types::UpsertOutcome;
use shared::validation::{validate_batch, MappingEntry, NewMapping};
use shared::{AuthContext, QuantityMode};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{SchemeMaterialMapping, Upserted};
use crate::services::stock::quantity_on_conflict;
use crate::services::WarehouseService;

/// Mapping service
#[derive(Clone)]
pub struct MappingService {
    db: PgPool,
    quantity_mode: QuantityMode,
}

impl MappingService {
    /// Create a new MappingService instance
    pub fn new(db: PgPool, quantity_mode: QuantityMode) -> Self {
        Self { db, quantity_mode }
    }

    /// Validate every entry, then write them in order
    pub async fn save(
        &self,
        ctx: &AuthContext,
        entries: Vec<MappingEntry>,
    ) -> AppResult<Vec<UpsertOutcome<SchemeMaterialMapping>>> {
        let rows = validate_batch(entries)?;

        let mut outcomes = Vec::with_capacity(rows.len());
        for row in rows {
            outcomes.push(self.upsert(ctx, row).await?);
        }

        Ok(outcomes)
    }

    /// Insert or update the mapping for (scheme, material code)
    pub async fn upsert(
        &self,
        ctx: &AuthContext,
        row: NewMapping,
    ) -> AppResult<UpsertOutcome<SchemeMaterialMapping>> {
        let sql = format!(
            r#"
            INSERT INTO scheme_material_mappings
                (scheme, material_code, material_qty, description, unit,
                 warehouse_id, department_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (scheme, material_code) DO UPDATE SET
                material_qty = {},
                description = COALESCE(EXCLUDED.description, scheme_material_mappings.description),
                unit = COALESCE(EXCLUDED.unit, scheme_material_mappings.unit),
                updated_at = NOW()
            RETURNING *, (xmax = 0) AS created
            "#,
            quantity_on_conflict(self.quantity_mode, "scheme_material_mappings"),
        );

        let upserted = sqlx::query_as::<_, Upserted<SchemeMaterialMapping>>(&sql)
            .bind(&row.scheme)
            .bind(&row.material_code)
            .bind(row.material_qty)
            .bind(&row.description)
            .bind(&row.unit)
            .bind(row.warehouse_id.or(ctx.warehouse_id))
            .bind(ctx.department_id)
            .fetch_one(&self.db)
            .await
            .map_err(|e| AppError::from_db(e, "materialCode"))?;

        Ok(upserted.into_outcome())
    }

    /// List mappings visible to the caller
    pub async fn list(&self, ctx: &AuthContext) -> AppResult<Vec<SchemeMaterialMapping>> {
        let rows = sqlx::query_as::<_, SchemeMaterialMapping>(
            "SELECT * FROM scheme_material_mappings ORDER BY scheme ASC, material_code ASC",
        )
        .fetch_all(&self.db)
        .await?;

        WarehouseService::new(self.db.clone()).scope(ctx, rows).await
    }

    /// Mappings for one scheme
    pub async fn for_scheme(
        &self,
        ctx: &AuthContext,
        scheme: &str,
    ) -> AppResult<Vec<SchemeMaterialMapping>> {
        let rows = sqlx::query_as::<_, SchemeMaterialMapping>(
            "SELECT * FROM scheme_material_mappings WHERE scheme = $1 ORDER BY material_code ASC",
        )
        .bind(scheme)
        .fetch_all(&self.db)
        .await?;

        WarehouseService::new(self.db.clone()).scope(ctx, rows).await
    }

    /// Mapping by ID, if the caller may see it
    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> AppResult<SchemeMaterialMapping> {
        let mapping = sqlx::query_as::<_, SchemeMaterialMapping>(
            "SELECT * FROM scheme_material_mappings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Scheme material mapping".to_string()))?;

        WarehouseService::new(self.db.clone())
            .ensure_visible(ctx, mapping, "Scheme material mapping")
            .await
    }

    /// Delete a mapping
    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> AppResult<()> {
        self.get(ctx, id).await?;

        let result = sqlx::query("DELETE FROM scheme_material_mappings WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Scheme material mapping".to_string()));
        }

        Ok(())
    }
}
