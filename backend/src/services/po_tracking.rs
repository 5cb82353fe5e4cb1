//! Purchase-order tracking ledger

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::AuthContext;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::PoTracking;
use crate::services::WarehouseService;

/// PO tracking service
#[derive(Clone)]
pub struct PoTrackingService {
    db: PgPool,
}

/// Input for creating a ledger line
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePoTrackingInput {
    pub item_code: String,
    pub supplier_name: String,
    pub brand: Option<String>,
    pub po_qty: Decimal,
    #[serde(default)]
    pub received_po_qty: Decimal,
    #[serde(default)]
    pub remaining_qty: Decimal,
    pub warehouse_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
}

/// Input for updating a ledger line; absent fields are kept
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePoTrackingInput {
    pub item_code: Option<String>,
    pub supplier_name: Option<String>,
    pub brand: Option<String>,
    pub po_qty: Option<Decimal>,
    pub received_po_qty: Option<Decimal>,
    pub remaining_qty: Option<Decimal>,
    pub is_active: Option<bool>,
}

fn check_quantities(values: &[Option<Decimal>]) -> AppResult<()> {
    if values.iter().flatten().any(|q| q.is_sign_negative()) {
        return Err(AppError::Validation {
            field: "poQty".to_string(),
            message: "Quantities cannot be negative".to_string(),
        });
    }
    Ok(())
}

impl PoTrackingService {
    /// Create a new PoTrackingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a ledger line
    pub async fn create(
        &self,
        ctx: &AuthContext,
        input: CreatePoTrackingInput,
    ) -> AppResult<PoTracking> {
        if input.item_code.trim().is_empty() || input.supplier_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Item code and supplier name are required".to_string(),
            ));
        }
        check_quantities(&[
            Some(input.po_qty),
            Some(input.received_po_qty),
            Some(input.remaining_qty),
        ])?;

        let record = sqlx::query_as::<_, PoTracking>(
            r#"
            INSERT INTO po_tracking
                (item_code, supplier_name, brand, po_qty, received_po_qty, remaining_qty,
                 warehouse_id, department_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(input.item_code.trim())
        .bind(input.supplier_name.trim())
        .bind(&input.brand)
        .bind(input.po_qty)
        .bind(input.received_po_qty)
        .bind(input.remaining_qty)
        .bind(input.warehouse_id.or(ctx.warehouse_id))
        .bind(input.department_id.or(ctx.department_id))
        .fetch_one(&self.db)
        .await?;

        Ok(record)
    }

    /// List ledger lines visible to the caller
    pub async fn list(&self, ctx: &AuthContext) -> AppResult<Vec<PoTracking>> {
        let records =
            sqlx::query_as::<_, PoTracking>("SELECT * FROM po_tracking ORDER BY created_at DESC")
                .fetch_all(&self.db)
                .await?;

        WarehouseService::new(self.db.clone()).scope(ctx, records).await
    }

    /// Get a ledger line by ID
    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> AppResult<PoTracking> {
        let record = sqlx::query_as::<_, PoTracking>("SELECT * FROM po_tracking WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("PO tracking record".to_string()))?;

        WarehouseService::new(self.db.clone())
            .ensure_visible(ctx, record, "PO tracking record")
            .await
    }

    /// Update a ledger line
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        input: UpdatePoTrackingInput,
    ) -> AppResult<PoTracking> {
        self.get(ctx, id).await?;
        check_quantities(&[input.po_qty, input.received_po_qty, input.remaining_qty])?;

        sqlx::query_as::<_, PoTracking>(
            r#"
            UPDATE po_tracking SET
                item_code = COALESCE($2, item_code),
                supplier_name = COALESCE($3, supplier_name),
                brand = COALESCE($4, brand),
                po_qty = COALESCE($5, po_qty),
                received_po_qty = COALESCE($6, received_po_qty),
                remaining_qty = COALESCE($7, remaining_qty),
                is_active = COALESCE($8, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.item_code.as_deref().map(str::trim))
        .bind(input.supplier_name.as_deref().map(str::trim))
        .bind(&input.brand)
        .bind(input.po_qty)
        .bind(input.received_po_qty)
        .bind(input.remaining_qty)
        .bind(input.is_active)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("PO tracking record".to_string()))
    }

    /// Delete a ledger line
    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> AppResult<()> {
        self.get(ctx, id).await?;

        let result = sqlx::query("DELETE FROM po_tracking WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("PO tracking record".to_string()));
        }

        Ok(())
    }
}
