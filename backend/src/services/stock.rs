//! Stock movement service: store-in, stock-out and remaining stock
//!
//! Both movement tables are keyed by (scheme, material_code). Writing a row
//! whose key already exists updates it in place; the quantity follows the
//! configured [`QuantityMode`].

use chrono::Utc;
use shared::types::UpsertOutcome;
use shared::validation::{validate_batch, NewStockOut, NewStoreIn, StockOutEntry, StoreInEntry};
use shared::{reconcile, AuthContext, QuantityMode, ReconciledRow, StockLine};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{StockOut, StoreIn, Upserted};
use crate::services::WarehouseService;

/// SET expression for `material_qty` in an `ON CONFLICT DO UPDATE` on
/// `table`, following the configured quantity policy
pub(crate) fn quantity_on_conflict(mode: QuantityMode, table: &str) -> String {
    match mode {
        QuantityMode::Overwrite => "EXCLUDED.material_qty".to_string(),
        QuantityMode::Accumulate => format!("{}.material_qty + EXCLUDED.material_qty", table),
    }
}

/// Stock movement service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
    quantity_mode: QuantityMode,
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool, quantity_mode: QuantityMode) -> Self {
        Self { db, quantity_mode }
    }

    fn scoper(&self) -> WarehouseService {
        WarehouseService::new(self.db.clone())
    }

    // ========================================================================
    // Store-in
    // ========================================================================

    /// Validate the whole batch, then write rows one at a time.
    ///
    /// A failure part way through leaves earlier rows committed.
    pub async fn save_store_in_batch(
        &self,
        ctx: &AuthContext,
        entries: Vec<StoreInEntry>,
    ) -> AppResult<Vec<UpsertOutcome<StoreIn>>> {
        let rows = validate_batch(entries)?;

        let mut outcomes = Vec::with_capacity(rows.len());
        for row in rows {
            outcomes.push(self.upsert_store_in(ctx, row).await?);
        }

        tracing::info!(
            user_id = %ctx.user_id,
            rows = outcomes.len(),
            created = outcomes.iter().filter(|o| o.created).count(),
            "Saved store-in batch"
        );

        Ok(outcomes)
    }

    /// Insert or update the store-in row for (scheme, material code)
    ///
    /// One statement, so concurrent writers of the same key serialize on the
    /// unique index instead of racing between a read and a write.
    pub async fn upsert_store_in(
        &self,
        ctx: &AuthContext,
        row: NewStoreIn,
    ) -> AppResult<UpsertOutcome<StoreIn>> {
        let sql = format!(
            r#"
            INSERT INTO store_in
                (scheme, material_code, material_qty, description, unit, notes,
                 warehouse_id, department_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (scheme, material_code) DO UPDATE SET
                material_qty = {},
                description = EXCLUDED.description,
                unit = COALESCE(EXCLUDED.unit, store_in.unit),
                notes = COALESCE(EXCLUDED.notes, store_in.notes),
                updated_at = NOW()
            RETURNING *, (xmax = 0) AS created
            "#,
            quantity_on_conflict(self.quantity_mode, "store_in"),
        );

        let upserted = sqlx::query_as::<_, Upserted<StoreIn>>(&sql)
            .bind(&row.scheme)
            .bind(&row.material_code)
            .bind(row.material_qty)
            .bind(&row.description)
            .bind(&row.unit)
            .bind(&row.notes)
            .bind(row.warehouse_id.or(ctx.warehouse_id))
            .bind(ctx.department_id)
            .bind(ctx.user_id)
            .fetch_one(&self.db)
            .await
            .map_err(|e| AppError::from_db(e, "materialCode"))?;

        Ok(upserted.into_outcome())
    }

    /// List store-in rows visible to the caller
    pub async fn list_store_in(&self, ctx: &AuthContext) -> AppResult<Vec<StoreIn>> {
        let rows = sqlx::query_as::<_, StoreIn>(
            "SELECT * FROM store_in ORDER BY scheme ASC, created_at ASC",
        )
        .fetch_all(&self.db)
        .await?;

        self.scoper().scope(ctx, rows).await
    }

    /// Store-in rows for one scheme, oldest first
    pub async fn store_in_for_scheme(
        &self,
        ctx: &AuthContext,
        scheme: &str,
    ) -> AppResult<Vec<StoreIn>> {
        let rows = sqlx::query_as::<_, StoreIn>(
            "SELECT * FROM store_in WHERE scheme = $1 ORDER BY created_at ASC",
        )
        .bind(scheme)
        .fetch_all(&self.db)
        .await?;

        self.scoper().scope(ctx, rows).await
    }

    /// Like [`Self::store_in_for_scheme`] but an empty result is a 404
    pub async fn check_store_in_scheme(
        &self,
        ctx: &AuthContext,
        scheme: &str,
    ) -> AppResult<Vec<StoreIn>> {
        let rows = self.store_in_for_scheme(ctx, scheme).await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(format!("Store-in records for scheme {}", scheme)));
        }
        Ok(rows)
    }

    /// Store-in row by ID, if the caller may see it
    pub async fn get_store_in(&self, ctx: &AuthContext, id: Uuid) -> AppResult<StoreIn> {
        let row = sqlx::query_as::<_, StoreIn>("SELECT * FROM store_in WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Store-in record".to_string()))?;

        self.scoper().ensure_visible(ctx, row, "Store-in record").await
    }

    /// Delete a store-in row
    pub async fn delete_store_in(&self, ctx: &AuthContext, id: Uuid) -> AppResult<()> {
        self.get_store_in(ctx, id).await?;

        let result = sqlx::query("DELETE FROM store_in WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Store-in record".to_string()));
        }

        Ok(())
    }

    // ========================================================================
    // Stock-out
    // ========================================================================

    /// Validate the whole batch, then write rows one at a time.
    pub async fn save_stock_out_batch(
        &self,
        ctx: &AuthContext,
        entries: Vec<StockOutEntry>,
    ) -> AppResult<Vec<UpsertOutcome<StockOut>>> {
        let rows = validate_batch(entries)?;

        let mut outcomes = Vec::with_capacity(rows.len());
        for row in rows {
            outcomes.push(self.upsert_stock_out(ctx, row).await?);
        }

        tracing::info!(
            user_id = %ctx.user_id,
            rows = outcomes.len(),
            created = outcomes.iter().filter(|o| o.created).count(),
            "Saved stock-out batch"
        );

        Ok(outcomes)
    }

    /// Insert or update the stock-out row for (scheme, material code)
    pub async fn upsert_stock_out(
        &self,
        ctx: &AuthContext,
        row: NewStockOut,
    ) -> AppResult<UpsertOutcome<StockOut>> {
        let sql = format!(
            r#"
            INSERT INTO stock_out
                (scheme, material_code, material_qty, description, receiver_name, unit,
                 area_code, address, warehouse_id, department_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (scheme, material_code) DO UPDATE SET
                material_qty = {},
                description = EXCLUDED.description,
                receiver_name = EXCLUDED.receiver_name,
                unit = EXCLUDED.unit,
                area_code = EXCLUDED.area_code,
                address = EXCLUDED.address,
                updated_at = NOW()
            RETURNING *, (xmax = 0) AS created
            "#,
            quantity_on_conflict(self.quantity_mode, "stock_out"),
        );

        let upserted = sqlx::query_as::<_, Upserted<StockOut>>(&sql)
            .bind(&row.scheme)
            .bind(&row.material_code)
            .bind(row.material_qty)
            .bind(&row.description)
            .bind(&row.receiver_name)
            .bind(&row.unit)
            .bind(&row.area_code)
            .bind(&row.address)
            .bind(row.warehouse_id.or(ctx.warehouse_id))
            .bind(ctx.department_id)
            .bind(ctx.user_id)
            .fetch_one(&self.db)
            .await
            .map_err(|e| AppError::from_db(e, "materialCode"))?;

        Ok(upserted.into_outcome())
    }

    /// List stock-out rows visible to the caller
    pub async fn list_stock_out(&self, ctx: &AuthContext) -> AppResult<Vec<StockOut>> {
        let rows = sqlx::query_as::<_, StockOut>(
            "SELECT * FROM stock_out ORDER BY scheme ASC, created_at ASC",
        )
        .fetch_all(&self.db)
        .await?;

        self.scoper().scope(ctx, rows).await
    }

    /// Stock-out rows for one scheme, oldest first
    pub async fn stock_out_for_scheme(
        &self,
        ctx: &AuthContext,
        scheme: &str,
    ) -> AppResult<Vec<StockOut>> {
        let rows = sqlx::query_as::<_, StockOut>(
            "SELECT * FROM stock_out WHERE scheme = $1 ORDER BY created_at ASC",
        )
        .bind(scheme)
        .fetch_all(&self.db)
        .await?;

        self.scoper().scope(ctx, rows).await
    }

    /// Like [`Self::stock_out_for_scheme`] but an empty result is a 404
    pub async fn check_stock_out_scheme(
        &self,
        ctx: &AuthContext,
        scheme: &str,
    ) -> AppResult<Vec<StockOut>> {
        let rows = self.stock_out_for_scheme(ctx, scheme).await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(format!("Stock-out records for scheme {}", scheme)));
        }
        Ok(rows)
    }

    /// Stock-out row by ID, if the caller may see it
    pub async fn get_stock_out(&self, ctx: &AuthContext, id: Uuid) -> AppResult<StockOut> {
        let row = sqlx::query_as::<_, StockOut>("SELECT * FROM stock_out WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Stock-out record".to_string()))?;

        self.scoper().ensure_visible(ctx, row, "Stock-out record").await
    }

    /// Delete a stock-out row
    pub async fn delete_stock_out(&self, ctx: &AuthContext, id: Uuid) -> AppResult<()> {
        self.get_stock_out(ctx, id).await?;

        let result = sqlx::query("DELETE FROM stock_out WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Stock-out record".to_string()));
        }

        Ok(())
    }

    // ========================================================================
    // Remaining stock
    // ========================================================================

    /// Reconcile both sides of a scheme as of today.
    ///
    /// Both sides are fetched concurrently. A side that fails to load is
    /// logged and treated as empty, so the result may be partial.
    pub async fn remaining_stock(
        &self,
        ctx: &AuthContext,
        scheme: &str,
    ) -> AppResult<Vec<ReconciledRow>> {
        let (stock_in, stock_out) = tokio::join!(
            self.store_in_for_scheme(ctx, scheme),
            self.stock_out_for_scheme(ctx, scheme),
        );

        let stock_in: Vec<StockLine> = match stock_in {
            Ok(rows) => rows.iter().map(StockLine::from).collect(),
            Err(e) => {
                tracing::warn!(scheme, "Store-in fetch failed, reconciling without it: {}", e);
                Vec::new()
            }
        };
        let stock_out: Vec<StockLine> = match stock_out {
            Ok(rows) => rows.iter().map(StockLine::from).collect(),
            Err(e) => {
                tracing::warn!(scheme, "Stock-out fetch failed, reconciling without it: {}", e);
                Vec::new()
            }
        };

        Ok(reconcile(scheme, &stock_in, &stock_out, Utc::now().date_naive()))
    }
}
