//! Store-in, stock-out and remaining stock handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use shared::types::UpsertOutcome;
use shared::validation::{StockOutEntry, StoreInEntry};
use shared::{ApiMessage, AuthContext, ReconciledRow};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{StockOut, StoreIn};
use crate::services::{NotificationService, StockService};
use crate::AppState;

/// Response after saving a stock batch
#[derive(Serialize)]
pub struct StockSaveResponse<T> {
    pub message: String,
    pub records: Vec<UpsertOutcome<T>>,
}

fn stock_service(state: &AppState) -> StockService {
    StockService::new(state.db.clone(), state.config.stock.quantity_mode)
}

/// Summarise a saved batch for the notification text
fn change_message(direction: &str, schemes: Vec<&str>, rows: usize) -> String {
    let mut schemes = schemes;
    schemes.sort_unstable();
    schemes.dedup();
    format!("{} {} row(s) saved for scheme {}", direction, rows, schemes.join(", "))
}

async fn notify(state: &AppState, ctx: &AuthContext, message: &str) -> AppResult<()> {
    NotificationService::new(state.db.clone())
        .notify_stock_change(ctx, message)
        .await?;
    Ok(())
}

// ============================================================================
// Store-in
// ============================================================================

pub async fn list_store_in(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> AppResult<Json<Vec<StoreIn>>> {
    let rows = stock_service(&state).list_store_in(&ctx).await?;
    Ok(Json(rows))
}

/// Save a batch of store-in rows, then notify managers and admins
pub async fn save_store_in(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(entries): Json<Vec<StoreInEntry>>,
) -> AppResult<Json<StockSaveResponse<StoreIn>>> {
    let records = stock_service(&state).save_store_in_batch(&ctx, entries).await?;

    let schemes = records.iter().map(|o| o.record.scheme.as_str()).collect();
    notify(&state, &ctx, &change_message("Store-in", schemes, records.len())).await?;

    Ok(Json(StockSaveResponse {
        message: "Store-in data saved successfully".to_string(),
        records,
    }))
}

/// Store-in rows for a scheme; 404 when there are none
pub async fn check_store_in_scheme(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(scheme): Path<String>,
) -> AppResult<Json<Vec<StoreIn>>> {
    let rows = stock_service(&state).check_store_in_scheme(&ctx, &scheme).await?;
    Ok(Json(rows))
}

pub async fn delete_store_in(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiMessage>> {
    stock_service(&state).delete_store_in(&ctx, id).await?;
    Ok(Json(ApiMessage::new("Store-in record deleted successfully")))
}

// ============================================================================
// Stock-out
// ============================================================================

pub async fn list_stock_out(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> AppResult<Json<Vec<StockOut>>> {
    let rows = stock_service(&state).list_stock_out(&ctx).await?;
    Ok(Json(rows))
}

/// Save a batch of stock-out rows, then notify managers and admins
pub async fn save_stock_out(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(entries): Json<Vec<StockOutEntry>>,
) -> AppResult<Json<StockSaveResponse<StockOut>>> {
    let records = stock_service(&state).save_stock_out_batch(&ctx, entries).await?;

    let schemes = records.iter().map(|o| o.record.scheme.as_str()).collect();
    notify(&state, &ctx, &change_message("Stock-out", schemes, records.len())).await?;

    Ok(Json(StockSaveResponse {
        message: "Stock-out data saved successfully".to_string(),
        records,
    }))
}

pub async fn check_stock_out_scheme(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(scheme): Path<String>,
) -> AppResult<Json<Vec<StockOut>>> {
    let rows = stock_service(&state).check_stock_out_scheme(&ctx, &scheme).await?;
    Ok(Json(rows))
}

pub async fn delete_stock_out(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiMessage>> {
    stock_service(&state).delete_stock_out(&ctx, id).await?;
    Ok(Json(ApiMessage::new("Stock-out record deleted successfully")))
}

// ============================================================================
// Remaining stock
// ============================================================================

/// Stock-in minus stock-out per material for a scheme
pub async fn get_remaining_stock(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(scheme): Path<String>,
) -> AppResult<Json<Vec<ReconciledRow>>> {
    let rows = stock_service(&state).remaining_stock(&ctx, &scheme).await?;
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_message_lists_each_scheme_once() {
        let message = change_message("Store-in", vec!["S2", "S1", "S2"], 3);
        assert_eq!(message, "Store-in 3 row(s) saved for scheme S1, S2");
    }
}
