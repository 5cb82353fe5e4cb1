use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::Scoped;
use sqlx::FromRow;
use uuid::Uuid;

/// Supplier purchase-order ledger line
///
/// `remaining_qty` is whatever the client sent; it is not derived from the
/// other two quantities.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PoTracking {
    pub id: Uuid,
    pub item_code: String,
    pub supplier_name: String,
    pub brand: Option<String>,
    pub po_qty: Decimal,
    pub received_po_qty: Decimal,
    pub remaining_qty: Decimal,
    pub warehouse_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Scoped for PoTracking {
    fn warehouse_id(&self) -> Option<Uuid> {
        self.warehouse_id
    }

    fn department_id(&self) -> Option<Uuid> {
        self.department_id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}
