use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::types::UpsertOutcome;
use shared::{Scoped, StockLine};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

/// Material received under a scheme. Unique per (scheme, material_code).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StoreIn {
    pub id: Uuid,
    pub scheme: String,
    pub material_code: String,
    pub material_qty: i64,
    pub description: String,
    pub unit: Option<String>,
    pub notes: Option<String>,
    pub warehouse_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Material dispatched under a scheme. Unique per (scheme, material_code).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockOut {
    pub id: Uuid,
    pub scheme: String,
    pub material_code: String,
    pub material_qty: i64,
    pub description: String,
    pub receiver_name: String,
    pub unit: String,
    pub area_code: String,
    pub address: String,
    pub warehouse_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Planned quantity of a material under a scheme
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SchemeMaterialMapping {
    pub id: Uuid,
    pub scheme: String,
    pub material_code: String,
    pub material_qty: i64,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub warehouse_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row returned by an `ON CONFLICT DO UPDATE` upsert: the stored record
/// plus a `created` column computed as `xmax = 0`.
#[derive(Debug)]
pub struct Upserted<T> {
    pub record: T,
    pub created: bool,
}

impl<'r, T> FromRow<'r, PgRow> for Upserted<T>
where
    T: FromRow<'r, PgRow>,
{
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            record: T::from_row(row)?,
            created: row.try_get("created")?,
        })
    }
}

impl<T> Upserted<T> {
    pub fn into_outcome(self) -> UpsertOutcome<T> {
        UpsertOutcome {
            created: self.created,
            record: self.record,
        }
    }
}

macro_rules! scoped_by_location {
    ($($ty:ty),*) => {
        $(
            impl Scoped for $ty {
                fn warehouse_id(&self) -> Option<Uuid> {
                    self.warehouse_id
                }

                fn department_id(&self) -> Option<Uuid> {
                    self.department_id
                }
            }
        )*
    };
}

scoped_by_location!(StoreIn, StockOut, SchemeMaterialMapping);

impl From<&StoreIn> for StockLine {
    fn from(row: &StoreIn) -> Self {
        StockLine {
            material_code: row.material_code.clone(),
            material_qty: row.material_qty,
            description: Some(row.description.clone()),
            unit: row.unit.clone(),
        }
    }
}

impl From<&StockOut> for StockLine {
    fn from(row: &StockOut) -> Self {
        StockLine {
            material_code: row.material_code.clone(),
            material_qty: row.material_qty,
            description: Some(row.description.clone()),
            unit: Some(row.unit.clone()),
        }
    }
}
