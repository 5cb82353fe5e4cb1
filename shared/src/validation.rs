//! Required-field validation for stock batches
//!
//! A batch is checked as a whole before anything is written. Missing fields
//! are reported by their display label so the client can show them directly.

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Field labels
// ============================================================================

pub const SCHEME: &str = "Scheme";
pub const MATERIAL_CODE: &str = "Material Code";
pub const MATERIAL_QUANTITY: &str = "Material Quantity";
pub const DESCRIPTION: &str = "Description";
pub const RECEIVER_NAME: &str = "Receiver Name";
pub const UNIT: &str = "Unit";
pub const AREA_CODE: &str = "Area Code";
pub const ADDRESS: &str = "Address";

/// Reasons a batch is rejected before any write
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("Request body must contain at least one row")]
    Empty,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// `row` is 1-based
    #[error("Material Quantity must be at least 1 (row {row})")]
    InvalidQuantity { row: usize },
}

/// A client-submitted row that may be incomplete
pub trait BatchEntry: Sized {
    type Valid: Quantity;

    /// Convert into the complete form, or report the labels of every
    /// missing field.
    fn into_valid(self) -> Result<Self::Valid, Vec<&'static str>>;
}

pub trait Quantity {
    fn quantity(&self) -> i64;
}

/// Validate every row, then hand back the complete rows in input order.
///
/// Missing labels across all rows are merged in first-seen order without
/// duplicates.
pub fn validate_batch<T: BatchEntry>(rows: Vec<T>) -> Result<Vec<T::Valid>, BatchError> {
    if rows.is_empty() {
        return Err(BatchError::Empty);
    }

    let mut missing: Vec<String> = Vec::new();
    let mut valid = Vec::with_capacity(rows.len());

    for row in rows {
        match row.into_valid() {
            Ok(v) => valid.push(v),
            Err(labels) => {
                for label in labels {
                    if !missing.iter().any(|m| m == label) {
                        missing.push(label.to_string());
                    }
                }
            }
        }
    }

    if !missing.is_empty() {
        return Err(BatchError::MissingFields(missing));
    }

    if let Some(pos) = valid.iter().position(|v| v.quantity() < 1) {
        return Err(BatchError::InvalidQuantity { row: pos + 1 });
    }

    Ok(valid)
}

fn text(value: Option<String>, label: &'static str, missing: &mut Vec<&'static str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => {
            missing.push(label);
            String::new()
        }
    }
}

fn qty(value: Option<i64>, missing: &mut Vec<&'static str>) -> i64 {
    match value {
        Some(v) => v,
        None => {
            missing.push(MATERIAL_QUANTITY);
            0
        }
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// ============================================================================
// Store-in
// ============================================================================

/// Store-in row as submitted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInEntry {
    pub scheme: Option<String>,
    pub material_code: Option<String>,
    pub material_qty: Option<i64>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub notes: Option<String>,
    pub warehouse_id: Option<Uuid>,
}

/// Complete store-in row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStoreIn {
    pub scheme: String,
    pub material_code: String,
    pub material_qty: i64,
    pub description: String,
    pub unit: Option<String>,
    pub notes: Option<String>,
    pub warehouse_id: Option<Uuid>,
}

impl Quantity for NewStoreIn {
    fn quantity(&self) -> i64 {
        self.material_qty
    }
}

impl BatchEntry for StoreInEntry {
    type Valid = NewStoreIn;

    fn into_valid(self) -> Result<NewStoreIn, Vec<&'static str>> {
        let mut missing = Vec::new();
        let row = NewStoreIn {
            scheme: text(self.scheme, SCHEME, &mut missing),
            material_code: text(self.material_code, MATERIAL_CODE, &mut missing),
            material_qty: qty(self.material_qty, &mut missing),
            description: text(self.description, DESCRIPTION, &mut missing),
            unit: optional(self.unit),
            notes: optional(self.notes),
            warehouse_id: self.warehouse_id,
        };
        if missing.is_empty() {
            Ok(row)
        } else {
            Err(missing)
        }
    }
}

// ============================================================================
// Stock-out
// ============================================================================

/// Stock-out row as submitted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockOutEntry {
    pub scheme: Option<String>,
    pub material_code: Option<String>,
    pub material_qty: Option<i64>,
    pub description: Option<String>,
    pub receiver_name: Option<String>,
    pub unit: Option<String>,
    pub area_code: Option<String>,
    pub address: Option<String>,
    pub warehouse_id: Option<Uuid>,
}

/// Complete stock-out row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStockOut {
    pub scheme: String,
    pub material_code: String,
    pub material_qty: i64,
    pub description: String,
    pub receiver_name: String,
    pub unit: String,
    pub area_code: String,
    pub address: String,
    pub warehouse_id: Option<Uuid>,
}

impl Quantity for NewStockOut {
    fn quantity(&self) -> i64 {
        self.material_qty
    }
}

impl BatchEntry for StockOutEntry {
    type Valid = NewStockOut;

    fn into_valid(self) -> Result<NewStockOut, Vec<&'static str>> {
        let mut missing = Vec::new();
        let row = NewStockOut {
            scheme: text(self.scheme, SCHEME, &mut missing),
            material_code: text(self.material_code, MATERIAL_CODE, &mut missing),
            material_qty: qty(self.material_qty, &mut missing),
            description: text(self.description, DESCRIPTION, &mut missing),
            receiver_name: text(self.receiver_name, RECEIVER_NAME, &mut missing),
            unit: text(self.unit, UNIT, &mut missing),
            area_code: text(self.area_code, AREA_CODE, &mut missing),
            address: text(self.address, ADDRESS, &mut missing),
            warehouse_id: self.warehouse_id,
        };
        if missing.is_empty() {
            Ok(row)
        } else {
            Err(missing)
        }
    }
}

// ============================================================================
// Scheme material mapping
// ============================================================================

/// Planned material quantity under a scheme, as submitted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    pub scheme: Option<String>,
    pub material_code: Option<String>,
    pub material_qty: Option<i64>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub warehouse_id: Option<Uuid>,
}

/// Complete mapping row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMapping {
    pub scheme: String,
    pub material_code: String,
    pub material_qty: i64,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub warehouse_id: Option<Uuid>,
}

impl Quantity for NewMapping {
    fn quantity(&self) -> i64 {
        self.material_qty
    }
}

impl BatchEntry for MappingEntry {
    type Valid = NewMapping;

    fn into_valid(self) -> Result<NewMapping, Vec<&'static str>> {
        let mut missing = Vec::new();
        let row = NewMapping {
            scheme: text(self.scheme, SCHEME, &mut missing),
            material_code: text(self.material_code, MATERIAL_CODE, &mut missing),
            material_qty: qty(self.material_qty, &mut missing),
            description: optional(self.description),
            unit: optional(self.unit),
            warehouse_id: self.warehouse_id,
        };
        if missing.is_empty() {
            Ok(row)
        } else {
            Err(missing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(code: Option<&str>, qty: Option<i64>) -> StoreInEntry {
        StoreInEntry {
            scheme: Some("S1".to_string()),
            material_code: code.map(str::to_string),
            material_qty: qty,
            description: Some("d".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_batch_rejected() {
        let rows: Vec<StoreInEntry> = Vec::new();
        assert_eq!(validate_batch(rows), Err(BatchError::Empty));
    }

    #[test]
    fn test_blank_strings_count_as_missing() {
        let row = store_in(Some("   "), Some(1));
        assert_eq!(row.into_valid().unwrap_err(), vec![MATERIAL_CODE]);
    }

    #[test]
    fn test_missing_labels_are_unioned_once() {
        let rows = vec![
            store_in(None, Some(1)),
            store_in(None, None),
            StoreInEntry::default(),
        ];
        let err = validate_batch(rows).unwrap_err();
        assert_eq!(
            err,
            BatchError::MissingFields(vec![
                MATERIAL_CODE.to_string(),
                MATERIAL_QUANTITY.to_string(),
                SCHEME.to_string(),
                DESCRIPTION.to_string(),
            ])
        );
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let rows = vec![store_in(Some("M1"), Some(2)), store_in(Some("M2"), Some(0))];
        assert_eq!(validate_batch(rows), Err(BatchError::InvalidQuantity { row: 2 }));
    }

    #[test]
    fn test_stock_out_requires_delivery_fields() {
        let entry = StockOutEntry {
            scheme: Some("S1".to_string()),
            material_code: Some("M1".to_string()),
            material_qty: Some(4),
            description: Some("d".to_string()),
            ..Default::default()
        };
        assert_eq!(
            entry.into_valid().unwrap_err(),
            vec![RECEIVER_NAME, UNIT, AREA_CODE, ADDRESS]
        );
    }

    #[test]
    fn test_entry_deserializes_camel_case() {
        let entry: StoreInEntry = serde_json::from_str(
            r#"{"scheme":"S1","materialCode":"M1","materialQty":10,"description":"d","notes":"n"}"#,
        )
        .unwrap();
        let valid = entry.into_valid().unwrap();
        assert_eq!(valid.material_code, "M1");
        assert_eq!(valid.material_qty, 10);
        assert_eq!(valid.notes.as_deref(), Some("n"));
    }

    #[test]
    fn test_mapping_description_optional() {
        let entry = MappingEntry {
            scheme: Some("S1".to_string()),
            material_code: Some("M1".to_string()),
            material_qty: Some(3),
            ..Default::default()
        };
        assert!(entry.into_valid().is_ok());
    }
}
