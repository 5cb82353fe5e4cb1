//! Stock movement arithmetic
//!
//! Remaining stock is never stored. It is derived per material code from the
//! store-in and stock-out rows of a scheme.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One quantity line from either side of a scheme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLine {
    pub material_code: String,
    pub material_qty: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl StockLine {
    pub fn new(material_code: impl Into<String>, material_qty: i64) -> Self {
        Self {
            material_code: material_code.into(),
            material_qty,
            description: None,
            unit: None,
        }
    }
}

/// Remaining-stock row for one material within a scheme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledRow {
    pub scheme: String,
    pub material_code: String,
    pub description: Option<String>,
    pub unit: Option<String>,
    #[serde(rename = "StockIn")]
    pub stock_in: i64,
    #[serde(rename = "StockOut")]
    pub stock_out: i64,
    #[serde(rename = "Remaining")]
    pub remaining: i64,
    pub date: NaiveDate,
}

/// Merge store-in and stock-out lines into remaining-stock rows.
///
/// Rows are keyed by material code and emitted in first-seen order. A later
/// line for the same code replaces the earlier quantity on its side. Codes
/// that only appear in `stock_out` get `stock_in = 0` and a negative
/// remaining value, which is reported as-is.
pub fn reconcile(
    scheme: &str,
    stock_in: &[StockLine],
    stock_out: &[StockLine],
    date: NaiveDate,
) -> Vec<ReconciledRow> {
    let mut rows: Vec<ReconciledRow> = Vec::with_capacity(stock_in.len());
    let mut index: HashMap<&str, usize> = HashMap::new();

    for line in stock_in {
        match index.get(line.material_code.as_str()) {
            Some(&i) => {
                let row = &mut rows[i];
                row.stock_in = line.material_qty;
                row.remaining = row.stock_in - row.stock_out;
                fill_details(row, line);
            }
            None => {
                index.insert(line.material_code.as_str(), rows.len());
                rows.push(ReconciledRow {
                    scheme: scheme.to_string(),
                    material_code: line.material_code.clone(),
                    description: line.description.clone(),
                    unit: line.unit.clone(),
                    stock_in: line.material_qty,
                    stock_out: 0,
                    remaining: line.material_qty,
                    date,
                });
            }
        }
    }

    for line in stock_out {
        match index.get(line.material_code.as_str()) {
            Some(&i) => {
                let row = &mut rows[i];
                row.stock_out = line.material_qty;
                row.remaining = row.stock_in - row.stock_out;
                fill_details(row, line);
            }
            None => {
                index.insert(line.material_code.as_str(), rows.len());
                rows.push(ReconciledRow {
                    scheme: scheme.to_string(),
                    material_code: line.material_code.clone(),
                    description: line.description.clone(),
                    unit: line.unit.clone(),
                    stock_in: 0,
                    stock_out: line.material_qty,
                    remaining: -line.material_qty,
                    date,
                });
            }
        }
    }

    rows
}

fn fill_details(row: &mut ReconciledRow, line: &StockLine) {
    if row.description.as_deref().map_or(true, str::is_empty) {
        row.description = line.description.clone();
    }
    if row.unit.as_deref().map_or(true, str::is_empty) {
        row.unit = line.unit.clone();
    }
}

/// What a repeated write for the same (scheme, material code) does to the
/// stored quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityMode {
    /// The new quantity replaces the stored one
    #[default]
    Overwrite,
    /// The new quantity is added to the stored one
    Accumulate,
}

impl QuantityMode {
    /// Stored quantity after writing `incoming` over `existing`. The backend
    /// upserts apply the same rule in their `ON CONFLICT` clause.
    pub fn merge(&self, existing: i64, incoming: i64) -> i64 {
        match self {
            QuantityMode::Overwrite => incoming,
            QuantityMode::Accumulate => existing.saturating_add(incoming),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_empty_inputs() {
        assert!(reconcile("S1", &[], &[], day()).is_empty());
    }

    #[test]
    fn test_rows_are_tagged() {
        let rows = reconcile("S9", &[StockLine::new("M1", 3)], &[], day());
        assert_eq!(rows[0].scheme, "S9");
        assert_eq!(rows[0].date, day());
    }

    #[test]
    fn test_first_seen_order() {
        let stock_in = vec![StockLine::new("B", 1), StockLine::new("A", 1)];
        let stock_out = vec![StockLine::new("C", 1), StockLine::new("A", 1)];
        let codes: Vec<_> = reconcile("S1", &stock_in, &stock_out, day())
            .into_iter()
            .map(|r| r.material_code)
            .collect();
        assert_eq!(codes, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_details_taken_from_stock_out_when_missing() {
        let mut out = StockLine::new("M1", 2);
        out.unit = Some("pc".to_string());
        let rows = reconcile("S1", &[StockLine::new("M1", 5)], &[out], day());
        assert_eq!(rows[0].unit.as_deref(), Some("pc"));
        assert_eq!(rows[0].remaining, 3);
    }

    #[test]
    fn test_serialized_field_names() {
        let rows = reconcile("S1", &[StockLine::new("M1", 5)], &[], day());
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["materialCode"], "M1");
        assert_eq!(json["StockIn"], 5);
        assert_eq!(json["StockOut"], 0);
        assert_eq!(json["Remaining"], 5);
    }

    #[test]
    fn test_quantity_modes() {
        assert_eq!(QuantityMode::Overwrite.merge(10, 4), 4);
        assert_eq!(QuantityMode::Accumulate.merge(10, 4), 14);
        assert_eq!(QuantityMode::default(), QuantityMode::Overwrite);
    }
}
