//! Report layout helpers
//!
//! Everything here is a pure transform over rows that were already filtered
//! and reconciled; the renderers in the backend only lay these out.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One output column: which field to read and what to call it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub field: String,
    pub header_name: String,
}

impl ColumnDef {
    pub fn new(field: &str, header_name: &str) -> Self {
        Self {
            field: field.to_string(),
            header_name: header_name.to_string(),
        }
    }
}

/// Departments whose reports use their own vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartmentVocabulary {
    Telecom,
    Electrical,
    Standard,
}

impl DepartmentVocabulary {
    pub fn from_department(department: Option<&str>) -> Self {
        match department.map(|d| d.trim().to_ascii_lowercase()) {
            Some(d) if d == "telecom" => DepartmentVocabulary::Telecom,
            Some(d) if d == "electrical" => DepartmentVocabulary::Electrical,
            _ => DepartmentVocabulary::Standard,
        }
    }
}

/// Rename a column header for the given department.
///
/// Telecom tracks schemes as purchase orders and Electrical calls units UOM.
pub fn relabel_header(header: &str, department: Option<&str>) -> String {
    match (DepartmentVocabulary::from_department(department), header) {
        (DepartmentVocabulary::Telecom, "Scheme") => "PO".to_string(),
        (DepartmentVocabulary::Electrical, "Unit") => "UOM".to_string(),
        _ => header.to_string(),
    }
}

pub fn relabel_columns(columns: &[ColumnDef], department: Option<&str>) -> Vec<ColumnDef> {
    columns
        .iter()
        .map(|c| ColumnDef {
            field: c.field.clone(),
            header_name: relabel_header(&c.header_name, department),
        })
        .collect()
}

/// Text shown for `field` of a JSON row. Missing and null fields are blank.
pub fn cell_text(row: &Value, field: &str) -> String {
    match row.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => (if *b { "Yes" } else { "No" }).to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Numeric value of a cell when it holds a number
pub fn cell_number(row: &Value, field: &str) -> Option<f64> {
    row.get(field).and_then(Value::as_f64)
}

// ============================================================================
// Default column sets
// ============================================================================

pub fn remaining_stock_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("scheme", "Scheme"),
        ColumnDef::new("materialCode", "Material Code"),
        ColumnDef::new("description", "Description"),
        ColumnDef::new("unit", "Unit"),
        ColumnDef::new("StockIn", "Stock In"),
        ColumnDef::new("StockOut", "Stock Out"),
        ColumnDef::new("Remaining", "Remaining"),
    ]
}

pub fn store_in_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("scheme", "Scheme"),
        ColumnDef::new("materialCode", "Material Code"),
        ColumnDef::new("description", "Description"),
        ColumnDef::new("unit", "Unit"),
        ColumnDef::new("materialQty", "Quantity"),
        ColumnDef::new("notes", "Notes"),
    ]
}

pub fn stock_out_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("scheme", "Scheme"),
        ColumnDef::new("materialCode", "Material Code"),
        ColumnDef::new("description", "Description"),
        ColumnDef::new("unit", "Unit"),
        ColumnDef::new("materialQty", "Quantity"),
        ColumnDef::new("receiverName", "Receiver"),
        ColumnDef::new("areaCode", "Area Code"),
        ColumnDef::new("address", "Address"),
    ]
}

// ============================================================================
// Pagination
// ============================================================================

/// How many rows of `row_height` fit below a header of `header` height in
/// `available` vertical space.
///
/// All three lengths are in the same unit, measured by the renderer for the
/// page being filled. A row height that is not positive fits nothing.
pub fn rows_that_fit(available: f64, header: f64, row_height: f64) -> usize {
    if row_height <= 0.0 || available < header + row_height {
        return 0;
    }
    ((available - header) / row_height).floor() as usize
}

const ELLIPSIS: &str = "...";

/// Shorten `text` until `measure` reports it fits in `max_width`, marking
/// the cut with a trailing ellipsis. Text that already fits is unchanged.
pub fn clip_to_width(text: &str, max_width: f64, measure: impl Fn(&str) -> f64) -> String {
    if measure(text) <= max_width {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let clipped = |len: usize| -> String {
        let kept: String = chars[..len].iter().collect();
        format!("{}{}", kept.trim_end(), ELLIPSIS)
    };

    // Longest prefix whose clipped form fits; width grows with length
    let (mut lo, mut hi) = (0, chars.len());
    while lo < hi {
        let mid = (lo + hi + 1) / 2;
        if measure(&clipped(mid)) <= max_width {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    if lo == 0 && measure(ELLIPSIS) > max_width {
        return String::new();
    }
    clipped(lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_relabel_telecom() {
        assert_eq!(relabel_header("Scheme", Some("Telecom")), "PO");
        assert_eq!(relabel_header("Unit", Some("Telecom")), "Unit");
    }

    #[test]
    fn test_relabel_electrical() {
        assert_eq!(relabel_header("Unit", Some(" electrical ")), "UOM");
        assert_eq!(relabel_header("Scheme", Some("Electrical")), "Scheme");
    }

    #[test]
    fn test_relabel_other_departments() {
        assert_eq!(relabel_header("Scheme", Some("Civil")), "Scheme");
        assert_eq!(relabel_header("Unit", None), "Unit");
    }

    #[test]
    fn test_relabel_columns_keeps_fields() {
        let cols = relabel_columns(&remaining_stock_columns(), Some("Telecom"));
        assert_eq!(cols[0].field, "scheme");
        assert_eq!(cols[0].header_name, "PO");
    }

    #[test]
    fn test_cell_text() {
        let row = json!({"a": "x", "b": 4, "c": null, "d": true, "e": 1.5});
        assert_eq!(cell_text(&row, "a"), "x");
        assert_eq!(cell_text(&row, "b"), "4");
        assert_eq!(cell_text(&row, "c"), "");
        assert_eq!(cell_text(&row, "d"), "Yes");
        assert_eq!(cell_text(&row, "e"), "1.5");
        assert_eq!(cell_text(&row, "missing"), "");
        assert_eq!(cell_number(&row, "b"), Some(4.0));
        assert_eq!(cell_number(&row, "a"), None);
    }

    #[test]
    fn test_column_def_deserializes() {
        let col: ColumnDef =
            serde_json::from_str(r#"{"field":"materialCode","headerName":"Material Code"}"#).unwrap();
        assert_eq!(col, ColumnDef::new("materialCode", "Material Code"));
    }

    #[test]
    fn test_rows_that_fit() {
        assert_eq!(rows_that_fit(100.0, 10.0, 9.0), 10);
        assert_eq!(rows_that_fit(100.0, 10.0, 10.0), 9);
        assert_eq!(rows_that_fit(18.0, 10.0, 8.0), 1);
    }

    #[test]
    fn test_rows_that_fit_no_room() {
        assert_eq!(rows_that_fit(15.0, 10.0, 8.0), 0);
        assert_eq!(rows_that_fit(5.0, 10.0, 1.0), 0);
        assert_eq!(rows_that_fit(100.0, 0.0, 0.0), 0);
        assert_eq!(rows_that_fit(100.0, 0.0, -2.0), 0);
    }

    #[test]
    fn test_clip_to_width() {
        let width = |s: &str| s.chars().count() as f64;
        assert_eq!(clip_to_width("Cable", 10.0, width), "Cable");
        assert_eq!(clip_to_width("Copper cable 4mm", 10.0, width), "Copper...");
        assert_eq!(clip_to_width("abcdefgh", 5.0, width), "ab...");
        assert_eq!(clip_to_width("abcdefgh", 2.0, width), "");
    }
}
