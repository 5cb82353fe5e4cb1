//! Report layout tests
//!
//! Tests for the pure parts of report generation:
//! - Department vocabulary in column headers
//! - Cell text for JSON rows
//! - Rows per page and cell clipping

use proptest::prelude::*;
use serde_json::json;
use shared::report::{
    cell_number, cell_text, clip_to_width, relabel_columns, relabel_header,
    remaining_stock_columns, rows_that_fit, ColumnDef,
};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_telecom_calls_schemes_po() {
        let columns = relabel_columns(&remaining_stock_columns(), Some("Telecom"));
        assert_eq!(columns[0].header_name, "PO");
        assert_eq!(columns[0].field, "scheme");
        assert_eq!(columns[3].header_name, "Unit");
    }

    #[test]
    fn test_electrical_calls_units_uom() {
        assert_eq!(relabel_header("Unit", Some(" electrical ")), "UOM");
        assert_eq!(relabel_header("Scheme", Some("Electrical")), "Scheme");
    }

    #[test]
    fn test_other_departments_unchanged() {
        assert_eq!(relabel_header("Scheme", Some("Civil")), "Scheme");
        assert_eq!(relabel_header("Unit", None), "Unit");
    }

    #[test]
    fn test_column_json_shape() {
        let column: ColumnDef =
            serde_json::from_value(json!({"field": "materialCode", "headerName": "Code"})).unwrap();
        assert_eq!(column, ColumnDef::new("materialCode", "Code"));
    }

    #[test]
    fn test_cell_rendering() {
        let row = json!({"code": "M1", "qty": 12, "active": true, "notes": null});
        assert_eq!(cell_text(&row, "code"), "M1");
        assert_eq!(cell_text(&row, "qty"), "12");
        assert_eq!(cell_text(&row, "active"), "Yes");
        assert_eq!(cell_text(&row, "notes"), "");
        assert_eq!(cell_text(&row, "absent"), "");
        assert_eq!(cell_number(&row, "qty"), Some(12.0));
        assert_eq!(cell_number(&row, "code"), None);
    }

    #[test]
    fn test_header_takes_space_from_rows() {
        // 270 mm of page, 6 mm rows: the header row costs one data row
        assert_eq!(rows_that_fit(270.0, 0.0, 6.0), 45);
        assert_eq!(rows_that_fit(270.0, 6.0, 6.0), 44);
    }

    #[test]
    fn test_clipped_cell_keeps_prefix() {
        let width = |s: &str| s.len() as f64 * 2.0;
        assert_eq!(clip_to_width("Copper cable", 24.0, width), "Copper cable");
        assert_eq!(clip_to_width("Copper cable 16mm", 24.0, width), "Copper ca...");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The rows that fit, plus the header, never overflow the space
        #[test]
        fn prop_rows_fit_in_space(
            available in 0.0f64..400.0,
            header in 0.0f64..20.0,
            row_height in 0.5f64..20.0,
        ) {
            let rows = rows_that_fit(available, header, row_height);
            prop_assert!(header + row_height * rows as f64 <= available + 1e-9);
            // One more row would not fit
            prop_assert!(header + row_height * (rows + 1) as f64 > available);
        }

        /// Clipped text always fits, and text that fits is untouched
        #[test]
        fn prop_clip_fits(text in "[a-z ]{0,60}", max in 3.0f64..40.0) {
            let width = |s: &str| s.chars().count() as f64;
            let clipped = clip_to_width(&text, max, width);
            prop_assert!(width(&clipped) <= max);
            if width(&text) <= max {
                prop_assert_eq!(clipped, text);
            }
        }

        /// Relabeling only ever touches the two vocabulary words
        #[test]
        fn prop_relabel_leaves_other_headers(header in "[A-Za-z ]{1,20}") {
            prop_assume!(header != "Scheme" && header != "Unit");
            for department in ["Telecom", "Electrical", "Civil"] {
                prop_assert_eq!(relabel_header(&header, Some(department)), header.clone());
            }
        }
    }
}
