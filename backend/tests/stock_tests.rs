//! Stock reconciliation tests
//!
//! Tests for remaining stock including:
//! - Stock-in only schemes keep everything
//! - Stock-out without stock-in goes negative
//! - Repeated material codes on either side
//! - Quantity mode laws for repeated writes
//! - The receive-then-dispatch scenario

use chrono::NaiveDate;
use proptest::prelude::*;
use shared::{reconcile, QuantityMode, StockLine};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Receive 10, dispatch 4, six remain
    #[test]
    fn test_receive_then_dispatch() {
        let stock_in = vec![StockLine::new("M1", 10)];
        let stock_out = vec![StockLine::new("M1", 4)];

        let rows = reconcile("S1", &stock_in, &stock_out, day());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].material_code, "M1");
        assert_eq!(rows[0].stock_in, 10);
        assert_eq!(rows[0].stock_out, 4);
        assert_eq!(rows[0].remaining, 6);
    }

    #[test]
    fn test_dispatch_without_receipt_is_negative() {
        let rows = reconcile("S1", &[], &[StockLine::new("M7", 3)], day());
        assert_eq!(rows[0].stock_in, 0);
        assert_eq!(rows[0].remaining, -3);
    }

    #[test]
    fn test_first_seen_order() {
        let stock_in = vec![StockLine::new("B", 1), StockLine::new("A", 1)];
        let stock_out = vec![StockLine::new("C", 1), StockLine::new("A", 1)];

        let codes: Vec<String> = reconcile("S1", &stock_in, &stock_out, day())
            .into_iter()
            .map(|r| r.material_code)
            .collect();
        assert_eq!(codes, vec!["B", "A", "C"]);
    }

    /// The later store-in line for a code replaces the earlier one
    #[test]
    fn test_repeated_stock_in_code_keeps_last_line() {
        let stock_in = vec![StockLine::new("M1", 5), StockLine::new("M1", 9)];
        let stock_out = vec![StockLine::new("M1", 2)];

        let rows = reconcile("S1", &stock_in, &stock_out, day());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].stock_in, 9);
        assert_eq!(rows[0].stock_out, 2);
        assert_eq!(rows[0].remaining, 7);
    }

    #[test]
    fn test_repeated_stock_out_code_keeps_last_line() {
        let stock_in = vec![StockLine::new("M1", 10)];
        let stock_out = vec![StockLine::new("M1", 3), StockLine::new("M1", 4)];

        let rows = reconcile("S1", &stock_in, &stock_out, day());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].stock_out, 4);
        assert_eq!(rows[0].remaining, 6);
    }

    #[test]
    fn test_repeated_code_only_dispatched() {
        let stock_out = vec![StockLine::new("M7", 3), StockLine::new("M7", 5)];

        let rows = reconcile("S1", &[], &stock_out, day());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].stock_in, 0);
        assert_eq!(rows[0].stock_out, 5);
        assert_eq!(rows[0].remaining, -5);
    }

    /// Repeats keep the row where the code was first seen
    #[test]
    fn test_repeated_code_keeps_first_position() {
        let stock_in = vec![
            StockLine::new("A", 1),
            StockLine::new("B", 2),
            StockLine::new("A", 7),
        ];

        let rows = reconcile("S1", &stock_in, &[], day());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].material_code, "A");
        assert_eq!(rows[0].stock_in, 7);
        assert_eq!(rows[1].material_code, "B");
    }

    #[test]
    fn test_row_serializes_with_report_keys() {
        let rows = reconcile("S1", &[StockLine::new("M1", 2)], &[], day());
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["StockIn"], 2);
        assert_eq!(json["StockOut"], 0);
        assert_eq!(json["Remaining"], 2);
        assert_eq!(json["materialCode"], "M1");
        assert_eq!(json["date"], "2024-06-30");
    }

    #[test]
    fn test_quantity_mode_from_config_text() {
        let mode: QuantityMode = serde_json::from_str("\"accumulate\"").unwrap();
        assert_eq!(mode, QuantityMode::Accumulate);
        assert_eq!(QuantityMode::default(), QuantityMode::Overwrite);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use std::collections::HashSet;

    /// Lines with distinct material codes
    fn lines_strategy() -> impl Strategy<Value = Vec<StockLine>> {
        prop::collection::hash_map("[A-Z]{2}[0-9]{2}", 1i64..10_000, 0..20).prop_map(|m| {
            m.into_iter()
                .map(|(code, qty)| StockLine::new(code, qty))
                .collect()
        })
    }

    /// Lines drawn from a few codes so repeats are common
    fn repeating_lines_strategy() -> impl Strategy<Value = Vec<StockLine>> {
        prop::collection::vec(("M[1-4]", 1i64..1_000), 0..12).prop_map(|v| {
            v.into_iter()
                .map(|(code, qty)| StockLine::new(code, qty))
                .collect()
        })
    }

    /// Quantity of the last line for `code`, or zero
    fn last_qty(lines: &[StockLine], code: &str) -> i64 {
        lines
            .iter()
            .rev()
            .find(|l| l.material_code == code)
            .map_or(0, |l| l.material_qty)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// With repeated codes each side takes its last line per code
        #[test]
        fn prop_repeated_codes_last_line_wins(
            stock_in in repeating_lines_strategy(),
            stock_out in repeating_lines_strategy(),
        ) {
            let rows = reconcile("S1", &stock_in, &stock_out, day());

            let codes: HashSet<&str> = stock_in
                .iter()
                .chain(&stock_out)
                .map(|l| l.material_code.as_str())
                .collect();
            prop_assert_eq!(rows.len(), codes.len());

            for row in &rows {
                prop_assert_eq!(row.stock_in, last_qty(&stock_in, &row.material_code));
                prop_assert_eq!(row.stock_out, last_qty(&stock_out, &row.material_code));
                prop_assert_eq!(row.remaining, row.stock_in - row.stock_out);
            }
        }

        /// With no stock-out every material keeps its full stock-in
        #[test]
        fn prop_no_stock_out_remaining_equals_stock_in(stock_in in lines_strategy()) {
            let rows = reconcile("S1", &stock_in, &[], day());

            prop_assert_eq!(rows.len(), stock_in.len());
            for (row, line) in rows.iter().zip(&stock_in) {
                prop_assert_eq!(&row.material_code, &line.material_code);
                prop_assert_eq!(row.remaining, line.material_qty);
                prop_assert_eq!(row.stock_out, 0);
            }
        }

        /// Codes only on the out side start from zero
        #[test]
        fn prop_stock_out_only_is_negative(stock_out in lines_strategy()) {
            for row in reconcile("S1", &[], &stock_out, day()) {
                prop_assert_eq!(row.stock_in, 0);
                prop_assert_eq!(row.remaining, -row.stock_out);
            }
        }

        /// Every row balances and every code appears once
        #[test]
        fn prop_rows_balance(stock_in in lines_strategy(), stock_out in lines_strategy()) {
            let rows = reconcile("S1", &stock_in, &stock_out, day());

            let codes: HashSet<&str> = stock_in
                .iter()
                .chain(&stock_out)
                .map(|l| l.material_code.as_str())
                .collect();
            prop_assert_eq!(rows.len(), codes.len());

            for row in &rows {
                prop_assert_eq!(row.remaining, row.stock_in - row.stock_out);
                prop_assert_eq!(&row.scheme, "S1");
            }
        }

        /// Overwriting twice keeps the second quantity
        #[test]
        fn prop_overwrite_keeps_latest(first in 1i64..100_000, second in 1i64..100_000) {
            let mode = QuantityMode::Overwrite;
            prop_assert_eq!(mode.merge(mode.merge(0, first), second), second);
        }

        /// Accumulating sums every write
        #[test]
        fn prop_accumulate_sums(writes in prop::collection::vec(1i64..100_000, 1..10)) {
            let mode = QuantityMode::Accumulate;
            let total = writes.iter().fold(0, |acc, &q| mode.merge(acc, q));
            prop_assert_eq!(total, writes.iter().sum::<i64>());
        }
    }
}
