//! Batch validation tests
//!
//! Every row of a stock batch is checked before anything is written, and the
//! error names each missing field once.

use proptest::prelude::*;
use shared::validation::{
    validate_batch, BatchError, MappingEntry, StockOutEntry, StoreInEntry, MATERIAL_CODE,
    RECEIVER_NAME, SCHEME,
};

fn store_in(scheme: &str, code: Option<&str>, qty: i64) -> StoreInEntry {
    StoreInEntry {
        scheme: Some(scheme.to_string()),
        material_code: code.map(str::to_string),
        material_qty: Some(qty),
        description: Some("Copper cable".to_string()),
        ..Default::default()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Row two lacks a material code, so the whole batch fails
    #[test]
    fn test_missing_code_in_middle_row_rejects_batch() {
        let batch = vec![
            store_in("S1", Some("M1"), 5),
            store_in("S1", None, 5),
            store_in("S1", Some("M3"), 5),
        ];

        match validate_batch(batch) {
            Err(BatchError::MissingFields(fields)) => {
                assert_eq!(fields, vec![MATERIAL_CODE.to_string()]);
            }
            other => panic!("expected missing fields, got {:?}", other),
        }
    }

    #[test]
    fn test_stock_out_requires_receiver_details() {
        let entry = StockOutEntry {
            scheme: Some("S1".to_string()),
            material_code: Some("M1".to_string()),
            material_qty: Some(2),
            description: Some("Breaker".to_string()),
            unit: Some("pcs".to_string()),
            area_code: Some("A1".to_string()),
            address: Some("Depot 4".to_string()),
            ..Default::default()
        };

        match validate_batch(vec![entry]) {
            Err(BatchError::MissingFields(fields)) => {
                assert_eq!(fields, vec![RECEIVER_NAME.to_string()]);
            }
            other => panic!("expected missing fields, got {:?}", other),
        }
    }

    #[test]
    fn test_mapping_needs_scheme() {
        let entry = MappingEntry {
            material_code: Some("M1".to_string()),
            material_qty: Some(1),
            ..Default::default()
        };

        let err = validate_batch(vec![entry]).unwrap_err();
        assert_eq!(err, BatchError::MissingFields(vec![SCHEME.to_string()]));
    }

    #[test]
    fn test_complete_batch_keeps_order() {
        let batch = vec![store_in("S1", Some("M2"), 1), store_in("S1", Some("M1"), 9)];
        let rows = validate_batch(batch).unwrap();
        assert_eq!(rows[0].material_code, "M2");
        assert_eq!(rows[1].material_qty, 9);
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

        /// One incomplete row anywhere rejects the batch
        #[test]
        fn prop_one_bad_row_rejects_all(len in 1usize..20, bad in 0usize..20) {
            let bad = bad % len;
            let batch: Vec<StoreInEntry> = (0..len)
                .map(|i| {
                    let code = format!("M{}", i);
                    store_in("S1", (i != bad).then_some(code.as_str()), 1)
                })
                .collect();

            prop_assert!(matches!(validate_batch(batch), Err(BatchError::MissingFields(_))));
        }

        /// Non-positive quantities are rejected with the 1-based row number
        #[test]
        fn prop_non_positive_quantity_rejected(qty in -1000i64..=0, row in 0usize..5) {
            let batch: Vec<StoreInEntry> = (0..5)
                .map(|i| store_in("S1", Some("M1"), if i == row { qty } else { 1 }))
                .collect();

            prop_assert_eq!(
                validate_batch(batch).unwrap_err(),
                BatchError::InvalidQuantity { row: row + 1 }
            );
        }

        /// Complete batches pass through unchanged in length
        #[test]
        fn prop_complete_batch_passes(qtys in prop::collection::vec(1i64..1000, 1..20)) {
            let batch: Vec<StoreInEntry> = qtys
                .iter()
                .enumerate()
                .map(|(i, &q)| store_in("S1", Some(format!("M{}", i).as_str()), q))
                .collect();

            let rows = validate_batch(batch).unwrap();
            prop_assert_eq!(rows.len(), qtys.len());
        }
    }
}
