//! Shared types and pure logic for the warehouse inventory platform
//!
//! Nothing in this crate touches the database, so the role filter, stock
//! reconciliation, batch validation and report layout can be tested directly.

pub mod access;
pub mod report;
pub mod stock;
pub mod types;
pub mod validation;

pub use access::{filter_records, is_visible, AuthContext, Scoped, UserRole};
pub use stock::{reconcile, QuantityMode, ReconciledRow, StockLine};
pub use types::*;
