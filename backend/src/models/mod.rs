//! Database models for the warehouse inventory server
//!
//! Rows are read with `sqlx::FromRow` and serialized in camelCase. Ids are
//! always `Uuid`, and each scoped model tells the role filter where it lives.

mod inventory;
mod po_tracking;
mod stock;
mod user;

pub use inventory::*;
pub use po_tracking::*;
pub use stock::*;
pub use user::*;
