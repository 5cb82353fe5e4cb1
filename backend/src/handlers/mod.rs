//! HTTP request handlers

pub mod auth;
pub mod department;
pub mod health;
pub mod mapping;
pub mod material;
pub mod notification;
pub mod po_tracking;
pub mod reporting;
pub mod role;
pub mod scheme;
pub mod stock;
pub mod warehouse;

pub use auth::*;
pub use department::*;
pub use health::*;
pub use mapping::*;
pub use material::*;
pub use notification::*;
pub use po_tracking::*;
pub use reporting::*;
pub use role::*;
pub use scheme::*;
pub use stock::*;
pub use warehouse::*;
