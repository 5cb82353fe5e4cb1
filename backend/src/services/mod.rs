//! Business logic services for the warehouse inventory server

pub mod auth;
pub mod department;
pub mod mapping;
pub mod material;
pub mod notification;
pub mod po_tracking;
pub mod reporting;
pub mod role;
pub mod scheme;
pub mod stock;
pub mod user;
pub mod warehouse;

pub use auth::AuthService;
pub use department::DepartmentService;
pub use mapping::MappingService;
pub use material::MaterialService;
pub use notification::NotificationService;
pub use po_tracking::PoTrackingService;
pub use reporting::ReportingService;
pub use role::RoleService;
pub use scheme::SchemeService;
pub use stock::StockService;
pub use user::UserService;
pub use warehouse::WarehouseService;
