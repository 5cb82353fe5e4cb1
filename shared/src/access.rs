//! Role-based record visibility
//!
//! Every list endpoint fetches records first and narrows them here, using the
//! caller's [`AuthContext`] built from verified token claims.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User roles known to the system
///
/// Anything outside the closed set deserializes to [`UserRole::Unknown`] and
/// sees nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    SuperAdmin,
    Manager,
    WarehouseUser,
    #[serde(other)]
    Unknown,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "SUPER_ADMIN",
            UserRole::Manager => "MANAGER",
            UserRole::WarehouseUser => "WAREHOUSE_USER",
            UserRole::Unknown => "UNKNOWN",
        }
    }

    /// Whether the role is one that may be assigned to a user
    pub fn is_assignable(&self) -> bool {
        !matches!(self, UserRole::Unknown)
    }
}

impl FromStr for UserRole {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "SUPER_ADMIN" => UserRole::SuperAdmin,
            "MANAGER" => UserRole::Manager,
            "WAREHOUSE_USER" => UserRole::WarehouseUser,
            _ => UserRole::Unknown,
        })
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and scope of the caller for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: UserRole,
    pub warehouse_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
}

impl AuthContext {
    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }

    /// True when filtering needs the set of warehouses owned by the caller's
    /// department, so callers can skip the lookup otherwise.
    pub fn needs_department_warehouses(&self) -> bool {
        self.role == UserRole::Manager && self.department_id.is_some()
    }
}

/// Ownership information a record exposes to the role filter
pub trait Scoped {
    fn warehouse_id(&self) -> Option<Uuid>;

    /// Records that carry their department directly are matched on it;
    /// the rest fall back to warehouse membership.
    fn department_id(&self) -> Option<Uuid> {
        None
    }

    fn is_active(&self) -> bool {
        true
    }
}

/// Whether `ctx` may see `record`.
///
/// `department_warehouses` holds the ids of warehouses belonging to the
/// caller's department and is only consulted for managers.
pub fn is_visible<T: Scoped>(
    record: &T,
    ctx: &AuthContext,
    department_warehouses: &HashSet<Uuid>,
) -> bool {
    match ctx.role {
        UserRole::SuperAdmin => true,
        UserRole::WarehouseUser => match ctx.warehouse_id {
            Some(warehouse_id) => record.is_active() && record.warehouse_id() == Some(warehouse_id),
            None => false,
        },
        UserRole::Manager => match ctx.department_id {
            Some(department_id) => {
                record.is_active()
                    && match record.department_id() {
                        Some(d) => d == department_id,
                        None => record
                            .warehouse_id()
                            .map_or(false, |w| department_warehouses.contains(&w)),
                    }
            }
            None => false,
        },
        UserRole::Unknown => false,
    }
}

/// Narrow `records` to what `ctx` may see, preserving input order.
pub fn filter_records<T: Scoped>(
    records: Vec<T>,
    ctx: &AuthContext,
    department_warehouses: &HashSet<Uuid>,
) -> Vec<T> {
    records
        .into_iter()
        .filter(|r| is_visible(r, ctx, department_warehouses))
        .collect()
}
