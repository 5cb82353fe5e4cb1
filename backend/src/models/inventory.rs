use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::Scoped;
use sqlx::FromRow;
use uuid::Uuid;

/// Organisational unit owning warehouses
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub department_id: Uuid,
    pub city: Option<String>,
    pub area: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Scoped for Warehouse {
    fn warehouse_id(&self) -> Option<Uuid> {
        Some(self.id)
    }

    fn department_id(&self) -> Option<Uuid> {
        Some(self.department_id)
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Material catalogue entry, matched to stock rows by `code`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub warehouse_id: Option<Uuid>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Scoped for Material {
    fn warehouse_id(&self) -> Option<Uuid> {
        self.warehouse_id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Scheme, shown as a PO number in Telecom
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Scheme {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub warehouse_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Scoped for Scheme {
    fn warehouse_id(&self) -> Option<Uuid> {
        self.warehouse_id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}
