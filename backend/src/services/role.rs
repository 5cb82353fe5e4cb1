//! Role management service for permission policy sets

use serde::Deserialize;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Policy, Role};

/// Role service for managing permission policies
#[derive(Clone)]
pub struct RoleService {
    db: PgPool,
}

/// Input for creating a role
#[derive(Debug, Deserialize)]
pub struct CreateRoleInput {
    pub name: String,
    #[serde(default)]
    pub policies: Vec<Policy>,
}

/// Input for updating a role
#[derive(Debug, Deserialize)]
pub struct UpdateRoleInput {
    pub name: Option<String>,
    pub policies: Option<Vec<Policy>>,
}

fn check_policies(policies: &[Policy]) -> AppResult<()> {
    if policies.iter().any(|p| p.module.trim().is_empty()) {
        return Err(AppError::Validation {
            field: "policies".to_string(),
            message: "Every policy needs a module".to_string(),
        });
    }
    Ok(())
}

impl RoleService {
    /// Create a new RoleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all roles
    pub async fn get_roles(&self) -> AppResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY name ASC")
            .fetch_all(&self.db)
            .await?;

        Ok(roles)
    }

    /// Get a role by ID
    pub async fn get_role(&self, role_id: Uuid) -> AppResult<Role> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(role_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Role".to_string()))
    }

    /// Policies granted by a role
    pub async fn get_policies(&self, role_id: Uuid) -> AppResult<Vec<Policy>> {
        Ok(self.get_role(role_id).await?.policies.0)
    }

    /// Create a role
    pub async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Role name is required".to_string(),
            });
        }
        check_policies(&input.policies)?;

        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (name, policies) VALUES ($1, $2) RETURNING *",
        )
        .bind(input.name.trim())
        .bind(Json(&input.policies))
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "name"))
    }

    /// Update a role
    pub async fn update_role(&self, role_id: Uuid, input: UpdateRoleInput) -> AppResult<Role> {
        if let Some(policies) = &input.policies {
            check_policies(policies)?;
        }

        sqlx::query_as::<_, Role>(
            r#"
            UPDATE roles SET
                name = COALESCE($2, name),
                policies = COALESCE($3, policies)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(role_id)
        .bind(input.name.as_deref().map(str::trim))
        .bind(input.policies.as_ref().map(Json))
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "name"))?
        .ok_or_else(|| AppError::NotFound("Role".to_string()))
    }

    /// Delete a role; users holding it keep their account
    pub async fn delete_role(&self, role_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(role_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Role".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policies_deserialize() {
        let input: CreateRoleInput = serde_json::from_str(
            r#"{"name":"Storekeeper","policies":[{"module":"storein","actions":["view","create"]}]}"#,
        )
        .unwrap();
        assert_eq!(input.policies[0].actions, vec!["view", "create"]);
        assert!(check_policies(&input.policies).is_ok());
    }

    #[test]
    fn test_blank_module_rejected() {
        let policies = vec![Policy { module: " ".to_string(), actions: vec![] }];
        assert!(check_policies(&policies).is_err());
    }
}
