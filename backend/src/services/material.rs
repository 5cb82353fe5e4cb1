//! Material catalogue service, including JSON import and export

use serde::Deserialize;
use shared::AuthContext;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Material;
use crate::services::WarehouseService;

/// Material service
#[derive(Clone)]
pub struct MaterialService {
    db: PgPool,
}

/// Input for creating a material
///
/// Also the shape of each entry in an uploaded file. Any id in the file is
/// ignored and a fresh one is assigned.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaterialInput {
    pub code: String,
    pub name: String,
    pub warehouse_id: Option<Uuid>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub is_active: Option<bool>,
}

/// Input for updating a material; absent fields are kept
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaterialInput {
    pub code: Option<String>,
    pub name: Option<String>,
    pub warehouse_id: Option<Uuid>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub is_active: Option<bool>,
}

impl CreateMaterialInput {
    fn check(&self) -> AppResult<()> {
        if self.code.trim().is_empty() {
            return Err(AppError::Validation {
                field: "code".to_string(),
                message: "Material code is required".to_string(),
            });
        }
        if self.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Material name is required".to_string(),
            });
        }
        Ok(())
    }
}

const INSERT_MATERIAL: &str = r#"
    INSERT INTO materials (code, name, warehouse_id, description, unit, is_active)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING *
"#;

impl MaterialService {
    /// Create a new MaterialService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a material. Warehouse users default to their own warehouse.
    pub async fn create(&self, ctx: &AuthContext, input: CreateMaterialInput) -> AppResult<Material> {
        input.check()?;

        sqlx::query_as::<_, Material>(INSERT_MATERIAL)
            .bind(input.code.trim())
            .bind(input.name.trim())
            .bind(input.warehouse_id.or(ctx.warehouse_id))
            .bind(&input.description)
            .bind(&input.unit)
            .bind(input.is_active.unwrap_or(true))
            .fetch_one(&self.db)
            .await
            .map_err(|e| AppError::from_db(e, "code"))
    }

    /// List materials visible to the caller
    pub async fn list(&self, ctx: &AuthContext) -> AppResult<Vec<Material>> {
        let materials = sqlx::query_as::<_, Material>("SELECT * FROM materials ORDER BY code ASC")
            .fetch_all(&self.db)
            .await?;

        WarehouseService::new(self.db.clone()).scope(ctx, materials).await
    }

    /// Get a material by ID
    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> AppResult<Material> {
        let record = sqlx::query_as::<_, Material>("SELECT * FROM materials WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Material".to_string()))?;

        WarehouseService::new(self.db.clone())
            .ensure_visible(ctx, record, "Material")
            .await
    }

    /// Update a material
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        input: UpdateMaterialInput,
    ) -> AppResult<Material> {
        self.get(ctx, id).await?;
        sqlx::query_as::<_, Material>(
            r#"
            UPDATE materials SET
                code = COALESCE($2, code),
                name = COALESCE($3, name),
                warehouse_id = COALESCE($4, warehouse_id),
                description = COALESCE($5, description),
                unit = COALESCE($6, unit),
                is_active = COALESCE($7, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.code.as_deref().map(str::trim))
        .bind(input.name.as_deref().map(str::trim))
        .bind(input.warehouse_id)
        .bind(&input.description)
        .bind(&input.unit)
        .bind(input.is_active)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "code"))?
        .ok_or_else(|| AppError::NotFound("Material".to_string()))
    }

    /// Delete a material
    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> AppResult<()> {
        self.get(ctx, id).await?;

        let result = sqlx::query("DELETE FROM materials WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Material".to_string()));
        }

        Ok(())
    }

    /// Serialize the caller's materials as a pretty JSON document
    pub async fn export_json(&self, ctx: &AuthContext) -> AppResult<Vec<u8>> {
        let materials = self.list(ctx).await?;
        serde_json::to_vec_pretty(&materials)
            .map_err(|e| AppError::Internal(format!("Material export failed: {}", e)))
    }

    /// Import a JSON array of materials in one transaction
    pub async fn import_json(&self, ctx: &AuthContext, bytes: &[u8]) -> AppResult<Vec<Material>> {
        let inputs = parse_import(bytes)?;

        let mut tx = self.db.begin().await?;
        let mut created = Vec::with_capacity(inputs.len());

        for input in inputs {
            let material = sqlx::query_as::<_, Material>(INSERT_MATERIAL)
                .bind(input.code.trim())
                .bind(input.name.trim())
                .bind(input.warehouse_id.or(ctx.warehouse_id))
                .bind(&input.description)
                .bind(&input.unit)
                .bind(input.is_active.unwrap_or(true))
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| AppError::from_db(e, "code"))?;
            created.push(material);
        }

        tx.commit().await?;

        tracing::info!("Imported {} materials for user {}", created.len(), ctx.user_id);

        Ok(created)
    }
}

/// Parse and check an uploaded materials file
fn parse_import(bytes: &[u8]) -> AppResult<Vec<CreateMaterialInput>> {
    let inputs: Vec<CreateMaterialInput> = serde_json::from_slice(bytes).map_err(|e| {
        AppError::ValidationError(format!("File must contain a JSON array of materials: {}", e))
    })?;

    if inputs.is_empty() {
        return Err(AppError::ValidationError("File contains no materials".to_string()));
    }

    for input in &inputs {
        input.check()?;
    }

    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_ignores_ids() {
        let bytes = br#"[{"_id":"abc","id":"123","code":"M1","name":"Cable","unit":"m"}]"#;
        let inputs = parse_import(bytes).unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].code, "M1");
        assert_eq!(inputs[0].unit.as_deref(), Some("m"));
    }

    #[test]
    fn test_parse_import_rejects_object() {
        assert!(matches!(
            parse_import(br#"{"code":"M1","name":"Cable"}"#),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_parse_import_rejects_blank_code() {
        assert!(matches!(
            parse_import(br#"[{"code":" ","name":"Cable"}]"#),
            Err(AppError::Validation { ref field, .. }) if field == "code"
        ));
    }

    #[test]
    fn test_parse_import_rejects_empty_array() {
        assert!(parse_import(b"[]").is_err());
    }
}
