//! Material CRUD operations.

use rusqlite::{OptionalExtension, params};

use super::Database;
use super::models::Material;
use crate::error::{DatabaseError, ServiceResult};

const MATERIAL_COLUMNS: &str =
    "id, topic_id, kind, title, description, content, display_order, created_at, updated_at";

impl Database {
    /// Insert a new material
    pub fn insert_material(&self, material: &Material) -> ServiceResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            INSERT INTO materials (id, topic_id, kind, title, description, content, display_order, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                material.id,
                material.topic_id,
                material.kind.as_str(),
                material.title,
                material.description,
                material.content,
                material.display_order,
                material.created_at.to_rfc3339(),
                material.updated_at.to_rfc3339(),
            ],
        )
        .map_err(DatabaseError::Query)?;

        Ok(())
    }

    /// Get a material by ID
    pub fn get_material(&self, id: &str) -> ServiceResult<Option<Material>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            &format!("SELECT {MATERIAL_COLUMNS} FROM materials WHERE id = ?1"),
            params![id],
            Material::from_row,
        )
        .optional()
        .map_err(DatabaseError::Query)
        .map_err(Into::into)
    }

    /// List materials, optionally filtered by topic
    pub fn list_materials(&self, topic_id: Option<&str>) -> ServiceResult<Vec<Material>> {
        let conn = self.conn.lock().unwrap();

        let mut materials = Vec::new();

        if let Some(topic_id) = topic_id {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {MATERIAL_COLUMNS} FROM materials WHERE topic_id = ?1 ORDER BY display_order, created_at"
                ))
                .map_err(DatabaseError::Query)?;
            let rows = stmt
                .query_map(params![topic_id], Material::from_row)
                .map_err(DatabaseError::Query)?;
            for row in rows {
                materials.push(row.map_err(DatabaseError::Query)?);
            }
        } else {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {MATERIAL_COLUMNS} FROM materials ORDER BY display_order, created_at"
                ))
                .map_err(DatabaseError::Query)?;
            let rows = stmt
                .query_map([], Material::from_row)
                .map_err(DatabaseError::Query)?;
            for row in rows {
                materials.push(row.map_err(DatabaseError::Query)?);
            }
        }

        Ok(materials)
    }

    /// Update a material's editable fields
    pub fn update_material(
        &self,
        id: &str,
        title: &str,
        description: Option<&str>,
        content: Option<&str>,
    ) -> ServiceResult<bool> {
        let conn = self.conn.lock().unwrap();

        let rows = conn
            .execute(
                "UPDATE materials SET title = ?1, description = ?2, content = ?3, updated_at = datetime('now') WHERE id = ?4",
                params![title, description, content, id],
            )
            .map_err(DatabaseError::Query)?;

        Ok(rows > 0)
    }

    /// Delete a material and its questions/attempts
    pub fn delete_material(&self, id: &str) -> ServiceResult<bool> {
        let conn = self.conn.lock().unwrap();

        let rows = conn
            .execute("DELETE FROM materials WHERE id = ?1", params![id])
            .map_err(DatabaseError::Query)?;

        Ok(rows > 0)
    }
}
