//! Topic CRUD operations.

use rusqlite::{OptionalExtension, params};

use super::Database;
use super::models::Topic;
use crate::error::{DatabaseError, ServiceResult};

const TOPIC_COLUMNS: &str =
    "id, subject_id, parent_topic_id, name, description, content, created_at, updated_at";

impl Database {
    /// Insert a new topic
    pub fn insert_topic(&self, topic: &Topic) -> ServiceResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            INSERT INTO topics (id, subject_id, parent_topic_id, name, description, content, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                topic.id,
                topic.subject_id,
                topic.parent_topic_id,
                topic.name,
                topic.description,
                topic.content,
                topic.created_at.to_rfc3339(),
                topic.updated_at.to_rfc3339(),
            ],
        )
        .map_err(DatabaseError::Query)?;

        Ok(())
    }

    /// Get a topic by ID
    pub fn get_topic(&self, id: &str) -> ServiceResult<Option<Topic>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            &format!("SELECT {TOPIC_COLUMNS} FROM topics WHERE id = ?1"),
            params![id],
            Topic::from_row,
        )
        .optional()
        .map_err(DatabaseError::Query)
        .map_err(Into::into)
    }

    /// List topics, optionally filtered by subject
    pub fn list_topics(&self, subject_id: Option<&str>) -> ServiceResult<Vec<Topic>> {
        let conn = self.conn.lock().unwrap();

        let mut topics = Vec::new();

        if let Some(subject_id) = subject_id {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {TOPIC_COLUMNS} FROM topics WHERE subject_id = ?1 ORDER BY name"
                ))
                .map_err(DatabaseError::Query)?;
            let rows = stmt
                .query_map(params![subject_id], Topic::from_row)
                .map_err(DatabaseError::Query)?;
            for row in rows {
                topics.push(row.map_err(DatabaseError::Query)?);
            }
        } else {
            let mut stmt = conn
                .prepare(&format!("SELECT {TOPIC_COLUMNS} FROM topics ORDER BY name"))
                .map_err(DatabaseError::Query)?;
            let rows = stmt
                .query_map([], Topic::from_row)
                .map_err(DatabaseError::Query)?;
            for row in rows {
                topics.push(row.map_err(DatabaseError::Query)?);
            }
        }

        Ok(topics)
    }

    /// Update a topic's editable fields
    pub fn update_topic(
        &self,
        id: &str,
        name: &str,
        description: Option<&str>,
        content: Option<&str>,
    ) -> ServiceResult<bool> {
        let conn = self.conn.lock().unwrap();

        let rows = conn
            .execute(
                "UPDATE topics SET name = ?1, description = ?2, content = ?3, updated_at = datetime('now') WHERE id = ?4",
                params![name, description, content, id],
            )
            .map_err(DatabaseError::Query)?;

        Ok(rows > 0)
    }

    /// Delete a topic and all nested content
    pub fn delete_topic(&self, id: &str) -> ServiceResult<bool> {
        let conn = self.conn.lock().unwrap();

        let rows = conn
            .execute("DELETE FROM topics WHERE id = ?1", params![id])
            .map_err(DatabaseError::Query)?;

        Ok(rows > 0)
    }
}
