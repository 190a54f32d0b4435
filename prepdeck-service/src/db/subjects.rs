//! Subject CRUD operations.

use rusqlite::{OptionalExtension, params};

use super::Database;
use super::models::Subject;
use crate::error::{DatabaseError, ServiceResult};

impl Database {
    /// Insert a new subject
    pub fn insert_subject(&self, subject: &Subject) -> ServiceResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            INSERT INTO subjects (id, name, description, icon, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                subject.id,
                subject.name,
                subject.description,
                subject.icon,
                subject.created_at.to_rfc3339(),
                subject.updated_at.to_rfc3339(),
            ],
        )
        .map_err(DatabaseError::Query)?;

        Ok(())
    }

    /// Get a subject by ID
    pub fn get_subject(&self, id: &str) -> ServiceResult<Option<Subject>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, name, description, icon, created_at, updated_at FROM subjects WHERE id = ?1",
            params![id],
            Subject::from_row,
        )
        .optional()
        .map_err(DatabaseError::Query)
        .map_err(Into::into)
    }

    /// List all subjects ordered by name
    pub fn list_subjects(&self) -> ServiceResult<Vec<Subject>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT id, name, description, icon, created_at, updated_at FROM subjects ORDER BY name",
            )
            .map_err(DatabaseError::Query)?;

        let rows = stmt
            .query_map([], Subject::from_row)
            .map_err(DatabaseError::Query)?;

        let mut subjects = Vec::new();
        for row in rows {
            subjects.push(row.map_err(DatabaseError::Query)?);
        }

        Ok(subjects)
    }

    /// Update a subject's editable fields
    pub fn update_subject(
        &self,
        id: &str,
        name: &str,
        description: Option<&str>,
        icon: Option<&str>,
    ) -> ServiceResult<bool> {
        let conn = self.conn.lock().unwrap();

        let rows = conn
            .execute(
                "UPDATE subjects SET name = ?1, description = ?2, icon = ?3, updated_at = datetime('now') WHERE id = ?4",
                params![name, description, icon, id],
            )
            .map_err(DatabaseError::Query)?;

        Ok(rows > 0)
    }

    /// Delete a subject and all nested content
    pub fn delete_subject(&self, id: &str) -> ServiceResult<bool> {
        let conn = self.conn.lock().unwrap();

        let rows = conn
            .execute("DELETE FROM subjects WHERE id = ?1", params![id])
            .map_err(DatabaseError::Query)?;

        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::db::models::{Material, MaterialKind, McqQuestion, Subject, Topic};
    use crate::db::test_support::open_test_db;
    use crate::generation::questions::AnswerLetter;

    #[test]
    fn subject_round_trips() {
        let (_dir, db) = open_test_db();
        let now = Utc::now();
        let subject = Subject {
            id: Uuid::new_v4().to_string(),
            name: "Current Affairs".to_string(),
            description: Some("Daily coverage".to_string()),
            icon: Some("newspaper".to_string()),
            created_at: now,
            updated_at: now,
        };
        db.insert_subject(&subject).unwrap();

        let loaded = db.get_subject(&subject.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Current Affairs");
        assert_eq!(loaded.description.as_deref(), Some("Daily coverage"));

        assert!(db.update_subject(&subject.id, "CA", None, None).unwrap());
        let renamed = db.get_subject(&subject.id).unwrap().unwrap();
        assert_eq!(renamed.name, "CA");
        assert!(renamed.description.is_none());
    }

    #[test]
    fn deleting_subject_cascades_to_nested_content() {
        let (_dir, db) = open_test_db();
        let now = Utc::now();

        let subject = Subject {
            id: Uuid::new_v4().to_string(),
            name: "Pakistan Affairs".to_string(),
            description: None,
            icon: None,
            created_at: now,
            updated_at: now,
        };
        db.insert_subject(&subject).unwrap();

        let topic = Topic {
            id: Uuid::new_v4().to_string(),
            subject_id: subject.id.clone(),
            parent_topic_id: None,
            name: "Indus Waters Treaty".to_string(),
            description: None,
            content: None,
            created_at: now,
            updated_at: now,
        };
        db.insert_topic(&topic).unwrap();

        let material = Material {
            id: Uuid::new_v4().to_string(),
            topic_id: topic.id.clone(),
            kind: MaterialKind::Mcq,
            title: "Treaty quiz".to_string(),
            description: None,
            content: None,
            display_order: 0,
            created_at: now,
            updated_at: now,
        };
        db.insert_material(&material).unwrap();

        let question = McqQuestion {
            id: Uuid::new_v4().to_string(),
            material_id: material.id.clone(),
            question: "Which year was the treaty signed?".to_string(),
            question_urdu: None,
            option_a: "1960".to_string(),
            option_a_urdu: None,
            option_b: "1965".to_string(),
            option_b_urdu: None,
            option_c: None,
            option_c_urdu: None,
            option_d: None,
            option_d_urdu: None,
            correct_answer: AnswerLetter::A,
            explanation: None,
            explanation_urdu: None,
            display_order: 0,
        };
        db.insert_questions_bulk(&[question]).unwrap();

        assert!(db.delete_subject(&subject.id).unwrap());

        assert!(db.get_topic(&topic.id).unwrap().is_none());
        assert!(db.get_material(&material.id).unwrap().is_none());
        assert!(db.list_questions(&material.id).unwrap().is_empty());
    }
}
