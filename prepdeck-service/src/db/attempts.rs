//! Quiz attempt operations.

use rusqlite::params;

use super::Database;
use super::models::QuizAttempt;
use crate::error::{DatabaseError, ServiceResult};

impl Database {
    /// Insert a quiz attempt
    pub fn insert_attempt(&self, attempt: &QuizAttempt) -> ServiceResult<()> {
        let conn = self.conn.lock().unwrap();

        let answers_json =
            serde_json::to_string(&attempt.answers).map_err(DatabaseError::Serialization)?;

        conn.execute(
            r#"
            INSERT INTO quiz_attempts (id, user_id, material_id, total_questions, correct_answers, score, answers, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                attempt.id,
                attempt.user_id,
                attempt.material_id,
                attempt.total_questions as i64,
                attempt.correct_answers as i64,
                attempt.score as i64,
                answers_json,
                attempt.completed_at.to_rfc3339(),
            ],
        )
        .map_err(DatabaseError::Query)?;

        Ok(())
    }

    /// List attempts for a material, newest first, optionally filtered by user
    pub fn list_attempts(
        &self,
        material_id: &str,
        user_id: Option<&str>,
    ) -> ServiceResult<Vec<QuizAttempt>> {
        let conn = self.conn.lock().unwrap();

        let mut attempts = Vec::new();

        if let Some(user_id) = user_id {
            let mut stmt = conn
                .prepare(
                    "SELECT id, user_id, material_id, total_questions, correct_answers, score, answers, completed_at \
                     FROM quiz_attempts WHERE material_id = ?1 AND user_id = ?2 ORDER BY completed_at DESC",
                )
                .map_err(DatabaseError::Query)?;
            let rows = stmt
                .query_map(params![material_id, user_id], QuizAttempt::from_row)
                .map_err(DatabaseError::Query)?;
            for row in rows {
                attempts.push(row.map_err(DatabaseError::Query)?);
            }
        } else {
            let mut stmt = conn
                .prepare(
                    "SELECT id, user_id, material_id, total_questions, correct_answers, score, answers, completed_at \
                     FROM quiz_attempts WHERE material_id = ?1 ORDER BY completed_at DESC",
                )
                .map_err(DatabaseError::Query)?;
            let rows = stmt
                .query_map(params![material_id], QuizAttempt::from_row)
                .map_err(DatabaseError::Query)?;
            for row in rows {
                attempts.push(row.map_err(DatabaseError::Query)?);
            }
        }

        Ok(attempts)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::db::models::{Material, MaterialKind, QuizAttempt, Subject, Topic};
    use crate::db::test_support::open_test_db;

    #[test]
    fn attempt_round_trips_with_answers_json() {
        let (_dir, db) = open_test_db();
        let now = Utc::now();

        let subject = Subject {
            id: Uuid::new_v4().to_string(),
            name: "Essay".to_string(),
            description: None,
            icon: None,
            created_at: now,
            updated_at: now,
        };
        db.insert_subject(&subject).unwrap();
        let topic = Topic {
            id: Uuid::new_v4().to_string(),
            subject_id: subject.id,
            parent_topic_id: None,
            name: "Democracy".to_string(),
            description: None,
            content: None,
            created_at: now,
            updated_at: now,
        };
        db.insert_topic(&topic).unwrap();
        let material = Material {
            id: Uuid::new_v4().to_string(),
            topic_id: topic.id,
            kind: MaterialKind::Mcq,
            title: "Democracy quiz".to_string(),
            description: None,
            content: None,
            display_order: 0,
            created_at: now,
            updated_at: now,
        };
        db.insert_material(&material).unwrap();

        let attempt = QuizAttempt {
            id: Uuid::new_v4().to_string(),
            user_id: "user-1".to_string(),
            material_id: material.id.clone(),
            total_questions: 10,
            correct_answers: 8,
            score: 80,
            answers: serde_json::json!([
                { "question_id": "q-1", "selected_answer": "A", "is_correct": true }
            ]),
            completed_at: now,
        };
        db.insert_attempt(&attempt).unwrap();

        let listed = db.list_attempts(&material.id, Some("user-1")).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].score, 80);
        assert_eq!(listed[0].answers[0]["selected_answer"], "A");

        assert!(
            db.list_attempts(&material.id, Some("someone-else"))
                .unwrap()
                .is_empty()
        );
    }
}
