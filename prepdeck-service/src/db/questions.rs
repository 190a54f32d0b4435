//! MCQ question operations.

use rusqlite::params;

use super::Database;
use super::models::McqQuestion;
use crate::error::{DatabaseError, ServiceResult};

const QUESTION_COLUMNS: &str = "id, material_id, question, question_urdu, \
     option_a, option_a_urdu, option_b, option_b_urdu, option_c, option_c_urdu, \
     option_d, option_d_urdu, correct_answer, explanation, explanation_urdu, display_order";

impl Database {
    /// Bulk insert questions in one transaction
    pub fn insert_questions_bulk(&self, questions: &[McqQuestion]) -> ServiceResult<()> {
        let mut conn = self.conn.lock().unwrap();

        let tx = conn.transaction().map_err(DatabaseError::Query)?;
        for question in questions {
            insert_question_inner(&tx, question)?;
        }
        tx.commit().map_err(DatabaseError::Query)?;

        Ok(())
    }

    /// List questions for a material in display order
    pub fn list_questions(&self, material_id: &str) -> ServiceResult<Vec<McqQuestion>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {QUESTION_COLUMNS} FROM mcq_questions WHERE material_id = ?1 ORDER BY display_order"
            ))
            .map_err(DatabaseError::Query)?;

        let rows = stmt
            .query_map(params![material_id], McqQuestion::from_row)
            .map_err(DatabaseError::Query)?;

        let mut questions = Vec::new();
        for row in rows {
            questions.push(row.map_err(DatabaseError::Query)?);
        }

        Ok(questions)
    }

    /// Count questions for a material
    pub fn get_question_count(&self, material_id: &str) -> ServiceResult<usize> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM mcq_questions WHERE material_id = ?1",
                params![material_id],
                |row| row.get(0),
            )
            .map_err(DatabaseError::Query)?;

        Ok(count as usize)
    }

    /// Delete a question
    pub fn delete_question(&self, id: &str) -> ServiceResult<bool> {
        let conn = self.conn.lock().unwrap();

        let rows = conn
            .execute("DELETE FROM mcq_questions WHERE id = ?1", params![id])
            .map_err(DatabaseError::Query)?;

        Ok(rows > 0)
    }
}

fn insert_question_inner(
    conn: &rusqlite::Connection,
    question: &McqQuestion,
) -> ServiceResult<()> {
    conn.execute(
        r#"
        INSERT INTO mcq_questions (
            id, material_id, question, question_urdu,
            option_a, option_a_urdu, option_b, option_b_urdu,
            option_c, option_c_urdu, option_d, option_d_urdu,
            correct_answer, explanation, explanation_urdu, display_order
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
        "#,
        params![
            question.id,
            question.material_id,
            question.question,
            question.question_urdu,
            question.option_a,
            question.option_a_urdu,
            question.option_b,
            question.option_b_urdu,
            question.option_c,
            question.option_c_urdu,
            question.option_d,
            question.option_d_urdu,
            question.correct_answer.as_str(),
            question.explanation,
            question.explanation_urdu,
            question.display_order,
        ],
    )
    .map_err(DatabaseError::Query)?;

    Ok(())
}
