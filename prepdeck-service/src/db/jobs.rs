//! Generation job operations.
//!
//! `Database` is the durable `JobStore` used by the generation pipeline;
//! polling clients read the same rows through `get_job`/`list_jobs`.

use rusqlite::{OptionalExtension, params};
use uuid::Uuid;

use super::Database;
use super::models::{GenerationJob, JobKind, JobStatus};
use crate::error::{DatabaseError, ServiceResult};
use crate::generation::orchestrator::{JobStore, NewJob};

const JOB_COLUMNS: &str = "id, user_id, kind, status, input_preview, output_data, \
     total_chunks, processed_chunks, error_message, created_at, completed_at";

impl Database {
    /// Get a job by ID
    pub fn get_job(&self, id: &str) -> ServiceResult<Option<GenerationJob>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            &format!("SELECT {JOB_COLUMNS} FROM generation_jobs WHERE id = ?1"),
            params![id],
            GenerationJob::from_row,
        )
        .optional()
        .map_err(DatabaseError::Query)
        .map_err(Into::into)
    }

    /// List jobs, newest first, optionally filtered by user
    pub fn list_jobs(&self, user_id: Option<&str>) -> ServiceResult<Vec<GenerationJob>> {
        let conn = self.conn.lock().unwrap();

        let mut jobs = Vec::new();

        if let Some(user_id) = user_id {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {JOB_COLUMNS} FROM generation_jobs WHERE user_id = ?1 ORDER BY created_at DESC"
                ))
                .map_err(DatabaseError::Query)?;
            let rows = stmt
                .query_map(params![user_id], GenerationJob::from_row)
                .map_err(DatabaseError::Query)?;
            for row in rows {
                jobs.push(row.map_err(DatabaseError::Query)?);
            }
        } else {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {JOB_COLUMNS} FROM generation_jobs ORDER BY created_at DESC"
                ))
                .map_err(DatabaseError::Query)?;
            let rows = stmt
                .query_map([], GenerationJob::from_row)
                .map_err(DatabaseError::Query)?;
            for row in rows {
                jobs.push(row.map_err(DatabaseError::Query)?);
            }
        }

        Ok(jobs)
    }
}

impl JobStore for Database {
    fn create_job(&self, job: NewJob<'_>) -> ServiceResult<String> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::new_v4().to_string();

        conn.execute(
            r#"
            INSERT INTO generation_jobs (id, user_id, kind, status, input_preview, total_chunks, processed_chunks)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)
            "#,
            params![
                id,
                job.user_id,
                JobKind::McqGeneration.as_str(),
                JobStatus::Pending.as_str(),
                job.input_preview,
                job.total_chunks as i64,
            ],
        )
        .map_err(DatabaseError::Query)?;

        Ok(id)
    }

    fn update_progress(&self, job_id: &str, processed: usize) -> ServiceResult<()> {
        let conn = self.conn.lock().unwrap();

        // MAX keeps repeated or out-of-order writes from regressing the
        // count; the first write also moves a pending job to processing.
        conn.execute(
            r#"
            UPDATE generation_jobs
            SET processed_chunks = MAX(processed_chunks, ?2),
                status = CASE WHEN status = 'pending' THEN 'processing' ELSE status END
            WHERE id = ?1
            "#,
            params![job_id, processed as i64],
        )
        .map_err(DatabaseError::Query)?;

        Ok(())
    }

    fn complete_job(&self, job_id: &str, output: &serde_json::Value) -> ServiceResult<()> {
        let conn = self.conn.lock().unwrap();

        let output_json = serde_json::to_string(output).map_err(DatabaseError::Serialization)?;

        conn.execute(
            r#"
            UPDATE generation_jobs
            SET status = ?2, output_data = ?3, completed_at = ?4
            WHERE id = ?1
            "#,
            params![
                job_id,
                JobStatus::Completed.as_str(),
                output_json,
                chrono::Utc::now().to_rfc3339(),
            ],
        )
        .map_err(DatabaseError::Query)?;

        Ok(())
    }

    fn fail_job(&self, job_id: &str, error_message: &str) -> ServiceResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            UPDATE generation_jobs
            SET status = ?2, error_message = ?3, completed_at = ?4
            WHERE id = ?1
            "#,
            params![
                job_id,
                JobStatus::Failed.as_str(),
                error_message,
                chrono::Utc::now().to_rfc3339(),
            ],
        )
        .map_err(DatabaseError::Query)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::open_test_db;

    fn create_test_job(db: &Database, total_chunks: usize) -> String {
        db.create_job(NewJob {
            user_id: "user-1",
            input_preview: "The Indus Waters Treaty was signed in 1960...",
            total_chunks,
        })
        .expect("create job")
    }

    #[test]
    fn created_job_starts_pending() {
        let (_dir, db) = open_test_db();
        let id = create_test_job(&db, 3);

        let job = db.get_job(&id).unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.total_chunks, 3);
        assert_eq!(job.processed_chunks, 0);
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn first_progress_write_moves_job_to_processing() {
        let (_dir, db) = open_test_db();
        let id = create_test_job(&db, 3);

        db.update_progress(&id, 0).unwrap();
        let job = db.get_job(&id).unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.processed_chunks, 0);
    }

    #[test]
    fn progress_never_regresses() {
        let (_dir, db) = open_test_db();
        let id = create_test_job(&db, 3);

        db.update_progress(&id, 2).unwrap();
        db.update_progress(&id, 1).unwrap();
        db.update_progress(&id, 2).unwrap();

        let job = db.get_job(&id).unwrap().unwrap();
        assert_eq!(job.processed_chunks, 2);
    }

    #[test]
    fn completion_records_output_summary() {
        let (_dir, db) = open_test_db();
        let id = create_test_job(&db, 2);

        let output = serde_json::json!({ "material_id": "m-1", "question_count": 27 });
        db.complete_job(&id, &output).unwrap();

        let job = db.get_job(&id).unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.output.unwrap()["question_count"], 27);
        assert!(job.completed_at.is_some());
    }

    #[test]
    fn failure_records_error_message() {
        let (_dir, db) = open_test_db();
        let id = create_test_job(&db, 2);

        db.fail_job(&id, "No questions could be generated").unwrap();

        let job = db.get_job(&id).unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(
            job.error_message.as_deref(),
            Some("No questions could be generated")
        );
    }

    #[test]
    fn jobs_list_filters_by_user() {
        let (_dir, db) = open_test_db();
        create_test_job(&db, 1);
        let theirs = db
            .create_job(NewJob {
                user_id: "user-2",
                input_preview: "",
                total_chunks: 1,
            })
            .unwrap();

        let jobs = db.list_jobs(Some("user-2")).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, theirs);
        assert_eq!(db.list_jobs(None).unwrap().len(), 2);
    }
}
