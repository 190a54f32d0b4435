//! Database schema migrations.
//!
//! This module contains all database migrations and schema setup.

use rusqlite::Connection;

use crate::error::{DatabaseError, ServiceResult};

/// Run all database migrations.
///
/// This function is called during database initialization to ensure
/// the schema is up to date.
pub(super) fn run_migrations(conn: &Connection) -> ServiceResult<()> {
    conn.execute_batch(
        r#"
        -- Subjects table
        CREATE TABLE IF NOT EXISTS subjects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            icon TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Topics table (optionally nested via parent_topic_id)
        CREATE TABLE IF NOT EXISTS topics (
            id TEXT PRIMARY KEY,
            subject_id TEXT NOT NULL,
            parent_topic_id TEXT,
            name TEXT NOT NULL,
            description TEXT,
            content TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (subject_id) REFERENCES subjects(id) ON DELETE CASCADE,
            FOREIGN KEY (parent_topic_id) REFERENCES topics(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_topics_subject ON topics(subject_id);
        CREATE INDEX IF NOT EXISTS idx_topics_parent ON topics(parent_topic_id);

        -- Materials table
        CREATE TABLE IF NOT EXISTS materials (
            id TEXT PRIMARY KEY,
            topic_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            content TEXT,
            display_order INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (topic_id) REFERENCES topics(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_materials_topic ON materials(topic_id);

        -- MCQ questions table (letter-keyed correct answers)
        CREATE TABLE IF NOT EXISTS mcq_questions (
            id TEXT PRIMARY KEY,
            material_id TEXT NOT NULL,
            question TEXT NOT NULL,
            question_urdu TEXT,
            option_a TEXT NOT NULL,
            option_a_urdu TEXT,
            option_b TEXT NOT NULL,
            option_b_urdu TEXT,
            option_c TEXT,
            option_c_urdu TEXT,
            option_d TEXT,
            option_d_urdu TEXT,
            correct_answer TEXT NOT NULL,
            explanation TEXT,
            explanation_urdu TEXT,
            display_order INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (material_id) REFERENCES materials(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_mcq_questions_material ON mcq_questions(material_id);

        -- Quiz attempts table (per-question answers stored as JSON)
        CREATE TABLE IF NOT EXISTS quiz_attempts (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            material_id TEXT NOT NULL,
            total_questions INTEGER NOT NULL,
            correct_answers INTEGER NOT NULL,
            score INTEGER NOT NULL,
            answers TEXT NOT NULL,
            completed_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (material_id) REFERENCES materials(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_quiz_attempts_material ON quiz_attempts(material_id);
        CREATE INDEX IF NOT EXISTS idx_quiz_attempts_user ON quiz_attempts(user_id);

        -- Generation jobs table (polled for progress)
        CREATE TABLE IF NOT EXISTS generation_jobs (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            input_preview TEXT,
            output_data TEXT,
            total_chunks INTEGER NOT NULL DEFAULT 0,
            processed_chunks INTEGER NOT NULL DEFAULT 0,
            error_message TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            completed_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_generation_jobs_user ON generation_jobs(user_id);
        CREATE INDEX IF NOT EXISTS idx_generation_jobs_created ON generation_jobs(created_at);
        "#,
    )
    .map_err(|e| DatabaseError::Migration {
        message: e.to_string(),
    })?;

    Ok(())
}
