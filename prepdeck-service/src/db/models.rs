//! Database model structs.
//!
//! This module contains the data structures for database records.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::generation::questions::AnswerLetter;

/// Status of a generation job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created, no chunk dispatched yet
    Pending,
    /// At least one chunk has been dispatched
    Processing,
    /// All chunks attempted, at least one question produced
    Completed,
    /// Unrecoverable error or zero questions produced
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => JobStatus::Pending,
            "processing" => JobStatus::Processing,
            "completed" => JobStatus::Completed,
            _ => JobStatus::Failed,
        }
    }
}

/// Kind of generation job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    McqGeneration,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::McqGeneration => "mcq_generation",
        }
    }

    pub fn from_str(_s: &str) -> Self {
        JobKind::McqGeneration
    }
}

/// Kind of study material attached to a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    Theory,
    Mcq,
    Book,
    Essay,
}

impl MaterialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialKind::Theory => "theory",
            MaterialKind::Mcq => "mcq",
            MaterialKind::Book => "book",
            MaterialKind::Essay => "essay",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "mcq" => MaterialKind::Mcq,
            "book" => MaterialKind::Book,
            "essay" => MaterialKind::Essay,
            _ => MaterialKind::Theory,
        }
    }
}

/// Subject record (e.g. Pakistan Affairs, Current Affairs)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subject {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        let created_at_str: String = row.get(4)?;
        let updated_at_str: String = row.get(5)?;

        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            icon: row.get(3)?,
            created_at: parse_timestamp(&created_at_str),
            updated_at: parse_timestamp(&updated_at_str),
        })
    }
}

/// Topic record, optionally nested under a parent topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub subject_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_topic_id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Saved theory/source text for the topic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Topic {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        let created_at_str: String = row.get(6)?;
        let updated_at_str: String = row.get(7)?;

        Ok(Self {
            id: row.get(0)?,
            subject_id: row.get(1)?,
            parent_topic_id: row.get(2)?,
            name: row.get(3)?,
            description: row.get(4)?,
            content: row.get(5)?,
            created_at: parse_timestamp(&created_at_str),
            updated_at: parse_timestamp(&updated_at_str),
        })
    }
}

/// Material record (theory notes, MCQ quiz, book chapter, essay)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub topic_id: String,
    pub kind: MaterialKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Material {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        let kind_str: String = row.get(2)?;
        let created_at_str: String = row.get(7)?;
        let updated_at_str: String = row.get(8)?;

        Ok(Self {
            id: row.get(0)?,
            topic_id: row.get(1)?,
            kind: MaterialKind::from_str(&kind_str),
            title: row.get(3)?,
            description: row.get(4)?,
            content: row.get(5)?,
            display_order: row.get(6)?,
            created_at: parse_timestamp(&created_at_str),
            updated_at: parse_timestamp(&updated_at_str),
        })
    }
}

/// MCQ question record, letter-keyed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqQuestion {
    pub id: String,
    pub material_id: String,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_urdu: Option<String>,
    pub option_a: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_a_urdu: Option<String>,
    pub option_b: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_b_urdu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_c_urdu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_d: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_d_urdu: Option<String>,
    pub correct_answer: AnswerLetter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation_urdu: Option<String>,
    pub display_order: i32,
}

impl McqQuestion {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        let correct_str: String = row.get(12)?;

        Ok(Self {
            id: row.get(0)?,
            material_id: row.get(1)?,
            question: row.get(2)?,
            question_urdu: row.get(3)?,
            option_a: row.get(4)?,
            option_a_urdu: row.get(5)?,
            option_b: row.get(6)?,
            option_b_urdu: row.get(7)?,
            option_c: row.get(8)?,
            option_c_urdu: row.get(9)?,
            option_d: row.get(10)?,
            option_d_urdu: row.get(11)?,
            correct_answer: AnswerLetter::from_str(&correct_str).unwrap_or(AnswerLetter::A),
            explanation: row.get(13)?,
            explanation_urdu: row.get(14)?,
            display_order: row.get(15)?,
        })
    }
}

/// Recorded quiz attempt with per-question answers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: String,
    pub user_id: String,
    pub material_id: String,
    pub total_questions: u32,
    pub correct_answers: u32,
    /// Percentage 0-100
    pub score: u32,
    /// JSON array of {question_id, selected_answer, is_correct}
    pub answers: serde_json::Value,
    pub completed_at: DateTime<Utc>,
}

impl QuizAttempt {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        let answers_str: String = row.get(6)?;
        let completed_at_str: String = row.get(7)?;

        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            material_id: row.get(2)?,
            total_questions: row.get::<_, i64>(3)? as u32,
            correct_answers: row.get::<_, i64>(4)? as u32,
            score: row.get::<_, i64>(5)? as u32,
            answers: serde_json::from_str(&answers_str)
                .unwrap_or(serde_json::Value::Array(vec![])),
            completed_at: parse_timestamp(&completed_at_str),
        })
    }
}

/// Generation job record consulted by polling clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationJob {
    pub id: String,
    pub user_id: String,
    pub kind: JobKind,
    pub status: JobStatus,
    /// Truncated copy of the source text, kept for reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_preview: Option<String>,
    /// Output summary payload once completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    pub total_chunks: usize,
    pub processed_chunks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl GenerationJob {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        let kind_str: String = row.get(2)?;
        let status_str: String = row.get(3)?;
        let output_str: Option<String> = row.get(5)?;
        let total_chunks: i64 = row.get(6)?;
        let processed_chunks: i64 = row.get(7)?;
        let created_at_str: String = row.get(9)?;
        let completed_at_str: Option<String> = row.get(10)?;

        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            kind: JobKind::from_str(&kind_str),
            status: JobStatus::from_str(&status_str),
            input_preview: row.get(4)?,
            output: output_str.and_then(|s| serde_json::from_str(&s).ok()),
            total_chunks: total_chunks as usize,
            processed_chunks: processed_chunks as usize,
            error_message: row.get(8)?,
            created_at: parse_timestamp(&created_at_str),
            completed_at: completed_at_str.as_deref().map(parse_timestamp),
        })
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_status_round_trips() {
        for status in [
            JobStatus::Pending,
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert_eq!(JobStatus::from_str(status.as_str()), status);
        }
    }

    #[test]
    fn material_kind_round_trips() {
        for kind in [
            MaterialKind::Theory,
            MaterialKind::Mcq,
            MaterialKind::Book,
            MaterialKind::Essay,
        ] {
            assert_eq!(MaterialKind::from_str(kind.as_str()), kind);
        }
    }
}
