//! Chunked MCQ quiz generation jobs.
//!
//! A request creates the job row plus placeholder materials, then runs
//! the generation pipeline on a spawned task. Clients poll the job for
//! progress; the placeholder MCQ material is rolled back (best effort)
//! when generation ultimately fails.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::chunker::chunk_count;
use crate::db::{Material, MaterialKind, McqQuestion, Topic};
use crate::error::{GenerationError, ServiceError, ServiceResult};
use crate::gemini::GeminiClient;
use crate::generation::questions::AnswerLetter;
use crate::generation::{
    GeminiQuestionSource, GeneratedQuestion, JobStore, NewJob, QuizRequest, run_job,
};
use crate::service::PrepdeckService;

/// Characters of source text kept on the job record for reference
const INPUT_PREVIEW_CHARS: usize = 1000;

/// Response for a freshly started generation job
#[derive(Debug, Clone, serde::Serialize)]
pub struct QuizGenerationStarted {
    pub job_id: String,
    pub topic_id: String,
    pub material_id: String,
    pub theory_material_id: String,
    pub total_chunks: usize,
}

/// One letter-keyed question supplied by the bulk import endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ImportedQuestion {
    pub question: String,
    #[serde(default)]
    pub question_urdu: Option<String>,
    pub option_a: String,
    #[serde(default)]
    pub option_a_urdu: Option<String>,
    pub option_b: String,
    #[serde(default)]
    pub option_b_urdu: Option<String>,
    #[serde(default)]
    pub option_c: Option<String>,
    #[serde(default)]
    pub option_c_urdu: Option<String>,
    #[serde(default)]
    pub option_d: Option<String>,
    #[serde(default)]
    pub option_d_urdu: Option<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub explanation_urdu: Option<String>,
}

impl PrepdeckService {
    /// Start a generation job for an existing topic
    pub fn start_quiz_generation(
        self: &Arc<Self>,
        user_id: &str,
        topic_id: &str,
        title: &str,
        text: String,
        include_urdu: bool,
    ) -> ServiceResult<QuizGenerationStarted> {
        let gemini = self.gemini()?;
        let topic = self
            .db
            .get_topic(topic_id)?
            .ok_or_else(|| ServiceError::TopicNotFound {
                topic_id: topic_id.to_string(),
            })?;

        self.begin_generation(gemini, user_id, &topic, title, text, include_urdu)
    }

    /// Create a topic under a subject and start a generation job for it
    pub fn create_topic_with_quiz(
        self: &Arc<Self>,
        user_id: &str,
        subject_id: &str,
        topic_name: &str,
        text: String,
        include_urdu: bool,
    ) -> ServiceResult<QuizGenerationStarted> {
        let gemini = self.gemini()?;
        if self.db.get_subject(subject_id)?.is_none() {
            return Err(ServiceError::SubjectNotFound {
                subject_id: subject_id.to_string(),
            });
        }

        let now = Utc::now();
        let topic = Topic {
            id: Uuid::new_v4().to_string(),
            subject_id: subject_id.to_string(),
            parent_topic_id: None,
            name: topic_name.to_string(),
            description: Some("Auto-created topic with AI-generated MCQs".to_string()),
            content: None,
            created_at: now,
            updated_at: now,
        };
        self.db.insert_topic(&topic)?;

        let title = format!("{topic_name} - MCQs");
        self.begin_generation(gemini, user_id, &topic, &title, text, include_urdu)
    }

    fn begin_generation(
        self: &Arc<Self>,
        gemini: Arc<GeminiClient>,
        user_id: &str,
        topic: &Topic,
        title: &str,
        text: String,
        include_urdu: bool,
    ) -> ServiceResult<QuizGenerationStarted> {
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(GenerationError::EmptyInput.into());
        }

        let total_chunks = chunk_count(&text, self.config.generation.chunk_size);
        if total_chunks == 0 {
            return Err(GenerationError::EmptyInput.into());
        }

        let preview: String = text.chars().take(INPUT_PREVIEW_CHARS).collect();
        let job_id = self.db.create_job(NewJob {
            user_id,
            input_preview: &preview,
            total_chunks,
        })?;

        let now = Utc::now();
        // Placeholder for the generated quiz; rolled back if the job fails
        let material = Material {
            id: Uuid::new_v4().to_string(),
            topic_id: topic.id.clone(),
            kind: MaterialKind::Mcq,
            title: title.to_string(),
            description: Some(format!("AI-generated quiz from {total_chunks} text chunks")),
            content: None,
            display_order: 0,
            created_at: now,
            updated_at: now,
        };
        self.db.insert_material(&material)?;

        // Companion theory material preserves the source text
        let theory = Material {
            id: Uuid::new_v4().to_string(),
            topic_id: topic.id.clone(),
            kind: MaterialKind::Theory,
            title: format!("{title} - Study Notes"),
            description: Some("Original study material".to_string()),
            content: Some(text.clone()),
            display_order: 1,
            created_at: now,
            updated_at: now,
        };
        self.db.insert_material(&theory)?;

        info!(
            job_id = %job_id,
            topic_id = %topic.id,
            material_id = %material.id,
            chunks = total_chunks,
            "Quiz generation job queued"
        );

        let service = Arc::clone(self);
        let spawn_job_id = job_id.clone();
        let spawn_material_id = material.id.clone();
        let topic_name = topic.name.clone();
        tokio::spawn(async move {
            service
                .run_quiz_generation(
                    gemini,
                    spawn_job_id,
                    spawn_material_id,
                    topic_name,
                    text,
                    include_urdu,
                )
                .await;
        });

        Ok(QuizGenerationStarted {
            job_id,
            topic_id: topic.id.clone(),
            material_id: material.id,
            theory_material_id: theory.id,
            total_chunks,
        })
    }

    /// Drive one generation job to its terminal state (spawned task)
    async fn run_quiz_generation(
        &self,
        gemini: Arc<GeminiClient>,
        job_id: String,
        material_id: String,
        topic_name: String,
        text: String,
        include_urdu: bool,
    ) {
        let source = GeminiQuestionSource::new(gemini, self.config.generation.clone());
        let request = QuizRequest {
            text: &text,
            topic_name: &topic_name,
            include_urdu,
        };

        match run_job(
            &source,
            self.db.as_ref(),
            &self.config.generation,
            &job_id,
            request,
        )
        .await
        {
            Ok(outcome) => {
                let rows = question_rows(&material_id, &outcome.questions);
                if let Err(e) = self.db.insert_questions_bulk(&rows) {
                    error!(job_id = %job_id, error = %e, "Failed to save generated questions");
                    self.finalize_failed(
                        &job_id,
                        &material_id,
                        &format!("Failed to save generated questions: {e}"),
                    );
                    return;
                }

                let output = serde_json::json!({
                    "material_id": material_id,
                    "question_count": rows.len(),
                    "failed_chunks": outcome.failed_chunks,
                    "dropped_items": outcome.dropped_items,
                });
                if let Err(e) = self.db.complete_job(&job_id, &output) {
                    // Job finished but the terminal state is missing
                    error!(job_id = %job_id, error = %e, "Failed to mark job as completed");
                }

                info!(
                    job_id = %job_id,
                    material_id = %material_id,
                    questions = rows.len(),
                    "Quiz generation job completed"
                );
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Quiz generation job failed");
                self.finalize_failed(&job_id, &material_id, &e.to_string());
            }
        }
    }

    fn finalize_failed(&self, job_id: &str, material_id: &str, message: &str) {
        if let Err(e) = self.db.fail_job(job_id, message) {
            warn!(job_id = %job_id, error = %e, "Failed to mark job as failed");
        }

        // Best-effort rollback of the placeholder quiz material
        if let Err(e) = self.db.delete_material(material_id) {
            warn!(
                material_id = %material_id,
                error = %e,
                "Failed to clean up placeholder material after failed generation"
            );
        }
    }

    /// Bulk import letter-keyed questions into an MCQ material
    pub fn import_questions(
        &self,
        material_id: &str,
        items: Vec<ImportedQuestion>,
    ) -> ServiceResult<usize> {
        if items.is_empty() {
            return Err(ServiceError::InvalidRequest {
                message: "Questions array is empty".to_string(),
            });
        }

        let material =
            self.db
                .get_material(material_id)?
                .ok_or_else(|| ServiceError::MaterialNotFound {
                    material_id: material_id.to_string(),
                })?;

        let existing = self.db.get_question_count(&material.id)?;
        let mut rows = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let correct = AnswerLetter::from_str(&item.correct_answer).ok_or_else(|| {
                ServiceError::InvalidRequest {
                    message: format!(
                        "Question {} has invalid correct_answer '{}' (expected A-D)",
                        i + 1,
                        item.correct_answer
                    ),
                }
            })?;
            if item.question.trim().is_empty()
                || item.option_a.trim().is_empty()
                || item.option_b.trim().is_empty()
            {
                return Err(ServiceError::InvalidRequest {
                    message: format!("Question {} is missing required fields", i + 1),
                });
            }
            let marker_resolves = match correct {
                AnswerLetter::A | AnswerLetter::B => true,
                AnswerLetter::C => item.option_c.as_deref().is_some_and(|o| !o.trim().is_empty()),
                AnswerLetter::D => item.option_d.as_deref().is_some_and(|o| !o.trim().is_empty()),
            };
            if !marker_resolves {
                return Err(ServiceError::InvalidRequest {
                    message: format!(
                        "Question {} marks option {} correct but does not supply it",
                        i + 1,
                        correct.as_str()
                    ),
                });
            }

            rows.push(McqQuestion {
                id: Uuid::new_v4().to_string(),
                material_id: material.id.clone(),
                question: item.question,
                question_urdu: item.question_urdu,
                option_a: item.option_a,
                option_a_urdu: item.option_a_urdu,
                option_b: item.option_b,
                option_b_urdu: item.option_b_urdu,
                option_c: item.option_c,
                option_c_urdu: item.option_c_urdu,
                option_d: item.option_d,
                option_d_urdu: item.option_d_urdu,
                correct_answer: correct,
                explanation: item.explanation,
                explanation_urdu: item.explanation_urdu,
                display_order: (existing + i) as i32,
            });
        }

        let count = rows.len();
        self.db.insert_questions_bulk(&rows)?;

        info!(material_id = %material.id, imported = count, "Imported MCQ questions");

        Ok(count)
    }
}

/// Map accepted questions onto persisted rows, assigning display order
/// by pipeline position so quizzes replay in source order.
fn question_rows(material_id: &str, questions: &[GeneratedQuestion]) -> Vec<McqQuestion> {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| McqQuestion {
            id: Uuid::new_v4().to_string(),
            material_id: material_id.to_string(),
            question: q.question.clone(),
            question_urdu: q.question_urdu.clone(),
            option_a: q.options.first().cloned().unwrap_or_default(),
            option_a_urdu: q.options_urdu.first().cloned().flatten(),
            option_b: q.options.get(1).cloned().unwrap_or_default(),
            option_b_urdu: q.options_urdu.get(1).cloned().flatten(),
            option_c: q.options.get(2).cloned(),
            option_c_urdu: q.options_urdu.get(2).cloned().flatten(),
            option_d: q.options.get(3).cloned(),
            option_d_urdu: q.options_urdu.get(3).cloned().flatten(),
            correct_answer: q.correct,
            explanation: q.explanation.clone(),
            explanation_urdu: q.explanation_urdu.clone(),
            display_order: i as i32,
        })
        .collect()
}
