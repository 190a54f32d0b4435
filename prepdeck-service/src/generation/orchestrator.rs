//! Job orchestration for chunked quiz generation.
//!
//! Drives chunking and per-chunk generation strictly sequentially,
//! reporting progress through the narrow [`JobStore`] interface so the
//! pipeline stays independent of the backing storage.

use tracing::{info, warn};

use crate::chunker::chunk_text;
use crate::config::GenerationConfig;
use crate::error::{GenerationError, ServiceResult};
use crate::generation::chunk_gen::QuestionSource;
use crate::generation::prompts::QuizContext;
use crate::generation::questions::GeneratedQuestion;

/// Fields for a new job record
pub struct NewJob<'a> {
    pub user_id: &'a str,
    pub input_preview: &'a str,
    pub total_chunks: usize,
}

/// Durable job state consumed by the orchestrator and polled by clients.
///
/// Progress writes must be idempotent: repeating an update with the same
/// or a lower processed count never regresses the stored value.
pub trait JobStore: Send + Sync {
    fn create_job(&self, job: NewJob<'_>) -> ServiceResult<String>;
    fn update_progress(&self, job_id: &str, processed: usize) -> ServiceResult<()>;
    fn complete_job(&self, job_id: &str, output: &serde_json::Value) -> ServiceResult<()>;
    fn fail_job(&self, job_id: &str, error_message: &str) -> ServiceResult<()>;
}

/// One quiz generation request
pub struct QuizRequest<'a> {
    pub text: &'a str,
    pub topic_name: &'a str,
    pub include_urdu: bool,
}

/// Aggregated result of a completed pipeline run
#[derive(Debug)]
pub struct QuizOutcome {
    /// All accepted questions in chunk order
    pub questions: Vec<GeneratedQuestion>,
    pub total_chunks: usize,
    /// Chunks that exhausted their retries and contributed nothing
    pub failed_chunks: usize,
    /// Malformed items dropped across all chunk responses
    pub dropped_items: usize,
}

/// Run the chunked generation pipeline for an already-created job.
///
/// Chunks are processed one at a time with a pacing delay between
/// successful chunks. A chunk that exhausts its retries is skipped; the
/// job only fails outright when a precondition fails or no chunk yields
/// any questions. Terminal job state is recorded by the caller, which
/// also owns persisting the outcome.
pub async fn run_job(
    source: &dyn QuestionSource,
    store: &dyn JobStore,
    config: &GenerationConfig,
    job_id: &str,
    request: QuizRequest<'_>,
) -> ServiceResult<QuizOutcome> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(GenerationError::EmptyInput.into());
    }

    let chunks: Vec<_> = chunk_text(text, config.chunk_size).collect();
    if chunks.is_empty() {
        return Err(GenerationError::EmptyInput.into());
    }
    let total_chunks = chunks.len();

    let ctx = QuizContext {
        topic_name: request.topic_name,
        include_urdu: request.include_urdu,
        total_chunks,
    };

    // First dispatch moves the job from pending to processing
    if let Err(e) = store.update_progress(job_id, 0) {
        warn!(job_id = %job_id, error = %e, "Failed to record initial progress");
    }

    info!(
        job_id = %job_id,
        chunks = total_chunks,
        topic = %request.topic_name,
        "Starting chunked quiz generation"
    );

    let mut questions = Vec::new();
    let mut failed_chunks = 0;
    let mut dropped_items = 0;

    for chunk in &chunks {
        let succeeded = match source.generate(chunk, &ctx).await {
            Ok(chunk_yield) => {
                questions.extend(chunk_yield.questions);
                dropped_items += chunk_yield.dropped;
                true
            }
            Err(e) => {
                // Best-effort coverage: a dead chunk is skipped, not fatal
                warn!(
                    job_id = %job_id,
                    chunk_index = chunk.index,
                    error = %e,
                    "Chunk generation failed, skipping chunk"
                );
                failed_chunks += 1;
                false
            }
        };

        // The counter advances whether the chunk succeeded or was skipped
        if let Err(e) = store.update_progress(job_id, chunk.index + 1) {
            warn!(job_id = %job_id, error = %e, "Failed to update job progress");
        }

        // Pace successful chunks to respect upstream rate limits
        if succeeded && chunk.index + 1 < total_chunks {
            tokio::time::sleep(config.chunk_pacing()).await;
        }
    }

    if questions.is_empty() {
        return Err(GenerationError::NoQuestions.into());
    }

    info!(
        job_id = %job_id,
        questions = questions.len(),
        failed_chunks,
        dropped_items,
        "Chunked quiz generation finished"
    );

    Ok(QuizOutcome {
        questions,
        total_chunks,
        failed_chunks,
        dropped_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::chunker::TextChunk;
    use crate::config::default_generation;
    use crate::error::{GeminiError, ServiceError};
    use crate::generation::chunk_gen::ChunkYield;
    use crate::generation::questions::AnswerLetter;

    fn question(tag: &str) -> GeneratedQuestion {
        GeneratedQuestion {
            question: format!("Question {tag}?"),
            question_urdu: None,
            options: vec!["yes".to_string(), "no".to_string()],
            options_urdu: vec![None, None],
            correct: AnswerLetter::A,
            explanation: None,
            explanation_urdu: None,
        }
    }

    /// Source that yields a fixed question count per chunk index, erroring
    /// on the listed indexes.
    struct ScriptedSource {
        yields: HashMap<usize, usize>,
        failing: Vec<usize>,
    }

    #[async_trait]
    impl QuestionSource for ScriptedSource {
        async fn generate(
            &self,
            chunk: &TextChunk,
            _ctx: &QuizContext<'_>,
        ) -> ServiceResult<ChunkYield> {
            if self.failing.contains(&chunk.index) {
                return Err(GenerationError::ChunkFailed {
                    chunk_index: chunk.index,
                    attempts: 3,
                    source: Box::new(ServiceError::Gemini(GeminiError::EmptyResponse)),
                }
                .into());
            }

            let count = self.yields.get(&chunk.index).copied().unwrap_or(0);
            Ok(ChunkYield {
                questions: (0..count)
                    .map(|i| question(&format!("{}-{}", chunk.index, i)))
                    .collect(),
                dropped: 0,
            })
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        progress: Mutex<Vec<usize>>,
    }

    impl JobStore for RecordingStore {
        fn create_job(&self, _job: NewJob<'_>) -> ServiceResult<String> {
            Ok("job-1".to_string())
        }

        fn update_progress(&self, _job_id: &str, processed: usize) -> ServiceResult<()> {
            self.progress.lock().unwrap().push(processed);
            Ok(())
        }

        fn complete_job(&self, _job_id: &str, _output: &serde_json::Value) -> ServiceResult<()> {
            Ok(())
        }

        fn fail_job(&self, _job_id: &str, _error_message: &str) -> ServiceResult<()> {
            Ok(())
        }
    }

    fn test_config() -> GenerationConfig {
        let mut config = default_generation();
        config.chunk_size = 200;
        config
    }

    /// Text long enough to split into exactly `n` chunks at size 200
    fn chunked_text(n: usize) -> String {
        let sentence = "Every fact in this sentence belongs to one chunk of the quiz source. ";
        // ~3 sentences per 200-char window
        sentence.repeat(n * 3).trim().to_string()
    }

    #[tokio::test(start_paused = true)]
    async fn successful_job_aggregates_in_chunk_order() {
        let text = chunked_text(2);
        let total = chunk_text(&text, 200).count();
        assert!(total >= 2);

        let source = ScriptedSource {
            yields: (0..total).map(|i| (i, if i == 0 { 15 } else { 12 })).collect(),
            failing: vec![],
        };
        let store = RecordingStore::default();

        let outcome = run_job(
            &source,
            &store,
            &test_config(),
            "job-1",
            QuizRequest {
                text: &text,
                topic_name: "Indus Waters",
                include_urdu: false,
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.total_chunks, total);
        assert_eq!(outcome.failed_chunks, 0);
        assert_eq!(outcome.questions.len(), 15 + 12 * (total - 1));
        // First chunk's questions come first
        assert!(outcome.questions[0].question.starts_with("Question 0-"));

        let progress = store.progress.lock().unwrap();
        assert_eq!(progress[0], 0);
        assert_eq!(*progress.last().unwrap(), total);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_chunk_is_skipped_and_still_counted() {
        let text = chunked_text(3);
        let total = chunk_text(&text, 200).count();
        assert!(total >= 3);

        let source = ScriptedSource {
            yields: (0..total).map(|i| (i, 5)).collect(),
            failing: vec![1],
        };
        let store = RecordingStore::default();

        let outcome = run_job(
            &source,
            &store,
            &test_config(),
            "job-1",
            QuizRequest {
                text: &text,
                topic_name: "topic",
                include_urdu: false,
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.failed_chunks, 1);
        assert_eq!(outcome.questions.len(), 5 * (total - 1));
        // Progress is monotonic and reaches the total despite the failure
        let progress = store.progress.lock().unwrap();
        assert_eq!(*progress.last().unwrap(), total);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn all_chunks_failing_fails_the_job() {
        let text = chunked_text(2);
        let total = chunk_text(&text, 200).count();

        let source = ScriptedSource {
            yields: HashMap::new(),
            failing: (0..total).collect(),
        };
        let store = RecordingStore::default();

        let result = run_job(
            &source,
            &store,
            &test_config(),
            "job-1",
            QuizRequest {
                text: &text,
                topic_name: "topic",
                include_urdu: false,
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(ServiceError::Generation(GenerationError::NoQuestions))
        ));
        // Every chunk was still attempted and counted
        let progress = store.progress.lock().unwrap();
        assert_eq!(*progress.last().unwrap(), total);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_fails_before_any_chunk() {
        let source = ScriptedSource {
            yields: HashMap::new(),
            failing: vec![],
        };
        let store = RecordingStore::default();

        let result = run_job(
            &source,
            &store,
            &test_config(),
            "job-1",
            QuizRequest {
                text: "   ",
                topic_name: "topic",
                include_urdu: false,
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(ServiceError::Generation(GenerationError::EmptyInput))
        ));
        assert!(store.progress.lock().unwrap().is_empty());
    }
}
