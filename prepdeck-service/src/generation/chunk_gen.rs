//! Per-chunk question generation.
//!
//! One generation request per chunk, retried on transient failures, with
//! defensive re-validation of every returned item. Invalid items are
//! dropped individually rather than failing the chunk.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::chunker::TextChunk;
use crate::config::GenerationConfig;
use crate::error::{GenerationError, ServiceResult};
use crate::gemini::{GeminiClient, GenerateRequest};
use crate::generation::prompts::{QuizContext, quiz_prompt, quiz_response_schema, quiz_system_instruction};
use crate::generation::questions::{GeneratedQuestion, RawQuestion};
use crate::generation::retry::RetryPolicy;

/// Questions produced from a single chunk
#[derive(Debug, Default)]
pub struct ChunkYield {
    pub questions: Vec<GeneratedQuestion>,
    /// Items the service returned that failed validation and were dropped
    pub dropped: usize,
}

/// Source of questions for one chunk.
///
/// The orchestrator only depends on this seam, which keeps it independent
/// of the concrete generation service.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn generate(&self, chunk: &TextChunk, ctx: &QuizContext<'_>)
    -> ServiceResult<ChunkYield>;
}

/// Gemini-backed question source
pub struct GeminiQuestionSource {
    client: Arc<GeminiClient>,
    config: GenerationConfig,
}

impl GeminiQuestionSource {
    pub fn new(client: Arc<GeminiClient>, config: GenerationConfig) -> Self {
        Self { client, config }
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.config.retry_policy()
    }
}

#[async_trait]
impl QuestionSource for GeminiQuestionSource {
    async fn generate(
        &self,
        chunk: &TextChunk,
        ctx: &QuizContext<'_>,
    ) -> ServiceResult<ChunkYield> {
        let policy = self.retry_policy();
        let system = quiz_system_instruction(ctx.include_urdu);
        let label = format!("chunk {}", chunk.index + 1);

        let response = policy
            .run(&label, |_| {
                self.client.generate_structured(GenerateRequest {
                    system_instruction: &system,
                    prompt: quiz_prompt(chunk, ctx, &self.config),
                    response_schema: Some(quiz_response_schema(ctx.include_urdu)),
                })
            })
            .await
            .map_err(|e| GenerationError::ChunkFailed {
                chunk_index: chunk.index,
                attempts: policy.max_attempts,
                source: Box::new(e),
            })?;

        let raw_items = parse_question_items(response);
        let parsed = raw_items.len();

        let questions: Vec<GeneratedQuestion> = raw_items
            .into_iter()
            .filter_map(GeneratedQuestion::from_raw)
            .collect();
        let dropped = parsed - questions.len();

        if dropped > 0 {
            warn!(
                chunk_index = chunk.index,
                parsed,
                accepted = questions.len(),
                dropped,
                "Dropped malformed question items from chunk response"
            );
        }
        debug!(
            chunk_index = chunk.index,
            questions = questions.len(),
            "Chunk generation complete"
        );

        Ok(ChunkYield { questions, dropped })
    }
}

/// Pull question items out of a schema-constrained response.
///
/// The service normally returns `{"questions": [...]}`, but a bare array
/// is accepted too. Items that do not even deserialize are dropped here;
/// field-level validation happens in `GeneratedQuestion::from_raw`.
pub(crate) fn parse_question_items(response: serde_json::Value) -> Vec<RawQuestion> {
    let items = match response {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("questions") {
            Some(serde_json::Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_questions_object() {
        let response = serde_json::json!({
            "questions": [
                {
                    "question": "Q1?",
                    "options": ["a", "b"],
                    "correct_answer": "a",
                    "explanation": "because"
                }
            ]
        });

        let items = parse_question_items(response);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].question, "Q1?");
    }

    #[test]
    fn parses_bare_array() {
        let response = serde_json::json!([
            { "question": "Q1?", "options": ["a", "b"], "correct_answer": "b" }
        ]);

        assert_eq!(parse_question_items(response).len(), 1);
    }

    #[test]
    fn non_question_payload_yields_nothing() {
        assert!(parse_question_items(serde_json::json!({ "foo": 1 })).is_empty());
        assert!(parse_question_items(serde_json::json!("text")).is_empty());
    }

    #[test]
    fn undeserializable_items_are_skipped() {
        let response = serde_json::json!({
            "questions": [
                { "question": "Q1?", "options": ["a", "b"], "correct_answer": "a" },
                "not an object"
            ]
        });

        let items = parse_question_items(response);
        assert_eq!(items.len(), 1);
    }
}
