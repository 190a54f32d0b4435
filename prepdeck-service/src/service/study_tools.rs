//! One-shot AI study tools.
//!
//! Theory summaries, essay outlines, article analysis, and mentor chat.
//! These call the generation service directly without job tracking; the
//! chunked pipeline is only used for quiz generation.

use serde::{Deserialize, Serialize};

use crate::error::{GeminiError, ServiceError, ServiceResult};
use crate::gemini::GenerateRequest;
use crate::service::PrepdeckService;

/// Turns of prior conversation inlined into a mentor chat prompt
const MENTOR_HISTORY_TURNS: usize = 10;

const STUDY_TOOLS_SYSTEM_INSTRUCTION: &str =
    "You are an expert CSS/PMS exam preparation coach for aspirants in Pakistan. \
     Produce rigorous, well-structured study material in formal academic language.";

/// Structured result of an article analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleAnalysis {
    pub vocabulary: Vec<VocabularyEntry>,
    pub key_points: Vec<String>,
    pub analytical_angles: Vec<String>,
    pub counter_narratives: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub word: String,
    pub definition: String,
}

/// One prior turn of a mentor conversation
#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl PrepdeckService {
    /// Create structured study notes from source text
    pub async fn theory_summary(&self, text: &str) -> ServiceResult<String> {
        let text = require_text(text, "text")?;
        let gemini = self.gemini()?;

        let prompt = format!(
            r#"Create comprehensive study notes from the following text.

TEXT:
{text}

Create well-structured study notes with:
1. Key concepts and definitions
2. Important points highlighted
3. Clear explanations
4. A summary at the end

Format with markdown for readability."#
        );

        gemini
            .generate_text(STUDY_TOOLS_SYSTEM_INSTRUCTION, prompt)
            .await
    }

    /// Generate an exam-style essay outline for a topic
    pub async fn essay_outline(&self, topic: &str) -> ServiceResult<String> {
        let topic = require_text(topic, "topic")?;
        let gemini = self.gemini()?;

        let prompt = format!(
            r#"Generate a comprehensive essay structure for the following topic that would help a candidate score highly in the CSS Essay Paper.

TOPIC: {topic}

Provide, in markdown:
- A compelling introduction with thesis statement, key definitions, and context
- Three or more major arguments, each with key points, supporting evidence, relevant statistics or case studies, and Pakistan-specific context where applicable
- Counter-arguments addressed critically
- Two or three relevant case studies with brief analysis
- Practical, policy-oriented recommendations
- A conclusion restating the thesis with an impactful closing statement
- Expert tips: writing style, common mistakes, quotations to use, word count management"#
        );

        gemini
            .generate_text(STUDY_TOOLS_SYSTEM_INSTRUCTION, prompt)
            .await
    }

    /// Analyze an article for vocabulary, key points, and perspectives
    pub async fn article_analysis(&self, text: &str) -> ServiceResult<ArticleAnalysis> {
        let text = require_text(text, "text")?;
        let gemini = self.gemini()?;

        let prompt = format!(
            r#"Analyze the following article for academic study purposes.

TEXT:
{text}

Extract:
1. Important vocabulary terms with definitions
2. Key points and main arguments
3. Different analytical angles and perspectives
4. Potential counter-narratives or opposing viewpoints"#
        );

        let response = gemini
            .generate_structured(GenerateRequest {
                system_instruction: STUDY_TOOLS_SYSTEM_INSTRUCTION,
                prompt,
                response_schema: Some(article_analysis_schema()),
            })
            .await?;

        serde_json::from_value(response)
            .map_err(|e| ServiceError::Gemini(GeminiError::InvalidResponse { source: e }))
    }

    /// Answer a student's question with bounded conversation context
    pub async fn mentor_chat(&self, message: &str, history: &[ChatTurn]) -> ServiceResult<String> {
        let message = require_text(message, "message")?;
        let gemini = self.gemini()?;

        let prompt = mentor_prompt(message, history);

        gemini
            .generate_text(STUDY_TOOLS_SYSTEM_INSTRUCTION, prompt)
            .await
    }
}

fn mentor_prompt(message: &str, history: &[ChatTurn]) -> String {
    const MENTOR_PROMPT_TEMPLATE: &str = include_str!("../prompts/mentor.txt");

    let start = history.len().saturating_sub(MENTOR_HISTORY_TURNS);
    let history_context: String = history[start..]
        .iter()
        .map(|turn| {
            let speaker = if turn.role == "user" {
                "Student"
            } else {
                "Mentor"
            };
            format!("{}: {}", speaker, turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    MENTOR_PROMPT_TEMPLATE
        .replace("{history}", &history_context)
        .replace("{message}", message)
}

fn article_analysis_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "vocabulary": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "word": { "type": "STRING" },
                        "definition": { "type": "STRING" }
                    },
                    "required": ["word", "definition"]
                }
            },
            "key_points": { "type": "ARRAY", "items": { "type": "STRING" } },
            "analytical_angles": { "type": "ARRAY", "items": { "type": "STRING" } },
            "counter_narratives": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["vocabulary", "key_points", "analytical_angles", "counter_narratives"]
    })
}

fn require_text<'a>(value: &'a str, field: &str) -> ServiceResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidRequest {
            message: format!("Field '{field}' must not be empty"),
        });
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: &str, content: &str) -> ChatTurn {
        ChatTurn {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn mentor_prompt_inlines_recent_history() {
        let history = vec![
            turn("user", "What is the Objectives Resolution?"),
            turn("assistant", "It was adopted in 1949..."),
        ];

        let prompt = mentor_prompt("When was it made part of the constitution?", &history);
        assert!(prompt.contains("Student: What is the Objectives Resolution?"));
        assert!(prompt.contains("Mentor: It was adopted in 1949..."));
        assert!(prompt.contains("When was it made part of the constitution?"));
    }

    #[test]
    fn mentor_prompt_bounds_history() {
        let history: Vec<_> = (0..25)
            .map(|i| turn("user", &format!("question number {i}")))
            .collect();

        let prompt = mentor_prompt("latest", &history);
        assert!(!prompt.contains("question number 14"));
        assert!(prompt.contains("question number 15"));
        assert!(prompt.contains("question number 24"));
    }

    #[test]
    fn analysis_schema_requires_all_sections() {
        let schema = article_analysis_schema();
        assert_eq!(schema["required"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn analysis_deserializes_from_schema_shaped_json() {
        let value = serde_json::json!({
            "vocabulary": [{ "word": "hegemony", "definition": "dominance of one group" }],
            "key_points": ["point"],
            "analytical_angles": ["economic"],
            "counter_narratives": ["counter"]
        });

        let analysis: ArticleAnalysis = serde_json::from_value(value).unwrap();
        assert_eq!(analysis.vocabulary[0].word, "hegemony");
    }
}
