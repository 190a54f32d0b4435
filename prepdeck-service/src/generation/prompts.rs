//! Prompt and response-schema builders for quiz generation.

use crate::chunker::TextChunk;
use crate::config::GenerationConfig;

/// System instruction for the quiz generation requests
pub const QUIZ_SYSTEM_INSTRUCTION: &str = "You are a forensic educational examiner \
    creating CSS/PMS exam preparation material. Create comprehensive MCQ assessments.";

pub const QUIZ_SYSTEM_INSTRUCTION_URDU_SUFFIX: &str =
    " You are also an expert translator to Urdu.";

/// Context shared by every chunk request of one job
pub struct QuizContext<'a> {
    pub topic_name: &'a str,
    pub include_urdu: bool,
    pub total_chunks: usize,
}

pub fn quiz_system_instruction(include_urdu: bool) -> String {
    if include_urdu {
        format!("{QUIZ_SYSTEM_INSTRUCTION}{QUIZ_SYSTEM_INSTRUCTION_URDU_SUFFIX}")
    } else {
        QUIZ_SYSTEM_INSTRUCTION.to_string()
    }
}

/// Build the per-chunk user prompt
pub fn quiz_prompt(chunk: &TextChunk, ctx: &QuizContext<'_>, config: &GenerationConfig) -> String {
    let urdu_requirement = if ctx.include_urdu {
        "REQUIREMENT: provide Urdu translations for every item, including question, options, and explanation.\n"
    } else {
        ""
    };

    format!(
        r#"Task: create an EXHAUSTIVE MCQ quiz based ONLY on the provided text segment (part {part} of {total}).

Rules:
1. EXHAUSTIVE COVERAGE: extract every distinct fact, definition, date, and concept from this segment into a question.
2. SEQUENCE: follow the chronological order of the segment.
3. QUANTITY: generate between {min_q} and {max_q} questions. If the text is dense, aim for {max_q}; if sparse, aim for {min_q}.
4. DEPTH: include "why" and "how" questions, not just "what".
5. OPTIONS: provide exactly 4 options for each question.
6. CORRECT_ANSWER: the correct_answer field must be one of the literal letters A, B, C, or D.
7. EXPLANATIONS: provide a factual explanation for why the answer is correct.
{urdu_requirement}
Topic context: "{topic}"

INPUT TEXT SEGMENT:
{text}"#,
        part = chunk.index + 1,
        total = ctx.total_chunks,
        min_q = config.min_questions_per_chunk,
        max_q = config.max_questions_per_chunk,
        urdu_requirement = urdu_requirement,
        topic = ctx.topic_name,
        text = chunk.text,
    )
}

/// Response schema naming the required fields of each question item
pub fn quiz_response_schema(include_urdu: bool) -> serde_json::Value {
    let mut required = vec!["question", "options", "correct_answer", "explanation"];
    if include_urdu {
        required.extend(["question_urdu", "options_urdu", "explanation_urdu"]);
    }

    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "questions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": { "type": "STRING" },
                        "question_urdu": { "type": "STRING" },
                        "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "options_urdu": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "correct_answer": { "type": "STRING" },
                        "explanation": {
                            "type": "STRING",
                            "description": "Concise factual explanation (max 2 sentences)."
                        },
                        "explanation_urdu": { "type": "STRING" }
                    },
                    "required": required
                }
            }
        },
        "required": ["questions"]
    })
}
