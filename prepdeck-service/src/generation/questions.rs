//! Generated question validation and normalization.
//!
//! The generation service is asked for a letter-keyed `correct_answer`,
//! but responses sometimes carry the full option text instead. Both
//! conventions are accepted here and normalized to the letter-keyed form
//! before anything is persisted.

use serde::{Deserialize, Serialize};

/// Canonical correct-answer marker: the option's position label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
}

impl AnswerLetter {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerLetter::A => "A",
            AnswerLetter::B => "B",
            AnswerLetter::C => "C",
            AnswerLetter::D => "D",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "A" | "a" => Some(AnswerLetter::A),
            "B" | "b" => Some(AnswerLetter::B),
            "C" | "c" => Some(AnswerLetter::C),
            "D" | "d" => Some(AnswerLetter::D),
            _ => None,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(AnswerLetter::A),
            1 => Some(AnswerLetter::B),
            2 => Some(AnswerLetter::C),
            3 => Some(AnswerLetter::D),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            AnswerLetter::A => 0,
            AnswerLetter::B => 1,
            AnswerLetter::C => 2,
            AnswerLetter::D => 3,
        }
    }
}

/// One question item as returned by the generation service, unvalidated
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub question_urdu: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub options_urdu: Option<Vec<String>>,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub explanation_urdu: Option<String>,
}

/// A validated question with a letter-keyed correct answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuestion {
    pub question: String,
    pub question_urdu: Option<String>,
    /// 2-4 non-empty option texts
    pub options: Vec<String>,
    pub options_urdu: Vec<Option<String>>,
    pub correct: AnswerLetter,
    pub explanation: Option<String>,
    pub explanation_urdu: Option<String>,
}

impl GeneratedQuestion {
    /// Validate a raw item and normalize its correct-answer marker.
    ///
    /// Accepted only if the question text is non-empty, at least two
    /// non-empty options exist, and the marker resolves to one of them,
    /// either by exact option text or as a literal letter A-D. Anything
    /// else returns `None` and the item is dropped.
    pub fn from_raw(raw: RawQuestion) -> Option<Self> {
        let question = raw.question.trim().to_string();
        if question.is_empty() {
            return None;
        }

        // Keep Urdu options aligned with their English counterparts while
        // dropping empty English options.
        let urdu = raw.options_urdu.unwrap_or_default();
        let mut options = Vec::new();
        let mut options_urdu = Vec::new();
        for (i, option) in raw.options.iter().take(4).enumerate() {
            let trimmed = option.trim();
            if trimmed.is_empty() {
                continue;
            }
            options.push(trimmed.to_string());
            options_urdu.push(urdu.get(i).map(|u| u.trim().to_string()).filter(|u| !u.is_empty()));
        }
        if options.len() < 2 {
            return None;
        }

        let correct = resolve_marker(&raw.correct_answer, &options)?;

        Some(Self {
            question,
            question_urdu: non_empty(raw.question_urdu),
            options,
            options_urdu,
            correct,
            explanation: non_empty(raw.explanation),
            explanation_urdu: non_empty(raw.explanation_urdu),
        })
    }

    /// Option text the correct marker points at
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct.index()]
    }
}

/// Resolve a correct-answer marker against the option list.
///
/// Exact option text takes precedence; a bare letter is only meaningful
/// relative to how many options survived validation.
fn resolve_marker(marker: &str, options: &[String]) -> Option<AnswerLetter> {
    let marker = marker.trim();
    if marker.is_empty() {
        return None;
    }

    if let Some(position) = options.iter().position(|o| o == marker) {
        return AnswerLetter::from_index(position);
    }

    AnswerLetter::from_str(marker).filter(|letter| letter.index() < options.len())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(options: &[&str], correct: &str) -> RawQuestion {
        RawQuestion {
            question: "Which river flows through Punjab?".to_string(),
            question_urdu: None,
            options: options.iter().map(|o| o.to_string()).collect(),
            options_urdu: None,
            correct_answer: correct.to_string(),
            explanation: Some("The Indus basin covers the province.".to_string()),
            explanation_urdu: None,
        }
    }

    #[test]
    fn text_marker_normalizes_to_letter() {
        let question =
            GeneratedQuestion::from_raw(raw(&["Paris", "London", "Rome", "Berlin"], "Paris"))
                .unwrap();
        assert_eq!(question.correct, AnswerLetter::A);
        assert_eq!(question.correct_option(), "Paris");
    }

    #[test]
    fn letter_marker_is_accepted_directly() {
        let question =
            GeneratedQuestion::from_raw(raw(&["Paris", "London", "Rome", "Berlin"], "C")).unwrap();
        assert_eq!(question.correct, AnswerLetter::C);
        assert_eq!(question.correct_option(), "Rome");
    }

    #[test]
    fn text_marker_wins_over_letter_reading() {
        // An option literally named "A" resolves by text, not as a label
        let question = GeneratedQuestion::from_raw(raw(&["C", "B", "A", "D"], "A")).unwrap();
        assert_eq!(question.correct, AnswerLetter::C);
        assert_eq!(question.correct_option(), "A");
    }

    #[test]
    fn unresolvable_marker_is_dropped() {
        assert!(GeneratedQuestion::from_raw(raw(&["Paris", "London"], "Madrid")).is_none());
    }

    #[test]
    fn letter_outside_option_count_is_dropped() {
        assert!(GeneratedQuestion::from_raw(raw(&["Paris", "London"], "D")).is_none());
    }

    #[test]
    fn empty_question_is_dropped() {
        let mut item = raw(&["Paris", "London"], "Paris");
        item.question = "   ".to_string();
        assert!(GeneratedQuestion::from_raw(item).is_none());
    }

    #[test]
    fn fewer_than_two_options_is_dropped() {
        assert!(GeneratedQuestion::from_raw(raw(&["Paris", "  "], "Paris")).is_none());
    }

    #[test]
    fn extra_options_are_truncated_to_four() {
        let question = GeneratedQuestion::from_raw(raw(
            &["Paris", "London", "Rome", "Berlin", "Madrid"],
            "Berlin",
        ))
        .unwrap();
        assert_eq!(question.options.len(), 4);
        assert_eq!(question.correct, AnswerLetter::D);
    }

    #[test]
    fn urdu_variants_stay_aligned_after_dropping_empty_options() {
        let item = RawQuestion {
            question: "Capital of France?".to_string(),
            question_urdu: Some("فرانس کا دارالحکومت؟".to_string()),
            options: vec![
                "".to_string(),
                "Paris".to_string(),
                "London".to_string(),
            ],
            options_urdu: Some(vec![
                "خالی".to_string(),
                "پیرس".to_string(),
                "لندن".to_string(),
            ]),
            correct_answer: "Paris".to_string(),
            explanation: None,
            explanation_urdu: None,
        };

        let question = GeneratedQuestion::from_raw(item).unwrap();
        assert_eq!(question.options, vec!["Paris", "London"]);
        assert_eq!(question.options_urdu[0].as_deref(), Some("پیرس"));
        assert_eq!(question.correct, AnswerLetter::A);
    }
}
