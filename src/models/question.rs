// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// The backend's correctness marker for a question.
///
/// Depending on which generator produced the quiz it is a zero-based number,
/// a numeric string (`"2"`) or a single letter (`"b"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RightOption {
    Index(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for RightOption {
    fn from(index: i64) -> Self {
        RightOption::Index(index)
    }
}

impl From<&str> for RightOption {
    fn from(text: &str) -> Self {
        RightOption::Text(text.to_string())
    }
}

/// A multiple-choice question as served by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuizQuestion {
    #[serde(default)]
    pub question: String,
    /// Ordered selectable answers.
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    pub right_option: RightOption,
    #[serde(default)]
    pub explanation: Option<String>,
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.is_empty() {
        return Err(validator::ValidationError::new("options_cannot_be_empty"));
    }
    Ok(())
}

/// DTO for grading an attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct ScoreQuizRequest {
    #[validate(length(min = 1, max = 200), nested)]
    pub questions: Vec<QuizQuestion>,

    /// Selected option per question, in question order. `-1` means unanswered.
    #[serde(default)]
    pub selections: Vec<i64>,
}

/// Grading outcome for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionResult {
    /// Canonical index of the correct option, `None` when the answer key is invalid.
    pub correct_index: Option<usize>,
    pub correct_answer: String,
    pub selected_index: i64,
    pub selected_answer: String,
    pub is_correct: bool,
}

/// Grading outcome for a whole attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
    pub results: Vec<QuestionResult>,
}
