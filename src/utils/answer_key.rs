// src/utils/answer_key.rs

//! Answer-key normalization and grading.
//!
//! Backend generators disagree on how they mark the right option, so every
//! marker is reduced to a zero-based index once, at ingestion. Range checks
//! happen separately against the question's option count: a letter past the
//! end of the list parses fine and is only rejected by [`resolve`].

use std::fmt;

use crate::models::question::{QuestionResult, QuizQuestion, QuizScore, RightOption};

/// Selection value for a question the user skipped.
pub const UNANSWERED: i64 = -1;

pub const NOT_ANSWERED_LABEL: &str = "Not answered";

/// Why a correctness marker does not point at an option.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidAnswerKey {
    /// Neither a single letter nor a base-10 integer.
    Unparseable(String),
    /// A number with a fractional part (or not finite).
    NotAnInteger(f64),
    /// Parsed, but outside `0..option_count`.
    OutOfRange { index: i64, option_count: usize },
}

impl fmt::Display for InvalidAnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidAnswerKey::Unparseable(raw) => write!(f, "Invalid index ({:?})", raw),
            InvalidAnswerKey::NotAnInteger(value) => write!(f, "Invalid index ({})", value),
            InvalidAnswerKey::OutOfRange { index, .. } => write!(f, "Invalid index ({})", index),
        }
    }
}

impl std::error::Error for InvalidAnswerKey {}

/// Reduces a correctness marker to a canonical index without range checking.
///
/// * numbers are taken as-is;
/// * a single ASCII letter maps to its alphabet position (`'a'` -> 0);
/// * anything else goes through base-10 integer parsing.
pub fn normalize(right_option: &RightOption) -> Result<i64, InvalidAnswerKey> {
    match right_option {
        RightOption::Index(index) => Ok(*index),
        RightOption::Float(value) => {
            if value.is_finite() && value.fract() == 0.0 {
                Ok(*value as i64)
            } else {
                Err(InvalidAnswerKey::NotAnInteger(*value))
            }
        }
        RightOption::Text(raw) => {
            let value = raw.trim().to_lowercase();
            let mut chars = value.chars();
            if let (Some(letter), None) = (chars.next(), chars.next()) {
                if letter.is_ascii_lowercase() {
                    return Ok(letter as i64 - 'a' as i64);
                }
            }
            parse_int(&value).ok_or_else(|| InvalidAnswerKey::Unparseable(raw.clone()))
        }
    }
}

/// Normalizes and range-checks a correctness marker against `option_count` options.
pub fn resolve(right_option: &RightOption, option_count: usize) -> Result<usize, InvalidAnswerKey> {
    let index = normalize(right_option)?;
    match usize::try_from(index) {
        Ok(position) if position < option_count => Ok(position),
        _ => Err(InvalidAnswerKey::OutOfRange {
            index,
            option_count,
        }),
    }
}

/// Leading-integer parse: optional sign, then digits up to the first non-digit.
/// Returns `None` when no digit follows the sign. Overflow saturates, which
/// still lands out of range.
fn parse_int(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let mut parsed: i64 = 0;
    let mut seen_digit = false;
    for byte in digits.bytes() {
        if !byte.is_ascii_digit() {
            break;
        }
        seen_digit = true;
        let digit = i64::from(byte - b'0');
        parsed = parsed.saturating_mul(10).saturating_add(digit);
    }

    if !seen_digit {
        return None;
    }
    Some(if negative { -parsed } else { parsed })
}

impl QuizQuestion {
    /// Canonical index of the right option, range-checked against this question's options.
    pub fn answer_key(&self) -> Result<usize, InvalidAnswerKey> {
        resolve(&self.right_option, self.options.len())
    }

    /// Text of the right option, or an "Invalid index" label.
    pub fn correct_answer_label(&self) -> String {
        match self.answer_key() {
            Ok(index) => self.options[index].clone(),
            Err(e) => e.to_string(),
        }
    }

    /// Text of the selected option. `-1` renders as "Not answered".
    pub fn selection_label(&self, selected: i64) -> String {
        if selected == UNANSWERED {
            return NOT_ANSWERED_LABEL.to_string();
        }
        usize::try_from(selected)
            .ok()
            .and_then(|index| self.options.get(index))
            .cloned()
            .unwrap_or_else(|| {
                InvalidAnswerKey::OutOfRange {
                    index: selected,
                    option_count: self.options.len(),
                }
                .to_string()
            })
    }

    /// Whether `selected` picks the right option.
    ///
    /// A selection must point at an actual option, so `-1` (and any stray
    /// negative or past-the-end value) is never correct, whatever the key holds.
    pub fn is_correct(&self, selected: i64) -> bool {
        let Ok(position) = usize::try_from(selected) else {
            return false;
        };
        if position >= self.options.len() {
            return false;
        }
        normalize(&self.right_option).is_ok_and(|index| index == selected)
    }

    pub fn grade(&self, selected: i64) -> QuestionResult {
        QuestionResult {
            correct_index: self.answer_key().ok(),
            correct_answer: self.correct_answer_label(),
            selected_index: selected,
            selected_answer: self.selection_label(selected),
            is_correct: self.is_correct(selected),
        }
    }
}

/// Grades an attempt. Missing trailing selections count as unanswered.
pub fn score_quiz(questions: &[QuizQuestion], selections: &[i64]) -> QuizScore {
    let results: Vec<QuestionResult> = questions
        .iter()
        .enumerate()
        .map(|(i, question)| question.grade(selections.get(i).copied().unwrap_or(UNANSWERED)))
        .collect();

    let correct = results.iter().filter(|r| r.is_correct).count();
    let total = questions.len();
    let percentage = if total == 0 {
        0
    } else {
        ((correct as f64 / total as f64) * 100.0).round() as u32
    };

    QuizScore {
        correct,
        total,
        percentage,
        results,
    }
}
