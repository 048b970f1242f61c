// src/handlers/quiz.rs

use axum::{Json, response::IntoResponse};
use validator::Validate;

use crate::{error::AppError, models::question::ScoreQuizRequest, utils::answer_key::score_quiz};

/// Grades a quiz attempt.
///
/// * Normalizes every question's answer key (letter, number or numeric string).
/// * Compares it with the selected option (`-1` = not answered).
/// * Returns per-question labels, including "Invalid index" for broken keys.
pub async fn score_attempt(
    Json(req): Json<ScoreQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = req.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let score = score_quiz(&req.questions, &req.selections);
    tracing::debug!(
        "Scored attempt: {}/{} correct",
        score.correct,
        score.total
    );

    Ok(Json(score))
}
