// src/handlers/attempts.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    engine::{AnswerStore, AttemptManager, Scorer},
    error::AppError,
    models::answer::SaveAnswerRequest,
    models::attempt::StartAttemptResponse,
    utils::identity::UserId,
};

/// Starts a new attempt, or resumes the caller's in-progress one.
///
/// * 201 with a fresh attempt id on a new start.
/// * 200 with the existing attempt id on resume (same shuffle orders).
pub async fn start_attempt(
    State(manager): State<Arc<AttemptManager>>,
    Extension(user): Extension<UserId>,
    Path(assessment_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = manager.start_or_resume(assessment_id, user.0).await?;

    let status = if outcome.resumed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(StartAttemptResponse {
            attempt_id: outcome.attempt.id,
            resumed: outcome.resumed,
            expires_at: outcome.attempt.expires_at,
        }),
    ))
}

/// Returns the attempt's paper: questions in the attempt's order with the
/// caller's saved answers, answer keys stripped.
pub async fn get_paper(
    State(manager): State<Arc<AttemptManager>>,
    Extension(user): Extension<UserId>,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let paper = manager.paper(attempt_id, user.0).await?;
    Ok(Json(paper))
}

/// Autosaves one question's answer. Last write to arrive wins.
pub async fn save_answer(
    State(answers): State<Arc<AnswerStore>>,
    Extension(user): Extension<UserId>,
    Path((attempt_id, question_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<SaveAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    answers
        .save_answer(attempt_id, user.0, question_id, req.value)
        .await?;
    Ok(Json(serde_json::json!({ "saved": true })))
}

/// Submits the attempt and returns its scored result. Safe to repeat: a
/// second call returns the same frozen result.
pub async fn submit_attempt(
    State(scorer): State<Arc<Scorer>>,
    Extension(user): Extension<UserId>,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = scorer.submit_attempt(attempt_id, user.0).await?;
    Ok(Json(result))
}

/// Returns the frozen result of a submitted attempt.
pub async fn get_result(
    State(scorer): State<Arc<Scorer>>,
    Extension(user): Extension<UserId>,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = scorer.result(attempt_id, user.0).await?;
    Ok(Json(result))
}
