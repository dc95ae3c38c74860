// src/handlers/leaderboard.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    engine::LeaderboardAggregator, error::AppError, models::result::LeaderboardQuery,
};

/// Retrieves the assessment's ranked leaderboard: each user's best submitted
/// attempt, ordered by percentage, optionally truncated with `?limit=N`.
pub async fn get_leaderboard(
    State(aggregator): State<Arc<LeaderboardAggregator>>,
    Path(assessment_id): Path<Uuid>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let entries = aggregator.leaderboard(assessment_id, query.limit).await?;
    Ok(Json(entries))
}
