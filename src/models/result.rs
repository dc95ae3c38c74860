// src/models/result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-question outcome inside an `AttemptResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionScore {
    pub question_id: Uuid,
    /// Negative when negative marking applied; 0 for skipped questions.
    pub marks_awarded: f64,
    pub correct: bool,
}

/// The scored outcome of a submitted attempt. Computed exactly once and
/// frozen on the attempt; later reads return the cached value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub attempt_id: Uuid,
    /// Sum of marks awarded. Not clamped, so it can be negative.
    pub total_score: f64,
    pub max_score: f64,
    /// `100 * total_score / max_score`, may be negative.
    pub percentage: f64,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub skipped_count: u32,
    /// Against the assessment's passing marks; None when no threshold is set.
    pub passed: Option<bool>,
    pub per_question: Vec<QuestionScore>,
}

/// One ranked row of an assessment's leaderboard: a user's best attempt.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: Uuid,
    pub attempt_id: Uuid,
    pub percentage: f64,
    pub total_score: f64,
    pub submitted_at: DateTime<Utc>,
}

/// Query DTO for the leaderboard endpoint.
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// Top-N truncation; full ranking when absent.
    pub limit: Option<usize>,
}
