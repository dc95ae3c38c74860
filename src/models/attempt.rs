// src/models/attempt.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question::PaperQuestion;
use crate::models::result::AttemptResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    /// Terminal. No field of a submitted attempt changes afterwards.
    Submitted,
}

/// One taker's stateful pass at an assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub user_id: Uuid,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    /// None = untimed.
    pub expires_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    /// Whether submission was forced by the deadline rather than the taker.
    pub timed_out: bool,
    /// Question ids in the order served to this taker. Generated once at
    /// creation and stable across resumes.
    pub question_order: Vec<Uuid>,
    /// Per-question option order, same lifetime as `question_order`.
    pub option_order: HashMap<Uuid, Vec<Uuid>>,
    /// Frozen by the scorer exactly once, at submission.
    pub result: Option<AttemptResult>,
}

/// Response DTO for starting or resuming an attempt.
#[derive(Debug, Serialize)]
pub struct StartAttemptResponse {
    pub attempt_id: Uuid,
    pub resumed: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// DTO for the taker-facing attempt view: questions in attempt order with
/// saved answers, answer keys stripped.
#[derive(Debug, Serialize)]
pub struct AttemptPaper {
    pub attempt_id: Uuid,
    pub assessment_id: Uuid,
    pub title: String,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub questions: Vec<PaperQuestion>,
}
