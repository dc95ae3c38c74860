// src/models/assessment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentKind {
    Quiz,
    Test,
}

/// When a taker may see their scored result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowResultAfter {
    /// Immediately after the attempt is submitted.
    Submit,
    /// Only after the owner releases results out-of-band.
    Manual,
}

/// A published test/quiz definition, owned by its author.
///
/// Definitions reach the engine through the question bank and are treated as
/// immutable once an attempt references them; authoring lives elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Assessment {
    pub id: Uuid,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    pub kind: AssessmentKind,

    /// None = untimed; attempts never expire.
    pub duration_minutes: Option<u32>,

    /// Open window. A missing bound is unbounded on that side.
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,

    /// Threshold for the `passed` flag on results. None = pass/fail not reported.
    pub passing_marks: Option<f64>,

    #[validate(range(min = 1))]
    pub max_attempts: u32,

    /// Penalty for a wrong answered response, as a percentage of the
    /// question's own marks. 0 disables negative marking.
    #[validate(range(min = 0.0, max = 100.0))]
    pub negative_marking_percent: f64,

    pub shuffle_questions: bool,
    pub shuffle_options: bool,

    pub show_result_after: ShowResultAfter,

    pub published: bool,

    #[validate(length(min = 1), nested)]
    pub questions: Vec<Question>,
}

impl Assessment {
    pub fn question(&self, question_id: Uuid) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// Whether new attempts may be started at `now`.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        if !self.published {
            return false;
        }
        if self.start_time.is_some_and(|start| now < start) {
            return false;
        }
        if self.end_time.is_some_and(|end| now > end) {
            return false;
        }
        true
    }

    pub fn max_score(&self) -> f64 {
        self.questions.iter().map(|q| q.marks).sum()
    }
}
