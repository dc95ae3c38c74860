// src/models/answer.rs

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question::QuestionType;

/// A taker's answer to one question, tagged by question type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnswerValue {
    Mcq { option_id: Uuid },
    Msq { option_ids: BTreeSet<Uuid> },
    Nat { value: f64 },
}

impl AnswerValue {
    pub fn kind(&self) -> QuestionType {
        match self {
            AnswerValue::Mcq { .. } => QuestionType::Mcq,
            AnswerValue::Msq { .. } => QuestionType::Msq,
            AnswerValue::Nat { .. } => QuestionType::Nat,
        }
    }
}

/// One autosaved answer, keyed by (attempt, question).
///
/// Re-saving the same question overwrites the record: last write to reach the
/// store wins, with no versioning. A question with no record is skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub attempt_id: Uuid,
    pub question_id: Uuid,
    pub value: AnswerValue,
    pub last_written_at: DateTime<Utc>,
}

/// DTO for the autosave endpoint.
#[derive(Debug, Deserialize)]
pub struct SaveAnswerRequest {
    pub value: AnswerValue,
}
