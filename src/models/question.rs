// src/models/question.rs

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::answer::AnswerValue;

/// Question type, derived from the shape of the correct answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Single-correct multiple choice.
    Mcq,
    /// Multi-correct multiple choice, graded on exact set equality.
    Msq,
    /// Numeric answer with a symmetric tolerance band.
    Nat,
}

/// One selectable option of an MCQ/MSQ question.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuestionOption {
    pub id: Uuid,
    #[validate(length(min = 1, max = 500))]
    pub text: String,
}

/// The answer key, tagged by question type.
///
/// Keeping the key as a variant (instead of a stringly-typed column) means a
/// question can never declare one type and carry a key of another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CorrectAnswer {
    Mcq { option_id: Uuid },
    Msq { option_ids: BTreeSet<Uuid> },
    Nat { value: f64, tolerance: f64 },
}

/// A single question of an assessment.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = validate_question))]
pub struct Question {
    pub id: Uuid,

    #[validate(length(min = 1, max = 2000))]
    pub text: String,

    /// Marks awarded for a correct answer. Must be positive.
    pub marks: f64,

    /// Options, in authoring order. Empty for NAT questions.
    #[validate(nested)]
    pub options: Vec<QuestionOption>,

    pub correct: CorrectAnswer,

    pub explanation: Option<String>,
}

impl Question {
    /// The question's type, read off the answer key variant.
    pub fn kind(&self) -> QuestionType {
        match self.correct {
            CorrectAnswer::Mcq { .. } => QuestionType::Mcq,
            CorrectAnswer::Msq { .. } => QuestionType::Msq,
            CorrectAnswer::Nat { .. } => QuestionType::Nat,
        }
    }

    pub fn has_option(&self, option_id: Uuid) -> bool {
        self.options.iter().any(|o| o.id == option_id)
    }
}

/// Cross-field checks the derive attributes cannot express: positive marks,
/// choice questions with at least two options and a key drawn from them, NAT
/// questions with a finite key, a non-negative tolerance and no options.
fn validate_question(question: &Question) -> Result<(), ValidationError> {
    if !question.marks.is_finite() || question.marks <= 0.0 {
        return Err(ValidationError::new("marks_not_positive"));
    }
    match &question.correct {
        CorrectAnswer::Mcq { option_id } => {
            if question.options.len() < 2 {
                return Err(ValidationError::new("mcq_needs_two_options"));
            }
            if !question.has_option(*option_id) {
                return Err(ValidationError::new("mcq_key_not_an_option"));
            }
        }
        CorrectAnswer::Msq { option_ids } => {
            if question.options.len() < 2 {
                return Err(ValidationError::new("msq_needs_two_options"));
            }
            if option_ids.is_empty() {
                return Err(ValidationError::new("msq_key_empty"));
            }
            if !option_ids.iter().all(|id| question.has_option(*id)) {
                return Err(ValidationError::new("msq_key_not_an_option"));
            }
        }
        CorrectAnswer::Nat { value, tolerance } => {
            if !question.options.is_empty() {
                return Err(ValidationError::new("nat_has_options"));
            }
            if !value.is_finite() || !tolerance.is_finite() || *tolerance < 0.0 {
                return Err(ValidationError::new("nat_key_invalid"));
            }
        }
    }
    Ok(())
}

/// DTO for serving a question to a test taker (excludes the answer key and
/// explanation). Options are listed in the attempt's per-question order.
#[derive(Debug, Serialize)]
pub struct PaperQuestion {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub text: String,
    pub marks: f64,
    pub options: Vec<QuestionOption>,
    /// The taker's autosaved answer, if any, so a resumed client can restore it.
    pub saved_answer: Option<AnswerValue>,
}
