// src/engine/answer_store.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::engine::{owned_attempt, time_guard};
use crate::error::AppError;
use crate::models::answer::{AnswerRecord, AnswerValue};
use crate::models::attempt::AttemptStatus;
use crate::models::question::Question;
use crate::store::{Clock, PersistenceStore, QuestionBank};

/// Durable per-question answer upsert. Saves are idempotent and commutative
/// across questions; for the same question the last write to reach the store
/// wins, with no sequencing guard against reordered deliveries.
pub struct AnswerStore {
    store: Arc<dyn PersistenceStore>,
    bank: Arc<dyn QuestionBank>,
    clock: Arc<dyn Clock>,
}

impl AnswerStore {
    pub fn new(
        store: Arc<dyn PersistenceStore>,
        bank: Arc<dyn QuestionBank>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, bank, clock }
    }

    pub async fn save_answer(
        &self,
        attempt_id: Uuid,
        user_id: Uuid,
        question_id: Uuid,
        value: AnswerValue,
    ) -> Result<(), AppError> {
        let attempt = owned_attempt(self.store.as_ref(), attempt_id, user_id).await?;

        if attempt.status == AttemptStatus::Submitted {
            return Err(AppError::AttemptClosed);
        }

        // Too late: settle the attempt and tell the caller so. Saving does
        // not extend the deadline.
        let settled = time_guard::settle_if_expired(
            self.store.as_ref(),
            self.bank.as_ref(),
            self.clock.as_ref(),
            &attempt,
        )
        .await?;
        if settled.is_some() {
            return Err(AppError::AttemptExpired);
        }

        let assessment = self
            .bank
            .assessment(attempt.assessment_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("assessment {} vanished", attempt.assessment_id))
            })?;
        let question = assessment.question(question_id).ok_or_else(|| {
            AppError::NotFound(format!("Question {question_id} not found in assessment"))
        })?;

        validate_value(question, &value)?;

        self.store
            .upsert_answer(AnswerRecord {
                attempt_id,
                question_id,
                value,
                last_written_at: self.clock.now(),
            })
            .await?;

        tracing::debug!(
            attempt_id = %attempt_id,
            question_id = %question_id,
            "answer saved"
        );
        Ok(())
    }
}

/// Checks the value fits the question: matching variant, selections drawn
/// from the question's own options, finite numerics.
fn validate_value(question: &Question, value: &AnswerValue) -> Result<(), AppError> {
    if value.kind() != question.kind() {
        return Err(AppError::Validation(format!(
            "Question {} expects a {:?} answer, got {:?}",
            question.id,
            question.kind(),
            value.kind()
        )));
    }

    match value {
        AnswerValue::Mcq { option_id } => {
            if !question.has_option(*option_id) {
                return Err(AppError::Validation(format!(
                    "Option {option_id} does not belong to question {}",
                    question.id
                )));
            }
        }
        AnswerValue::Msq { option_ids } => {
            if option_ids.is_empty() {
                return Err(AppError::Validation(
                    "Selection cannot be empty; skip the question instead".to_string(),
                ));
            }
            if let Some(stray) = option_ids.iter().find(|id| !question.has_option(**id)) {
                return Err(AppError::Validation(format!(
                    "Option {stray} does not belong to question {}",
                    question.id
                )));
            }
        }
        AnswerValue::Nat { value } => {
            if !value.is_finite() {
                return Err(AppError::Validation(
                    "Numeric answer must be finite".to_string(),
                ));
            }
        }
    }

    Ok(())
}
