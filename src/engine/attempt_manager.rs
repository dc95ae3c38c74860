// src/engine/attempt_manager.rs

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use uuid::Uuid;

use crate::engine::{owned_attempt, time_guard};
use crate::error::AppError;
use crate::models::answer::AnswerValue;
use crate::models::assessment::Assessment;
use crate::models::attempt::{Attempt, AttemptPaper, AttemptStatus};
use crate::models::question::PaperQuestion;
use crate::store::{Clock, PersistenceStore, QuestionBank};

/// Creates and resumes attempts, enforcing the attempt-count and open-window
/// rules and deriving the per-attempt shuffle orders.
pub struct AttemptManager {
    store: Arc<dyn PersistenceStore>,
    bank: Arc<dyn QuestionBank>,
    clock: Arc<dyn Clock>,
}

/// Outcome of `start_or_resume`.
#[derive(Debug)]
pub struct StartOutcome {
    pub attempt: Attempt,
    pub resumed: bool,
}

impl AttemptManager {
    pub fn new(
        store: Arc<dyn PersistenceStore>,
        bank: Arc<dyn QuestionBank>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, bank, clock }
    }

    /// Returns the user's live attempt when one exists; otherwise starts a
    /// fresh one. A leftover attempt whose deadline has passed is settled
    /// first and counts toward the attempt limit like any other submission.
    pub async fn start_or_resume(
        &self,
        assessment_id: Uuid,
        user_id: Uuid,
    ) -> Result<StartOutcome, AppError> {
        let assessment = self
            .bank
            .assessment(assessment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assessment {assessment_id} not found")))?;

        if let Some(existing) = self
            .store
            .in_progress_attempt(assessment_id, user_id)
            .await?
        {
            let settled = time_guard::settle_if_expired(
                self.store.as_ref(),
                self.bank.as_ref(),
                self.clock.as_ref(),
                &existing,
            )
            .await?;
            if settled.is_none() {
                return Ok(StartOutcome {
                    attempt: existing,
                    resumed: true,
                });
            }
            // Fell due; continue below as a fresh start.
        }

        let now = self.clock.now();
        if !assessment.is_open_at(now) {
            return Err(AppError::AssessmentNotOpen(format!(
                "Assessment {assessment_id} is not open"
            )));
        }

        let used = self.store.submitted_count(assessment_id, user_id).await?;
        if used >= assessment.max_attempts {
            return Err(AppError::MaxAttemptsReached);
        }

        let attempt_id = Uuid::new_v4();
        let (question_order, option_order) = shuffle_orders(&assessment, attempt_id);
        let attempt = Attempt {
            id: attempt_id,
            assessment_id,
            user_id,
            status: AttemptStatus::InProgress,
            started_at: now,
            expires_at: assessment
                .duration_minutes
                .map(|minutes| now + Duration::minutes(i64::from(minutes))),
            submitted_at: None,
            timed_out: false,
            question_order,
            option_order,
            result: None,
        };

        self.store.insert_attempt(attempt.clone()).await?;
        tracing::info!(
            attempt_id = %attempt.id,
            assessment_id = %assessment_id,
            user_id = %user_id,
            attempt_number = used + 1,
            "attempt started"
        );

        Ok(StartOutcome {
            attempt,
            resumed: false,
        })
    }

    /// The taker-facing view of an attempt: questions in the attempt's order,
    /// options in the attempt's per-question order, answer keys stripped,
    /// saved answers attached. Settles the attempt first if its deadline has
    /// passed, so the returned status is accurate.
    pub async fn paper(&self, attempt_id: Uuid, user_id: Uuid) -> Result<AttemptPaper, AppError> {
        let mut attempt = owned_attempt(self.store.as_ref(), attempt_id, user_id).await?;

        let settled = time_guard::settle_if_expired(
            self.store.as_ref(),
            self.bank.as_ref(),
            self.clock.as_ref(),
            &attempt,
        )
        .await?;
        if settled.is_some() {
            attempt = owned_attempt(self.store.as_ref(), attempt_id, user_id).await?;
        }

        let assessment = self
            .bank
            .assessment(attempt.assessment_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("assessment {} vanished", attempt.assessment_id))
            })?;

        let saved: HashMap<Uuid, AnswerValue> = self
            .store
            .answers(attempt_id)
            .await?
            .into_iter()
            .map(|r| (r.question_id, r.value))
            .collect();

        let mut questions = Vec::with_capacity(attempt.question_order.len());
        for question_id in &attempt.question_order {
            let question = assessment.question(*question_id).ok_or_else(|| {
                AppError::Internal(format!(
                    "question {question_id} in attempt order but not in assessment"
                ))
            })?;

            // Serve options in the order frozen on the attempt.
            let order = attempt
                .option_order
                .get(question_id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let options = order
                .iter()
                .filter_map(|oid| question.options.iter().find(|o| o.id == *oid))
                .cloned()
                .collect();

            questions.push(PaperQuestion {
                id: question.id,
                kind: question.kind(),
                text: question.text.clone(),
                marks: question.marks,
                options,
                saved_answer: saved.get(question_id).cloned(),
            });
        }

        Ok(AttemptPaper {
            attempt_id: attempt.id,
            assessment_id: attempt.assessment_id,
            title: assessment.title.clone(),
            status: attempt.status,
            started_at: attempt.started_at,
            expires_at: attempt.expires_at,
            questions,
        })
    }
}

/// Derives the per-attempt question and option orders. Seeded by the attempt
/// id, so regenerating for the same attempt reproduces the same permutation;
/// the persisted order on the attempt record stays authoritative.
fn shuffle_orders(
    assessment: &Assessment,
    attempt_id: Uuid,
) -> (Vec<Uuid>, HashMap<Uuid, Vec<Uuid>>) {
    let mut rng = StdRng::seed_from_u64(shuffle_seed(attempt_id));

    let mut question_order: Vec<Uuid> = assessment.questions.iter().map(|q| q.id).collect();
    if assessment.shuffle_questions {
        question_order.shuffle(&mut rng);
    }

    let mut option_order = HashMap::with_capacity(assessment.questions.len());
    for question in &assessment.questions {
        let mut ids: Vec<Uuid> = question.options.iter().map(|o| o.id).collect();
        if assessment.shuffle_options {
            ids.shuffle(&mut rng);
        }
        option_order.insert(question.id, ids);
    }

    (question_order, option_order)
}

fn shuffle_seed(attempt_id: Uuid) -> u64 {
    let bits = attempt_id.as_u128();
    (bits >> 64) as u64 ^ bits as u64
}
