// src/engine/scorer.rs

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::engine::{owned_attempt, time_guard};
use crate::error::AppError;
use crate::models::answer::AnswerValue;
use crate::models::assessment::{Assessment, ShowResultAfter};
use crate::models::attempt::AttemptStatus;
use crate::models::question::CorrectAnswer;
use crate::models::result::{AttemptResult, QuestionScore};
use crate::store::{Clock, PersistenceStore, QuestionBank};

/// Scores submitted attempts and drives the one terminal transition.
pub struct Scorer {
    store: Arc<dyn PersistenceStore>,
    bank: Arc<dyn QuestionBank>,
    clock: Arc<dyn Clock>,
}

impl Scorer {
    pub fn new(
        store: Arc<dyn PersistenceStore>,
        bank: Arc<dyn QuestionBank>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, bank, clock }
    }

    /// Submits the caller's attempt. Idempotent: a repeat call (or losing a
    /// race against the deadline path) returns the already-frozen result.
    pub async fn submit_attempt(
        &self,
        attempt_id: Uuid,
        user_id: Uuid,
    ) -> Result<AttemptResult, AppError> {
        let attempt = owned_attempt(self.store.as_ref(), attempt_id, user_id).await?;
        // A manual submit that arrives after the deadline is recorded as
        // timed out; the scoring itself is the same either way.
        let timed_out = time_guard::is_expired(&attempt, self.clock.now());
        submit(
            self.store.as_ref(),
            self.bank.as_ref(),
            self.clock.as_ref(),
            attempt_id,
            timed_out,
        )
        .await
    }

    /// The frozen result of the caller's attempt. An expired in-progress
    /// attempt is settled first; an attempt still running returns
    /// `NotSubmitted`. Withheld while the assessment keeps results manual.
    pub async fn result(&self, attempt_id: Uuid, user_id: Uuid) -> Result<AttemptResult, AppError> {
        let attempt = owned_attempt(self.store.as_ref(), attempt_id, user_id).await?;

        let settled = time_guard::settle_if_expired(
            self.store.as_ref(),
            self.bank.as_ref(),
            self.clock.as_ref(),
            &attempt,
        )
        .await?;

        let result = match settled {
            Some(result) => result,
            None => match attempt.status {
                AttemptStatus::Submitted => attempt.result.ok_or_else(|| {
                    AppError::Internal(format!("attempt {attempt_id} submitted without a result"))
                })?,
                AttemptStatus::InProgress => return Err(AppError::NotSubmitted),
            },
        };

        let assessment = self
            .bank
            .assessment(attempt.assessment_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("assessment {} vanished", attempt.assessment_id))
            })?;
        if assessment.show_result_after == ShowResultAfter::Manual {
            return Err(AppError::ResultNotReleased);
        }

        Ok(result)
    }
}

/// The single submission path, shared by manual submits and deadline
/// settlement. Scores first, then compare-and-sets the terminal transition;
/// the CAS loser reads back the winner's frozen result.
pub(crate) async fn submit(
    store: &dyn PersistenceStore,
    bank: &dyn QuestionBank,
    clock: &dyn Clock,
    attempt_id: Uuid,
    timed_out: bool,
) -> Result<AttemptResult, AppError> {
    let attempt = store
        .attempt(attempt_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Attempt {attempt_id} not found")))?;

    // Already terminal: no scoring work, return the cached result.
    if attempt.status == AttemptStatus::Submitted {
        return attempt.result.ok_or_else(|| {
            AppError::Internal(format!("attempt {attempt_id} submitted without a result"))
        });
    }

    let assessment = bank.assessment(attempt.assessment_id).await?.ok_or_else(|| {
        AppError::Internal(format!(
            "assessment {} referenced by attempt {attempt_id} vanished",
            attempt.assessment_id
        ))
    })?;

    let answers: HashMap<Uuid, AnswerValue> = store
        .answers(attempt_id)
        .await?
        .into_iter()
        .map(|r| (r.question_id, r.value))
        .collect();

    // Any scoring anomaly aborts before the transition, leaving the attempt
    // in progress; it must never freeze a partially-wrong score.
    let result = score(&assessment, attempt_id, &answers)?;

    let submitted_at = clock.now();
    let won = store
        .finalize_attempt(attempt_id, submitted_at, timed_out, result.clone())
        .await?;

    if won {
        tracing::info!(
            attempt_id = %attempt_id,
            total_score = result.total_score,
            percentage = result.percentage,
            timed_out,
            "attempt submitted"
        );
        return Ok(result);
    }

    // Lost the race against a concurrent submit; the frozen record wins.
    let settled = store
        .attempt(attempt_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("attempt {attempt_id} vanished mid-submit")))?;
    settled.result.ok_or_else(|| {
        AppError::Internal(format!("attempt {attempt_id} submitted without a result"))
    })
}

/// Pure scoring pass over the assessment's questions and the saved answers.
fn score(
    assessment: &Assessment,
    attempt_id: Uuid,
    answers: &HashMap<Uuid, AnswerValue>,
) -> Result<AttemptResult, AppError> {
    let max_score = assessment.max_score();
    if assessment.questions.is_empty() || max_score <= 0.0 {
        return Err(AppError::Internal(format!(
            "assessment {} is not scorable (max score {max_score})",
            assessment.id
        )));
    }

    let penalty_factor = assessment.negative_marking_percent / 100.0;

    let mut total_score = 0.0;
    let mut correct_count = 0u32;
    let mut wrong_count = 0u32;
    let mut skipped_count = 0u32;
    let mut per_question = Vec::with_capacity(assessment.questions.len());

    for question in &assessment.questions {
        let (marks_awarded, correct) = match answers.get(&question.id) {
            // Skipped questions score zero, never a penalty.
            None => {
                skipped_count += 1;
                (0.0, false)
            }
            Some(value) => {
                let correct = matches(&question.correct, value).ok_or_else(|| {
                    AppError::Internal(format!(
                        "stored answer for question {} does not match its type",
                        question.id
                    ))
                })?;
                if correct {
                    correct_count += 1;
                    (question.marks, true)
                } else {
                    wrong_count += 1;
                    (-question.marks * penalty_factor, false)
                }
            }
        };

        total_score += marks_awarded;
        per_question.push(QuestionScore {
            question_id: question.id,
            marks_awarded,
            correct,
        });
    }

    Ok(AttemptResult {
        attempt_id,
        total_score,
        max_score,
        percentage: 100.0 * total_score / max_score,
        correct_count,
        wrong_count,
        skipped_count,
        passed: assessment.passing_marks.map(|p| total_score >= p),
        per_question,
    })
}

/// Whether an answered value hits the key. `None` when the stored variant
/// does not fit the question, which the save path should have made impossible.
fn matches(correct: &CorrectAnswer, value: &AnswerValue) -> Option<bool> {
    match (correct, value) {
        (CorrectAnswer::Mcq { option_id: want }, AnswerValue::Mcq { option_id: got }) => {
            Some(want == got)
        }
        // Exact set equality, no partial credit.
        (CorrectAnswer::Msq { option_ids: want }, AnswerValue::Msq { option_ids: got }) => {
            Some(want == got)
        }
        (CorrectAnswer::Nat { value: want, tolerance }, AnswerValue::Nat { value: got }) => {
            Some((got - want).abs() <= *tolerance)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assessment::AssessmentKind;
    use crate::models::question::{Question, QuestionOption};
    use std::collections::BTreeSet;

    fn options(ids: &[Uuid]) -> Vec<QuestionOption> {
        ids.iter()
            .map(|id| QuestionOption {
                id: *id,
                text: "option".to_string(),
            })
            .collect()
    }

    fn mcq(marks: f64, option_ids: &[Uuid], correct: Uuid) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: "pick one".to_string(),
            marks,
            options: options(option_ids),
            correct: CorrectAnswer::Mcq { option_id: correct },
            explanation: None,
        }
    }

    fn assessment(questions: Vec<Question>, negative_marking_percent: f64) -> Assessment {
        Assessment {
            id: Uuid::new_v4(),
            title: "Scoring test".to_string(),
            kind: AssessmentKind::Quiz,
            duration_minutes: None,
            start_time: None,
            end_time: None,
            passing_marks: None,
            max_attempts: 1,
            negative_marking_percent,
            shuffle_questions: false,
            shuffle_options: false,
            show_result_after: ShowResultAfter::Submit,
            published: true,
            questions,
        }
    }

    #[test]
    fn one_right_one_wrong_with_half_penalty() {
        let (a1, b1) = (Uuid::new_v4(), Uuid::new_v4());
        let (a2, b2) = (Uuid::new_v4(), Uuid::new_v4());
        let q1 = mcq(1.0, &[a1, b1], a1);
        let q2 = mcq(1.0, &[a2, b2], a2);
        let (q1_id, q2_id) = (q1.id, q2.id);
        let assessment = assessment(vec![q1, q2], 50.0);

        let mut answers = HashMap::new();
        answers.insert(q1_id, AnswerValue::Mcq { option_id: a1 });
        answers.insert(q2_id, AnswerValue::Mcq { option_id: b2 });

        let result = score(&assessment, Uuid::new_v4(), &answers).unwrap();
        assert_eq!(result.total_score, 0.5);
        assert_eq!(result.max_score, 2.0);
        assert_eq!(result.percentage, 25.0);
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.wrong_count, 1);
        assert_eq!(result.skipped_count, 0);
    }

    #[test]
    fn skipped_questions_never_penalized() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let assessment = assessment(vec![mcq(4.0, &[a, b], a)], 100.0);

        let result = score(&assessment, Uuid::new_v4(), &HashMap::new()).unwrap();
        assert_eq!(result.total_score, 0.0);
        assert_eq!(result.skipped_count, 1);
        assert_eq!(result.per_question[0].marks_awarded, 0.0);
    }

    #[test]
    fn total_can_go_negative() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let q = mcq(2.0, &[a, b], a);
        let q_id = q.id;
        let assessment = assessment(vec![q], 50.0);

        let mut answers = HashMap::new();
        answers.insert(q_id, AnswerValue::Mcq { option_id: b });

        let result = score(&assessment, Uuid::new_v4(), &answers).unwrap();
        assert_eq!(result.total_score, -1.0);
        assert_eq!(result.percentage, -50.0);
    }

    #[test]
    fn nat_tolerance_band_is_inclusive() {
        let correct = CorrectAnswer::Nat {
            value: 10.0,
            tolerance: 0.5,
        };
        assert_eq!(
            matches(&correct, &AnswerValue::Nat { value: 10.4 }),
            Some(true)
        );
        assert_eq!(
            matches(&correct, &AnswerValue::Nat { value: 10.5 }),
            Some(true)
        );
        assert_eq!(
            matches(&correct, &AnswerValue::Nat { value: 10.51 }),
            Some(false)
        );
        assert_eq!(
            matches(&correct, &AnswerValue::Nat { value: 9.5 }),
            Some(true)
        );
    }

    #[test]
    fn msq_requires_exact_set() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let correct = CorrectAnswer::Msq {
            option_ids: BTreeSet::from([a, c]),
        };

        let subset = AnswerValue::Msq {
            option_ids: BTreeSet::from([a]),
        };
        let superset = AnswerValue::Msq {
            option_ids: BTreeSet::from([a, b, c]),
        };
        let exact = AnswerValue::Msq {
            option_ids: BTreeSet::from([a, c]),
        };

        assert_eq!(matches(&correct, &subset), Some(false));
        assert_eq!(matches(&correct, &superset), Some(false));
        assert_eq!(matches(&correct, &exact), Some(true));
    }

    #[test]
    fn mismatched_variant_is_an_anomaly() {
        let correct = CorrectAnswer::Nat {
            value: 1.0,
            tolerance: 0.0,
        };
        let value = AnswerValue::Mcq {
            option_id: Uuid::new_v4(),
        };
        assert_eq!(matches(&correct, &value), None);
    }

    #[test]
    fn passed_flag_follows_passing_marks() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let q = mcq(5.0, &[a, b], a);
        let q_id = q.id;
        let mut assessment = assessment(vec![q], 0.0);
        assessment.passing_marks = Some(3.0);

        let mut answers = HashMap::new();
        answers.insert(q_id, AnswerValue::Mcq { option_id: a });
        let result = score(&assessment, Uuid::new_v4(), &answers).unwrap();
        assert_eq!(result.passed, Some(true));

        let result = score(&assessment, Uuid::new_v4(), &HashMap::new()).unwrap();
        assert_eq!(result.passed, Some(false));
    }

    #[test]
    fn unscorable_assessment_is_internal_error() {
        let assessment = assessment(vec![], 0.0);
        let err = score(&assessment, Uuid::new_v4(), &HashMap::new()).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
