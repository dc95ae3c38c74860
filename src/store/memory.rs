// src/store/memory.rs

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::answer::AnswerRecord;
use crate::models::assessment::Assessment;
use crate::models::attempt::{Attempt, AttemptStatus};
use crate::models::result::AttemptResult;
use crate::store::{PersistenceStore, QuestionBank, StoreError};

/// In-process reference store. One mutex over both tables, never held across
/// an await, which makes `finalize_attempt` a true compare-and-set.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    attempts: HashMap<Uuid, Attempt>,
    /// Keyed by (attempt, question); overwritten on every save.
    answers: HashMap<(Uuid, Uuid), AnswerRecord>,
}

#[async_trait]
impl PersistenceStore for InMemoryStore {
    async fn insert_attempt(&self, attempt: Attempt) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        tables.attempts.insert(attempt.id, attempt);
        Ok(())
    }

    async fn attempt(&self, attempt_id: Uuid) -> Result<Option<Attempt>, StoreError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables.attempts.get(&attempt_id).cloned())
    }

    async fn in_progress_attempt(
        &self,
        assessment_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Attempt>, StoreError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables
            .attempts
            .values()
            .find(|a| {
                a.assessment_id == assessment_id
                    && a.user_id == user_id
                    && a.status == AttemptStatus::InProgress
            })
            .cloned())
    }

    async fn submitted_count(
        &self,
        assessment_id: Uuid,
        user_id: Uuid,
    ) -> Result<u32, StoreError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables
            .attempts
            .values()
            .filter(|a| {
                a.assessment_id == assessment_id
                    && a.user_id == user_id
                    && a.status == AttemptStatus::Submitted
            })
            .count() as u32)
    }

    async fn upsert_answer(&self, record: AnswerRecord) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        tables
            .answers
            .insert((record.attempt_id, record.question_id), record);
        Ok(())
    }

    async fn answers(&self, attempt_id: Uuid) -> Result<Vec<AnswerRecord>, StoreError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables
            .answers
            .values()
            .filter(|r| r.attempt_id == attempt_id)
            .cloned()
            .collect())
    }

    async fn finalize_attempt(
        &self,
        attempt_id: Uuid,
        submitted_at: DateTime<Utc>,
        timed_out: bool,
        result: AttemptResult,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        let attempt = tables
            .attempts
            .get_mut(&attempt_id)
            .ok_or_else(|| StoreError(format!("attempt {attempt_id} missing at finalize")))?;

        if attempt.status != AttemptStatus::InProgress {
            return Ok(false);
        }

        attempt.status = AttemptStatus::Submitted;
        attempt.submitted_at = Some(submitted_at);
        attempt.timed_out = timed_out;
        attempt.result = Some(result);
        Ok(true)
    }

    async fn submitted_attempts(&self, assessment_id: Uuid) -> Result<Vec<Attempt>, StoreError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables
            .attempts
            .values()
            .filter(|a| a.assessment_id == assessment_id && a.status == AttemptStatus::Submitted)
            .cloned()
            .collect())
    }
}

/// In-process question bank, seeded at startup (fixtures) or by tests.
#[derive(Default)]
pub struct InMemoryQuestionBank {
    assessments: Mutex<HashMap<Uuid, Assessment>>,
}

impl InMemoryQuestionBank {
    pub fn insert(&self, assessment: Assessment) {
        let mut assessments = self.assessments.lock().expect("bank mutex poisoned");
        assessments.insert(assessment.id, assessment);
    }
}

#[async_trait]
impl QuestionBank for InMemoryQuestionBank {
    async fn assessment(&self, assessment_id: Uuid) -> Result<Option<Assessment>, StoreError> {
        let assessments = self.assessments.lock().expect("bank mutex poisoned");
        Ok(assessments.get(&assessment_id).cloned())
    }
}
