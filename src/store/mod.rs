// src/store/mod.rs

pub mod clock;
pub mod memory;

pub use clock::Clock;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::answer::AnswerRecord;
use crate::models::assessment::Assessment;
use crate::models::attempt::Attempt;
use crate::models::result::AttemptResult;

/// Failure inside a store backend (I/O, connectivity). Opaque to the engine;
/// callers may retry, since every engine write is idempotent.
#[derive(Debug)]
pub struct StoreError(pub String);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// Read-only provider of assessment definitions, answer keys included.
/// Only the engine ever sees the keys; taker-facing DTOs strip them.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    async fn assessment(&self, assessment_id: Uuid) -> Result<Option<Assessment>, StoreError>;
}

/// Durable record storage for attempts and answers.
///
/// The engine runs as stateless handlers over this trait; correctness of the
/// submission path rests on `finalize_attempt` being an atomic compare-and-set
/// on the attempt's status (a conditional update in a database, a guarded map
/// mutation in memory).
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    async fn insert_attempt(&self, attempt: Attempt) -> Result<(), StoreError>;

    async fn attempt(&self, attempt_id: Uuid) -> Result<Option<Attempt>, StoreError>;

    /// The at-most-one in-progress attempt for (assessment, user).
    async fn in_progress_attempt(
        &self,
        assessment_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Attempt>, StoreError>;

    /// How many terminal attempts the user has consumed for the assessment.
    async fn submitted_count(&self, assessment_id: Uuid, user_id: Uuid)
    -> Result<u32, StoreError>;

    /// Upsert keyed by (attempt, question). Unconditional overwrite: the last
    /// write to reach the store wins.
    async fn upsert_answer(&self, record: AnswerRecord) -> Result<(), StoreError>;

    async fn answers(&self, attempt_id: Uuid) -> Result<Vec<AnswerRecord>, StoreError>;

    /// Atomically transitions the attempt from in-progress to submitted,
    /// freezing `result`, `submitted_at` and `timed_out` on it.
    ///
    /// Returns `false` without touching the record when the attempt is
    /// already terminal, so racing submitters settle on one frozen result.
    async fn finalize_attempt(
        &self,
        attempt_id: Uuid,
        submitted_at: DateTime<Utc>,
        timed_out: bool,
        result: AttemptResult,
    ) -> Result<bool, StoreError>;

    /// All terminal attempts for an assessment, for leaderboard reads.
    async fn submitted_attempts(&self, assessment_id: Uuid) -> Result<Vec<Attempt>, StoreError>;
}
