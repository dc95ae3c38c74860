// src/engine/time_guard.rs

use chrono::{DateTime, Utc};

use crate::engine::scorer;
use crate::error::AppError;
use crate::models::attempt::{Attempt, AttemptStatus};
use crate::models::result::AttemptResult;
use crate::store::{Clock, PersistenceStore, QuestionBank};

/// Deadline detection is lazy: no timers, no background sweeps. Every entry
/// point evaluates this predicate against stored state, so timeouts hold even
/// when the client vanished or the process restarted.
pub fn is_expired(attempt: &Attempt, now: DateTime<Utc>) -> bool {
    attempt.status == AttemptStatus::InProgress
        && attempt.expires_at.is_some_and(|deadline| now >= deadline)
}

/// Routes an expired in-progress attempt through the ordinary submit path,
/// marked as timed out. Returns the frozen result when settlement happened,
/// `None` when the attempt is still live (or already terminal).
pub async fn settle_if_expired(
    store: &dyn PersistenceStore,
    bank: &dyn QuestionBank,
    clock: &dyn Clock,
    attempt: &Attempt,
) -> Result<Option<AttemptResult>, AppError> {
    if !is_expired(attempt, clock.now()) {
        return Ok(None);
    }

    tracing::warn!(
        attempt_id = %attempt.id,
        user_id = %attempt.user_id,
        "attempt deadline passed, forcing submission"
    );
    let result = scorer::submit(store, bank, clock, attempt.id, true).await?;
    Ok(Some(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::collections::HashMap;
    use uuid::Uuid;

    fn attempt(expires_at: Option<DateTime<Utc>>, status: AttemptStatus) -> Attempt {
        Attempt {
            id: Uuid::new_v4(),
            assessment_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status,
            started_at: Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap(),
            expires_at,
            submitted_at: None,
            timed_out: false,
            question_order: vec![],
            option_order: HashMap::new(),
            result: None,
        }
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let deadline = Utc.with_ymd_and_hms(2026, 1, 15, 9, 10, 0).unwrap();
        let a = attempt(Some(deadline), AttemptStatus::InProgress);

        assert!(!is_expired(&a, deadline - Duration::seconds(1)));
        assert!(is_expired(&a, deadline));
        assert!(is_expired(&a, deadline + Duration::seconds(1)));
    }

    #[test]
    fn untimed_attempts_never_expire() {
        let a = attempt(None, AttemptStatus::InProgress);
        let far = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert!(!is_expired(&a, far));
    }

    #[test]
    fn terminal_attempts_are_not_expired() {
        let deadline = Utc.with_ymd_and_hms(2026, 1, 15, 9, 10, 0).unwrap();
        let a = attempt(Some(deadline), AttemptStatus::Submitted);
        assert!(!is_expired(&a, deadline + Duration::hours(1)));
    }
}
