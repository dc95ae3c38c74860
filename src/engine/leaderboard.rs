// src/engine/leaderboard.rs

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::result::LeaderboardEntry;
use crate::store::{PersistenceStore, QuestionBank};

/// Derives a ranked view over an assessment's terminal attempts. Pure reads:
/// rankings are computed on demand, never stored, and tolerate a just-submitted
/// attempt not being visible yet.
pub struct LeaderboardAggregator {
    store: Arc<dyn PersistenceStore>,
    bank: Arc<dyn QuestionBank>,
}

impl LeaderboardAggregator {
    pub fn new(store: Arc<dyn PersistenceStore>, bank: Arc<dyn QuestionBank>) -> Self {
        Self { store, bank }
    }

    /// Best attempt per user (highest percentage, earliest submission breaking
    /// ties), ranked 1..N, optionally truncated to the top `limit`.
    pub async fn leaderboard(
        &self,
        assessment_id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<LeaderboardEntry>, AppError> {
        if self.bank.assessment(assessment_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Assessment {assessment_id} not found"
            )));
        }

        let submitted = self.store.submitted_attempts(assessment_id).await?;

        let mut best: HashMap<Uuid, LeaderboardEntry> = HashMap::new();
        for attempt in submitted {
            let (Some(result), Some(submitted_at)) = (&attempt.result, attempt.submitted_at)
            else {
                tracing::warn!(attempt_id = %attempt.id, "terminal attempt missing result, skipping");
                continue;
            };

            let candidate = LeaderboardEntry {
                rank: 0,
                user_id: attempt.user_id,
                attempt_id: attempt.id,
                percentage: result.percentage,
                total_score: result.total_score,
                submitted_at,
            };

            match best.get(&attempt.user_id) {
                Some(current) if !beats(&candidate, current) => {}
                _ => {
                    best.insert(attempt.user_id, candidate);
                }
            }
        }

        let mut entries: Vec<LeaderboardEntry> = best.into_values().collect();
        entries.sort_by(|a, b| {
            b.percentage
                .total_cmp(&a.percentage)
                .then_with(|| a.submitted_at.cmp(&b.submitted_at))
        });
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.rank = (i + 1) as u32;
        }
        if let Some(limit) = limit {
            entries.truncate(limit);
        }

        Ok(entries)
    }
}

/// Whether `candidate` is a better showing than `current` for the same user.
fn beats(candidate: &LeaderboardEntry, current: &LeaderboardEntry) -> bool {
    match candidate.percentage.total_cmp(&current.percentage) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => candidate.submitted_at < current.submitted_at,
    }
}
