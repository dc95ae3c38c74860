// src/engine/mod.rs

pub mod answer_store;
pub mod attempt_manager;
pub mod leaderboard;
pub mod scorer;
pub mod time_guard;

pub use answer_store::AnswerStore;
pub use attempt_manager::AttemptManager;
pub use leaderboard::LeaderboardAggregator;
pub use scorer::Scorer;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::attempt::Attempt;
use crate::store::PersistenceStore;

/// Fetches an attempt and checks it belongs to the caller. A foreign attempt
/// reads as not-found so attempt ids cannot be probed.
pub(crate) async fn owned_attempt(
    store: &dyn PersistenceStore,
    attempt_id: Uuid,
    user_id: Uuid,
) -> Result<Attempt, AppError> {
    let attempt = store
        .attempt(attempt_id)
        .await?
        .filter(|a| a.user_id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("Attempt {attempt_id} not found")))?;
    Ok(attempt)
}
