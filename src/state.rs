// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::engine::{AnswerStore, AttemptManager, LeaderboardAggregator, Scorer};
use crate::store::{Clock, PersistenceStore, QuestionBank};

#[derive(Clone)]
pub struct AppState {
    pub attempts: Arc<AttemptManager>,
    pub answers: Arc<AnswerStore>,
    pub scorer: Arc<Scorer>,
    pub leaderboard: Arc<LeaderboardAggregator>,
    pub config: Config,
}

impl AppState {
    /// Wires every engine component over one shared set of collaborators.
    pub fn new(
        store: Arc<dyn PersistenceStore>,
        bank: Arc<dyn QuestionBank>,
        clock: Arc<dyn Clock>,
        config: Config,
    ) -> Self {
        Self {
            attempts: Arc::new(AttemptManager::new(
                store.clone(),
                bank.clone(),
                clock.clone(),
            )),
            answers: Arc::new(AnswerStore::new(store.clone(), bank.clone(), clock.clone())),
            scorer: Arc::new(Scorer::new(store.clone(), bank.clone(), clock)),
            leaderboard: Arc::new(LeaderboardAggregator::new(store, bank)),
            config,
        }
    }
}

impl FromRef<AppState> for Arc<AttemptManager> {
    fn from_ref(state: &AppState) -> Self {
        state.attempts.clone()
    }
}

impl FromRef<AppState> for Arc<AnswerStore> {
    fn from_ref(state: &AppState) -> Self {
        state.answers.clone()
    }
}

impl FromRef<AppState> for Arc<Scorer> {
    fn from_ref(state: &AppState) -> Self {
        state.scorer.clone()
    }
}

impl FromRef<AppState> for Arc<LeaderboardAggregator> {
    fn from_ref(state: &AppState) -> Self {
        state.leaderboard.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
