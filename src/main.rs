// src/main.rs

use std::sync::Arc;

use assessment_backend::config::Config;
use assessment_backend::models::assessment::Assessment;
use assessment_backend::routes;
use assessment_backend::state::AppState;
use assessment_backend::store::clock::SystemClock;
use assessment_backend::store::memory::{InMemoryQuestionBank, InMemoryStore};
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use validator::Validate;

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Seed the question bank from fixtures, if configured
    let bank = Arc::new(InMemoryQuestionBank::default());
    if let Some(path) = &config.fixtures_path {
        let raw = std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read fixtures {}: {e}", path.display()));
        let assessments: Vec<Assessment> =
            serde_json::from_str(&raw).expect("Fixtures are not a valid assessment list");

        let count = assessments.len();
        for assessment in assessments {
            if let Err(e) = assessment.validate() {
                panic!("Fixture assessment {} is invalid: {e}", assessment.id);
            }
            bank.insert(assessment);
        }
        tracing::info!("Seeded {} assessments from {}", count, path.display());
    } else {
        tracing::warn!("ASSESSMENT_FIXTURES not set, starting with an empty question bank");
    }

    // Create AppState over the in-process collaborators
    let store = Arc::new(InMemoryStore::default());
    let clock = Arc::new(SystemClock);
    let state = AppState::new(store, bank, clock, config.clone());

    // Create the Axum application router
    let app = routes::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listen address");

    // Start the server
    axum::serve(listener, app).await.unwrap();
}
