// src/config.rs

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub rust_log: String,
    /// JSON file of assessment definitions to seed the question bank with.
    pub fixtures_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let fixtures_path = env::var("ASSESSMENT_FIXTURES").ok().map(PathBuf::from);

        Self {
            bind_addr,
            rust_log,
            fixtures_path,
        }
    }
}
