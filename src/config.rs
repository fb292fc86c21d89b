// src/config.rs

use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,

    /// Base URL of the external code-execution (judging) service.
    pub judge_url: String,

    /// Base URL of the external cognitive-classification service.
    pub classifier_url: String,

    /// Every K-th attempt on an unsolved question reveals the next hidden
    /// test case. Required; there is no compiled-in default.
    pub reveal_threshold: u32,

    pub admin_username: Option<String>,
    pub admin_password: Option<String>,

    /// Seed a demo course with a live-code question on startup.
    pub seed_demo_data: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let judge_url = env::var("JUDGE_URL").expect("JUDGE_URL must be set");

        let classifier_url = env::var("CLASSIFIER_URL").expect("CLASSIFIER_URL must be set");

        let reveal_threshold = env::var("REVEAL_THRESHOLD")
            .expect("REVEAL_THRESHOLD must be set")
            .parse::<u32>()
            .expect("REVEAL_THRESHOLD must be a positive integer");
        assert!(reveal_threshold > 0, "REVEAL_THRESHOLD must be at least 1");

        let admin_username = env::var("ADMIN_USERNAME").ok();
        let admin_password = env::var("ADMIN_PASSWORD").ok();

        let seed_demo_data = env::var("SEED_DEMO_DATA")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            judge_url,
            classifier_url,
            reveal_threshold,
            admin_username,
            admin_password,
            seed_demo_data,
        }
    }
}
