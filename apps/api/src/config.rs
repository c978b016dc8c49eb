use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub rust_log: String,
    /// `production` disables the debugging endpoints.
    pub app_env: String,
    /// Active postings considered per professional recommendation request.
    pub posting_scan_limit: i64,
    /// Active professionals considered per candidate recommendation request.
    pub candidate_scan_limit: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            app_env: optional_env("APP_ENV", "development"),
            posting_scan_limit: optional_env("MATCHING_POSTING_SCAN_LIMIT", "50")
                .parse::<i64>()
                .context("MATCHING_POSTING_SCAN_LIMIT must be an integer")?,
            candidate_scan_limit: optional_env("MATCHING_CANDIDATE_SCAN_LIMIT", "100")
                .parse::<i64>()
                .context("MATCHING_CANDIDATE_SCAN_LIMIT must be an integer")?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
