use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cron_secret: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub render_service_url: Option<String>,
    pub import_cooldown_minutes: i64,
    pub import_grace_hours: u64,
    pub import_budget_seconds: u64,
    /// Six-field cron expression; no scheduler when unset
    pub import_schedule: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: parsed_or("PORT", 8080)?,
            cron_secret: non_empty("CRON_SECRET").context("CRON_SECRET must be set")?,
            jwt_secret: non_empty("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "job-ingest".to_string()),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            render_service_url: non_empty("RENDER_SERVICE_URL"),
            import_cooldown_minutes: parsed_or("IMPORT_COOLDOWN_MINUTES", 10)?,
            import_grace_hours: parsed_or("IMPORT_GRACE_HOURS", 48)?,
            import_budget_seconds: parsed_or("IMPORT_BUDGET_SECONDS", 270)?,
            import_schedule: non_empty("IMPORT_SCHEDULE"),
        })
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .ok()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}
