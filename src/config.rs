// src/config.rs
//! Env-driven configuration with defaults. `.env` is loaded by `main`
//! before this runs, so local overrides work without exported shell vars.

pub const ENV_SOURCES: &str = "HARVEST_SOURCES";
pub const ENV_INTERVAL_MS: &str = "HARVEST_INTERVAL_MS";
pub const ENV_MIN_SCORE: &str = "HARVEST_MIN_SCORE";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";

pub const DEFAULT_SOURCES: &str = "forhire,jobbit,hiring";
pub const DEFAULT_INTERVAL_MS: u64 = 300_000;
pub const DEFAULT_MIN_SCORE: i32 = 1;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://leads.db?mode=rwc";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Comma-separated source identifiers (subreddit names).
    pub sources_csv: String,
    pub interval_ms: u64,
    /// Leads must score at least this much to persist; the default keeps
    /// only strictly positive scores.
    pub min_score: i32,
    pub database_url: String,
    pub http_timeout_secs: u64,
    pub bind_addr: String,
}

impl HarvestConfig {
    pub fn from_env() -> Self {
        Self {
            sources_csv: env_or(ENV_SOURCES, DEFAULT_SOURCES),
            interval_ms: parse_or(std::env::var(ENV_INTERVAL_MS).ok(), DEFAULT_INTERVAL_MS),
            min_score: parse_or(std::env::var(ENV_MIN_SCORE).ok(), DEFAULT_MIN_SCORE),
            database_url: env_or(ENV_DATABASE_URL, DEFAULT_DATABASE_URL),
            http_timeout_secs: parse_or(
                std::env::var(ENV_HTTP_TIMEOUT_SECS).ok(),
                DEFAULT_HTTP_TIMEOUT_SECS,
            ),
            bind_addr: env_or(ENV_BIND_ADDR, DEFAULT_BIND_ADDR),
        }
    }

    /// `postgres://` selects the networked backend; anything else is the
    /// embedded SQLite engine.
    pub fn wants_postgres(&self) -> bool {
        self.database_url.starts_with("postgres://") || self.database_url.starts_with("postgresql://")
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|s| s.trim().parse::<T>().ok()).unwrap_or(default)
}
