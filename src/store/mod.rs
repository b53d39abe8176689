// src/store/mod.rs
//! Lead persistence: one contract, two interchangeable sqlx backends
//! (embedded SQLite for single-process use, PostgreSQL for shared use).
//! The backend is selected once at startup from `DATABASE_URL`.

pub mod postgres;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;

pub const TITLE_MAX_CHARS: usize = 300;
pub const CONTENT_MAX_CHARS: usize = 2000;

pub const LIST_DEFAULT_LIMIT: i64 = 50;
pub const LIST_MAX_LIMIT: i64 = 100;

/// A lead as handed to the store by the harvest pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub platform: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub url: String,
    pub budget: Option<String>,
    pub score: i32,
    pub company: Option<String>,
    pub location: Option<String>,
    pub tech_stack: Vec<String>,
}

/// A persisted lead, as returned by `list_recent`.
#[derive(Debug, Clone, Serialize)]
pub struct Lead {
    pub id: i64,
    pub platform: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub url: String,
    pub budget: Option<String>,
    pub score: i32,
    pub company: Option<String>,
    pub location: Option<String>,
    pub tech_stack: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Storage contract for the harvest pipeline and the read surface.
///
/// `insert_if_new` keys on `(platform, url)` and reports duplicates as a
/// normal `false` outcome — the uniqueness constraint lives in the backend,
/// not in process-local locking, because several processes may share one
/// store. Only genuine store failures surface as errors.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Idempotent schema creation; safe to call on every process start.
    async fn init_schema(&self) -> Result<()>;

    /// Atomic check-and-insert. `Ok(true)` when the row was created,
    /// `Ok(false)` when `(platform, url)` already exists.
    async fn insert_if_new(&self, lead: &NewLead) -> Result<bool>;

    /// Leads ordered by creation, newest first. `limit` is clamped to
    /// `1..=100` (default 50), `offset` to non-negative.
    async fn list_recent(&self, limit: i64, offset: i64) -> Result<Vec<Lead>>;
}

/// Clamp raw paging parameters to the contract's bounds.
pub fn clamp_page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(LIST_DEFAULT_LIMIT).clamp(1, LIST_MAX_LIMIT);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

/// Character-bounded truncation (not byte-bounded, so multi-byte text
/// never splits mid-character).
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

pub(crate) fn encode_tech_stack(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

pub(crate) fn decode_tech_stack(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}
