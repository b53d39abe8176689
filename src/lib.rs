// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod config;
pub mod harvest;
pub mod metrics;
pub mod score;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::harvest::scheduler::Harvester;
pub use crate::harvest::sources::{ListingSource, RawPost, SourceClient};
pub use crate::score::{score, ScoreResult, DISQUALIFIED_SCORE};
pub use crate::store::{Lead, LeadStore, NewLead, PostgresStore, SqliteStore};
