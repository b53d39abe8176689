// tests/harvest_scheduler.rs
//
// Scheduler guard behavior: a run that unwinds must release the busy
// flag so later ticks and manual triggers still harvest.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;

use gig_lead_harvester::store::LeadStore;
use gig_lead_harvester::{Harvester, ListingSource, RawPost, SqliteStore};

/// Panics on the first fetch, then behaves like an empty source.
struct PanicsOnce(AtomicBool);

#[async_trait]
impl ListingSource for PanicsOnce {
    async fn fetch_listings(&self, _sources_csv: &str) -> Vec<RawPost> {
        if self.0.swap(false, Ordering::SeqCst) {
            panic!("listing source blew up");
        }
        Vec::new()
    }
}

async fn memory_store() -> Arc<dyn LeadStore> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");
    let store = SqliteStore::from_pool(pool);
    store.init_schema().await.expect("init schema");
    Arc::new(store)
}

#[tokio::test]
async fn busy_flag_is_released_after_a_panicked_run() {
    let store = memory_store().await;
    let harvester = Harvester::new(
        Arc::new(PanicsOnce(AtomicBool::new(true))),
        store,
        "forhire".into(),
        1,
    );

    // First spawn takes the flag and dies mid-run.
    assert!(harvester.try_spawn_run());

    // Once the panicked task has unwound, the flag must be free again.
    let mut released = false;
    for _ in 0..200 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if harvester.try_spawn_run() {
            released = true;
            break;
        }
    }
    assert!(released, "busy flag stayed set after a panicked run");
}

#[tokio::test]
async fn run_guarded_reports_whether_it_ran() {
    let store = memory_store().await;
    let harvester = Harvester::new(
        Arc::new(PanicsOnce(AtomicBool::new(false))), // behaves as empty
        store,
        "forhire".into(),
        1,
    );

    assert!(harvester.run_guarded().await);
    // Flag is free again after an inline run completes.
    assert!(harvester.run_guarded().await);
}
