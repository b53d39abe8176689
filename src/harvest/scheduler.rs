// src/harvest/scheduler.rs
//! Interval-driven harvest loop. Two states: idle and harvesting; an
//! atomic busy flag keeps runs from overlapping when a harvest outlives
//! the tick interval or a manual trigger races the timer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::harvest::sources::ListingSource;
use crate::store::LeadStore;

struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct Harvester {
    listings: Arc<dyn ListingSource>,
    store: Arc<dyn LeadStore>,
    sources_csv: String,
    min_score: i32,
    busy: Arc<AtomicBool>,
}

impl Harvester {
    pub fn new(
        listings: Arc<dyn ListingSource>,
        store: Arc<dyn LeadStore>,
        sources_csv: String,
        min_score: i32,
    ) -> Self {
        Self {
            listings,
            store,
            sources_csv,
            min_score,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run one harvest inline unless another is in flight. Returns whether
    /// this call performed a run.
    pub async fn run_guarded(&self) -> bool {
        if !self.acquire() {
            return false;
        }
        self.run_and_release().await;
        true
    }

    /// Start a harvest in the background unless one is in flight.
    /// Used by the immediate-run HTTP trigger.
    pub fn try_spawn_run(&self) -> bool {
        if !self.acquire() {
            return false;
        }
        let this = self.clone();
        tokio::spawn(async move { this.run_and_release().await });
        true
    }

    /// Clears the busy flag when the run ends, even if it unwinds.
    fn release_on_drop(&self) -> BusyGuard {
        BusyGuard(Arc::clone(&self.busy))
    }

    fn acquire(&self) -> bool {
        let acquired = self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if !acquired {
            warn!(target: "harvest", "harvest already in flight; skipping");
        }
        acquired
    }

    async fn run_and_release(&self) {
        let _busy = self.release_on_drop();
        let t0 = std::time::Instant::now();
        // A failed run is logged and forgotten; the next tick is the retry.
        match crate::harvest::run_once(
            self.listings.as_ref(),
            self.store.as_ref(),
            &self.sources_csv,
            self.min_score,
        )
        .await
        {
            Ok(summary) => {
                info!(
                    target: "harvest",
                    fetched = summary.fetched,
                    qualified = summary.qualified,
                    inserted = summary.inserted,
                    duplicates = summary.duplicates,
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "harvest run complete"
                );
            }
            Err(e) => {
                error!(target: "harvest", error = ?e, "harvest run failed");
            }
        }
        counter!("harvest_runs_total").increment(1);
    }

    /// Spawn the fixed-interval loop. The first tick fires immediately,
    /// which doubles as the run-at-startup trigger.
    pub fn spawn_scheduler(&self, interval_ms: u64) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
            loop {
                ticker.tick().await;
                this.run_guarded().await;
            }
        })
    }
}
