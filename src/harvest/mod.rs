// src/harvest/mod.rs
//! Harvest pipeline: fetch listings, score each post, persist qualifying
//! leads through the store's dedup-insert.

pub mod scheduler;
pub mod sources;

use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::score::{self, ScoreResult};
use crate::store::{LeadStore, NewLead, CONTENT_MAX_CHARS, TITLE_MAX_CHARS};
use sources::{ListingSource, RawPost};

/// One-time metrics registration (so series show up on /metrics).
/// Idempotent; called from `Metrics::init` and again on every run for
/// library users who skip the recorder setup.
pub fn register_metrics() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("harvest_posts_total", "Posts parsed from listing sources.");
        describe_counter!(
            "harvest_source_errors_total",
            "Source fetch/parse failures (contained per source)."
        );
        describe_counter!(
            "harvest_qualified_total",
            "Posts clearing the score threshold."
        );
        describe_counter!("harvest_leads_inserted_total", "Leads newly persisted.");
        describe_counter!(
            "harvest_duplicates_total",
            "Qualifying posts already present in the store."
        );
        describe_counter!("harvest_runs_total", "Completed harvest runs.");
        describe_histogram!("harvest_fetch_ms", "Per-source fetch+parse time in ms.");
        describe_gauge!("harvest_last_run_ts", "Unix ts of the last harvest run.");
    });
}

/// Aggregate outcome of one harvest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    pub fetched: usize,
    pub qualified: usize,
    pub inserted: usize,
    pub duplicates: usize,
}

/// Shape a scored post into the persisted lead record, bounding the free
/// text columns.
pub fn build_lead(post: &RawPost, scored: &ScoreResult) -> NewLead {
    NewLead {
        platform: post.source.clone(),
        title: crate::store::truncate_chars(&post.title, TITLE_MAX_CHARS),
        content: crate::store::truncate_chars(&post.body, CONTENT_MAX_CHARS),
        author: post.author.clone(),
        url: post.url.clone(),
        budget: post.budget(),
        score: scored.score,
        company: scored.company.clone(),
        location: scored.location.clone(),
        tech_stack: scored.tech_stack.clone(),
    }
}

/// Run one harvest: fetch every configured source, score, filter, and
/// dedup-insert. Per-source failures are already contained inside the
/// source client; an `Err` here means the store itself failed.
pub async fn run_once(
    listings: &dyn ListingSource,
    store: &dyn LeadStore,
    sources_csv: &str,
    min_score: i32,
) -> Result<HarvestSummary> {
    register_metrics();

    let posts = listings.fetch_listings(sources_csv).await;

    let mut summary = HarvestSummary {
        fetched: posts.len(),
        ..Default::default()
    };

    for post in &posts {
        let scored = score::score(&post.combined_text(), post.created_utc);
        if scored.score < min_score {
            continue;
        }
        summary.qualified += 1;

        if store.insert_if_new(&build_lead(post, &scored)).await? {
            summary.inserted += 1;
        } else {
            summary.duplicates += 1;
        }
    }

    counter!("harvest_qualified_total").increment(summary.qualified as u64);
    counter!("harvest_leads_inserted_total").increment(summary.inserted as u64);
    counter!("harvest_duplicates_total").increment(summary.duplicates as u64);
    gauge!("harvest_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

    Ok(summary)
}
