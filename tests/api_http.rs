// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /leads (paging clamps)
// - POST /harvest/run (busy-flag outcome)

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    Router,
};
use http::{Request, StatusCode};
use serde_json::Value as Json;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt as _; // for `oneshot`

use gig_lead_harvester::api::{self, AppState};
use gig_lead_harvester::store::{LeadStore, NewLead};
use gig_lead_harvester::{Harvester, ListingSource, RawPost, SqliteStore};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

struct EmptyListings;

#[async_trait]
impl ListingSource for EmptyListings {
    async fn fetch_listings(&self, _sources_csv: &str) -> Vec<RawPost> {
        Vec::new()
    }
}

async fn test_state() -> AppState {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");
    let store: Arc<dyn LeadStore> = Arc::new(SqliteStore::from_pool(pool));
    store.init_schema().await.expect("init schema");

    let harvester = Harvester::new(Arc::new(EmptyListings), store.clone(), "forhire".into(), 1);
    AppState { store, harvester }
}

fn test_router(state: AppState) -> Router {
    api::create_router(state)
}

async fn seed_leads(store: &dyn LeadStore, n: usize) {
    for i in 0..n {
        let lead = NewLead {
            platform: "forhire".into(),
            title: format!("lead {i}"),
            content: "body".into(),
            author: "alice".into(),
            url: format!("https://reddit.com/r/forhire/comments/{i}/"),
            budget: None,
            score: 3,
            company: None,
            location: None,
            tech_stack: vec![],
        };
        assert!(store.insert_if_new(&lead).await.expect("seed insert"));
    }
}

async fn body_json(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json body")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router(test_state().await);

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "ok");
}

#[tokio::test]
async fn api_leads_respects_limit_and_orders_newest_first() {
    let state = test_state().await;
    seed_leads(state.store.as_ref(), 5).await;
    let app = test_router(state);

    let req = Request::builder()
        .method("GET")
        .uri("/leads?limit=2")
        .body(Body::empty())
        .expect("build GET /leads");

    let resp = app.oneshot(req).await.expect("oneshot /leads");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = body_json(resp).await;
    let rows = v.as_array().expect("json array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["title"], "lead 4");
    assert_eq!(rows[1]["title"], "lead 3");
}

#[tokio::test]
async fn api_leads_offset_past_end_is_empty_and_bad_params_are_clamped() {
    let state = test_state().await;
    seed_leads(state.store.as_ref(), 3).await;
    let app = test_router(state);

    let req = Request::builder()
        .method("GET")
        .uri("/leads?limit=100000&offset=-4")
        .body(Body::empty())
        .expect("build GET /leads clamped");
    let resp = app.clone().oneshot(req).await.expect("oneshot clamped");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v.as_array().expect("json array").len(), 3);

    let req = Request::builder()
        .method("GET")
        .uri("/leads?offset=50")
        .body(Body::empty())
        .expect("build GET /leads offset");
    let resp = app.clone().oneshot(req).await.expect("oneshot offset");
    let v = body_json(resp).await;
    assert!(v.as_array().expect("json array").is_empty());

    // Non-numeric params fall back to the defaults instead of a 400.
    let req = Request::builder()
        .method("GET")
        .uri("/leads?limit=abc&offset=lots")
        .body(Body::empty())
        .expect("build GET /leads garbage params");
    let resp = app.oneshot(req).await.expect("oneshot garbage params");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v.as_array().expect("json array").len(), 3);
}

#[tokio::test]
async fn api_harvest_run_reports_started() {
    let app = test_router(test_state().await);

    let req = Request::builder()
        .method("POST")
        .uri("/harvest/run")
        .body(Body::empty())
        .expect("build POST /harvest/run");

    let resp = app.oneshot(req).await.expect("oneshot /harvest/run");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = body_json(resp).await;
    assert_eq!(v["started"], true);
}
