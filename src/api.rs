// src/api.rs
//! Read surface for the surrounding system: paged leads, health, and the
//! immediate-run harvest trigger.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::harvest::scheduler::Harvester;
use crate::store::{clamp_page, Lead, LeadStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LeadStore>,
    pub harvester: Harvester,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/leads", get(list_leads))
        .route("/harvest/run", post(run_harvest))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Paging params are parsed leniently: anything non-numeric falls back
/// to the defaults, so the clamp is total and `/leads` never 400s.
fn parse_i64(raw: Option<&String>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

async fn list_leads(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Lead>>, StatusCode> {
    let (limit, offset) = clamp_page(parse_i64(q.get("limit")), parse_i64(q.get("offset")));
    match state.store.list_recent(limit, offset).await {
        Ok(leads) => Ok(Json(leads)),
        Err(e) => {
            tracing::error!(error = ?e, "listing leads failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(serde::Serialize)]
struct RunResp {
    started: bool,
}

/// Kick off a harvest now. `started: false` means one is already in flight.
async fn run_harvest(State(state): State<AppState>) -> Json<RunResp> {
    Json(RunResp {
        started: state.harvester.try_spawn_run(),
    })
}
