// src/score.rs
//! Lead scoring primitives: pay/urgency/recency signals, tech-stack scan,
//! company and location extraction, and the disqualification override.
//!
//! Pure functions only — no I/O, no state, never panics on malformed input.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Sentinel returned for disqualified posts (`unpaid` / `exposure`).
pub const DISQUALIFIED_SCORE: i32 = -999;

/// A post counts as "fresh" if created within this many seconds of evaluation.
const RECENCY_WINDOW_SECS: i64 = 4 * 60 * 60;

/// Currency amounts like `$50`, `$1,200.50`, `$50/hr`. Shared with the
/// source client's budget extraction.
static RE_CURRENCY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\s?\d[\d,]*(?:\.\d+)?(?:\s*/\s*(?:hr|hour|day|wk|week|mo|month|project))?")
        .expect("currency regex")
});

static RE_CRYPTO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:eth|btc)\b").expect("crypto regex"));

static RE_URGENCY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:asap|urgent)").expect("urgency regex"));

/// `at`/`for` followed by a capitalized phrase ending in a corporate suffix.
static RE_COMPANY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?i:at|for)\s+((?:[A-Z][A-Za-z0-9&'-]*\s+)+(?:Inc|LLC|Corp|Ltd|Co))\b")
        .expect("company regex")
});

static RE_LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(remote|anywhere|worldwide|hybrid|on[- ]?site|new york|nyc|san francisco|bay area|london|berlin|amsterdam|austin|miami|toronto|singapore|dubai|europe|us[- ]based|uk[- ]based)\b",
    )
    .expect("location regex")
});

/// Fixed technology vocabulary. Entries carry display casing; matching is
/// whole-word and case-insensitive.
const TECH_VOCAB: &[&str] = &[
    "React",
    "Vue",
    "Angular",
    "Svelte",
    "Node",
    "TypeScript",
    "JavaScript",
    "Python",
    "Django",
    "Flask",
    "Rust",
    "Golang",
    "Java",
    "Kotlin",
    "Swift",
    "Flutter",
    "Ruby",
    "Rails",
    "PHP",
    "Laravel",
    "Solidity",
    "AWS",
    "GCP",
    "Azure",
    "Docker",
    "Kubernetes",
    "Terraform",
    "Postgres",
    "MySQL",
    "MongoDB",
    "Redis",
    "GraphQL",
    "Unity",
    "Unreal",
];

/// Outcome of scoring one post's combined text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreResult {
    pub score: i32,
    pub company: Option<String>,
    pub location: Option<String>,
    pub tech_stack: Vec<String>,
}

impl ScoreResult {
    fn disqualified() -> Self {
        Self {
            score: DISQUALIFIED_SCORE,
            ..Self::default()
        }
    }
}

/// Score a post's text against the evaluation instant "now".
///
/// A missing `created_utc` degrades to "always fresh" and still earns the
/// recency bonus — a documented quirk of the scoring policy, kept as-is.
pub fn score(text: &str, created_utc: Option<i64>) -> ScoreResult {
    score_at(text, created_utc, chrono::Utc::now().timestamp())
}

/// Same as [`score`] but with an explicit evaluation timestamp, so the
/// recency bonus is testable without fake clocks.
pub fn score_at(text: &str, created_utc: Option<i64>, now: i64) -> ScoreResult {
    // Disqualification has highest precedence: no additive signal may
    // outweigh it, and extraction short-circuits entirely.
    let lower = text.to_lowercase();
    if lower.contains("unpaid") || lower.contains("exposure") {
        return ScoreResult::disqualified();
    }

    let mut result = ScoreResult::default();

    if RE_CURRENCY.is_match(text) || RE_CRYPTO.is_match(text) {
        result.score += 3;
    }

    if RE_URGENCY.is_match(text) {
        result.score += 2;
    }

    let created = created_utc.unwrap_or(now);
    if (now - created).abs() <= RECENCY_WINDOW_SECS {
        result.score += 1;
    }

    for tech in tech_matches(text) {
        result.score += 1;
        result.tech_stack.push(tech);
    }

    if let Some(company) = extract_company(text) {
        result.score += 1;
        result.company = Some(company);
    }

    if let Some(location) = extract_location(text) {
        result.score += 1;
        result.location = Some(location);
    }

    result
}

/// Distinct vocabulary entries matched as whole words, in vocabulary order.
fn tech_matches(text: &str) -> Vec<String> {
    let tokens: std::collections::HashSet<String> = tokenize(text).collect();
    TECH_VOCAB
        .iter()
        .filter(|t| tokens.contains(&t.to_ascii_lowercase()))
        .map(|t| t.to_string())
        .collect()
}

fn extract_company(text: &str) -> Option<String> {
    RE_COMPANY
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn extract_location(text: &str) -> Option<String> {
    RE_LOCATION
        .find(text)
        .map(|m| m.as_str().to_lowercase())
}

/// Best-effort budget string, reusing the scorer's currency pattern.
pub fn extract_budget(text: &str) -> Option<String> {
    RE_CURRENCY.find(text).map(|m| m.as_str().to_string())
}

/// Alphanumeric tokens, lower-cased.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}
