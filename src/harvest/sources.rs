// src/harvest/sources.rs
//! Source client for subreddit-style JSON listing feeds.
//!
//! One bounded page per configured source, one fetch shape
//! (`{"data":{"children":[{"data":{...}}]}}`). A failing source is logged
//! and contributes nothing; it never aborts the batch.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

use crate::score::extract_budget;

pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com";
/// Host used when absolutizing relative permalinks.
const PUBLIC_LINK_HOST: &str = "https://reddit.com";
/// Identifying client header, fixed per the listing host's API etiquette.
const USER_AGENT: &str = "gig-lead-harvester/0.1 (by /u/gigleadbot)";
const PAGE_LIMIT: usize = 50;

/// A normalized post straight off a listing page. Ephemeral; identity is
/// the permalink URL within its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPost {
    pub source: String,
    pub title: String,
    pub body: String,
    pub author: String,
    pub url: String,
    pub created_utc: Option<i64>,
}

impl RawPost {
    /// Title joined with body — the text the scorer sees.
    pub fn combined_text(&self) -> String {
        if self.body.is_empty() {
            self.title.clone()
        } else {
            format!("{}. {}", self.title, self.body)
        }
    }

    /// Best-effort budget string from the combined text.
    pub fn budget(&self) -> Option<String> {
        extract_budget(&self.combined_text())
    }
}

/// Seam between the pipeline and the concrete HTTP client, so tests can
/// substitute fixture listings.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch one page per source named in the CSV. Eager, source-major
    /// order; per-source failures are contained.
    async fn fetch_listings(&self, sources_csv: &str) -> Vec<RawPost>;
}

/* ----------------------------
Listing wire shape
---------------------------- */

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    created_utc: Option<f64>,
}

/// Split a CSV of source identifiers: trim, drop empties, keep first
/// occurrence of duplicates.
pub fn split_sources(csv: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in csv.split(',') {
        let name = part.trim();
        if !name.is_empty() && !out.iter().any(|s| s.eq_ignore_ascii_case(name)) {
            out.push(name.to_string());
        }
    }
    out
}

/// Normalize post text: decode HTML entities and collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));
    let decoded = html_escape::decode_html_entities(s);
    RE_WS.replace_all(decoded.trim(), " ").to_string()
}

/// Parse one listing body into posts. Any shape other than the expected
/// nested listing is an error, which the caller downgrades to an empty
/// contribution for that source.
pub fn parse_listing(source: &str, body: &str) -> Result<Vec<RawPost>> {
    let listing: Listing =
        serde_json::from_str(body).with_context(|| format!("parsing {source} listing json"))?;

    let mut out = Vec::with_capacity(listing.data.children.len());
    for child in listing.data.children {
        let post = child.data;
        let title = normalize_text(&post.title);
        let text = normalize_text(&post.selftext);
        if title.is_empty() && text.is_empty() {
            continue;
        }
        let url = if post.permalink.starts_with('/') {
            format!("{PUBLIC_LINK_HOST}{}", post.permalink)
        } else {
            post.permalink
        };
        out.push(RawPost {
            source: source.to_string(),
            title,
            body: text,
            author: post.author,
            url,
            created_utc: post.created_utc.map(|t| t as i64),
        });
    }
    Ok(out)
}

/// HTTP client over the listing host. The base URL is injectable so tests
/// can point it at a local stub server.
pub struct SourceClient {
    http: reqwest::Client,
    base_url: String,
}

impl SourceClient {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("building http client")?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_source(&self, name: &str) -> Result<Vec<RawPost>> {
        let url = format!("{}/r/{}/new.json?limit={}", self.base_url, name, PAGE_LIMIT);
        let body = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("fetching {url}"))?
            .error_for_status()
            .with_context(|| format!("listing status for {name}"))?
            .text()
            .await
            .with_context(|| format!("reading {name} listing body"))?;
        parse_listing(name, &body)
    }
}

#[async_trait]
impl ListingSource for SourceClient {
    async fn fetch_listings(&self, sources_csv: &str) -> Vec<RawPost> {
        let mut out = Vec::new();
        for name in split_sources(sources_csv) {
            let t0 = std::time::Instant::now();
            match self.fetch_source(&name).await {
                Ok(mut posts) => {
                    counter!("harvest_posts_total").increment(posts.len() as u64);
                    out.append(&mut posts);
                }
                Err(e) => {
                    tracing::warn!(error = ?e, source = %name, "source fetch failed");
                    counter!("harvest_source_errors_total").increment(1);
                }
            }
            histogram!("harvest_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_sources_trims_and_drops_empties() {
        assert_eq!(
            split_sources(" forhire, , jobbit ,forhire,"),
            vec!["forhire".to_string(), "jobbit".to_string()]
        );
        assert!(split_sources("").is_empty());
        assert!(split_sources(" , ,").is_empty());
    }

    #[test]
    fn normalize_decodes_entities_and_collapses_ws() {
        assert_eq!(
            normalize_text("  Need&nbsp;a   dev\n\nnow "),
            "Need a dev now"
        );
    }

    #[test]
    fn parse_listing_maps_posts_and_absolutizes_permalinks() {
        let body = r#"{
            "data": {
                "children": [
                    {"data": {
                        "title": "React dev wanted",
                        "selftext": "Remote, $40/hr",
                        "author": "alice",
                        "permalink": "/r/forhire/comments/abc/react_dev/",
                        "created_utc": 1700000000.0
                    }},
                    {"data": {
                        "title": "",
                        "selftext": "",
                        "author": "ghost",
                        "permalink": "/r/forhire/comments/xyz/empty/",
                        "created_utc": 1700000001.0
                    }}
                ]
            }
        }"#;
        let posts = parse_listing("forhire", body).expect("parse fixture");
        assert_eq!(posts.len(), 1); // the all-empty post is skipped
        assert_eq!(posts[0].source, "forhire");
        assert_eq!(
            posts[0].url,
            "https://reddit.com/r/forhire/comments/abc/react_dev/"
        );
        assert_eq!(posts[0].created_utc, Some(1_700_000_000));
        assert_eq!(posts[0].combined_text(), "React dev wanted. Remote, $40/hr");
        assert_eq!(posts[0].budget().as_deref(), Some("$40/hr"));
    }

    #[test]
    fn parse_listing_rejects_unexpected_shapes() {
        assert!(parse_listing("forhire", "<html>rate limited</html>").is_err());
        assert!(parse_listing("forhire", r#"{"error": 429}"#).is_err());
        // A listing with no children is a valid empty page.
        let posts = parse_listing("forhire", r#"{"data": {}}"#).expect("empty page");
        assert!(posts.is_empty());
    }
}
