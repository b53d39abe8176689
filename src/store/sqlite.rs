// src/store/sqlite.rs
//! Embedded SQLite backend. Suited to local and single-process runs; the
//! same `(platform, url)` uniqueness is enforced by the engine, so even a
//! second process pointed at the same file cannot double-insert.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use super::{decode_tech_stack, encode_tech_stack, Lead, LeadStore, NewLead};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to a SQLite database URL, e.g. `sqlite://leads.db?mode=rwc`
    /// or `sqlite::memory:` for tests.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .with_context(|| format!("connecting sqlite at {database_url}"))?;
        Ok(Self { pool })
    }

    /// Reuse an existing pool (the process-wide pool built at startup).
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_lead(row: &SqliteRow) -> Result<Lead> {
    let tech_raw: String = row.try_get("tech_stack")?;
    Ok(Lead {
        id: row.try_get("id")?,
        platform: row.try_get("platform")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        author: row.try_get("author")?,
        url: row.try_get("url")?,
        budget: row.try_get("budget")?,
        score: row.try_get("score")?,
        company: row.try_get("company")?,
        location: row.try_get("location")?,
        tech_stack: decode_tech_stack(&tech_raw),
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl LeadStore for SqliteStore {
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS leads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                platform TEXT NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                author TEXT NOT NULL,
                url TEXT NOT NULL,
                budget TEXT,
                score INTEGER NOT NULL,
                company TEXT,
                location TEXT,
                tech_stack TEXT NOT NULL DEFAULT '[]',
                created_at TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("creating leads table")?;

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_leads_platform_url ON leads(platform, url)",
        )
        .execute(&self.pool)
        .await
        .context("creating leads unique index")?;

        // Companion subscriber records share the store but are written by
        // the surrounding system, not by this pipeline.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subscribers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                billing_customer_id TEXT,
                subscription_status TEXT NOT NULL DEFAULT 'inactive',
                created_at TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("creating subscribers table")?;

        Ok(())
    }

    async fn insert_if_new(&self, lead: &NewLead) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO leads
                (platform, title, content, author, url, budget, score,
                 company, location, tech_stack, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(platform, url) DO NOTHING
            "#,
        )
        .bind(&lead.platform)
        .bind(&lead.title)
        .bind(&lead.content)
        .bind(&lead.author)
        .bind(&lead.url)
        .bind(&lead.budget)
        .bind(lead.score)
        .bind(&lead.company)
        .bind(&lead.location)
        .bind(encode_tech_stack(&lead.tech_stack))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("inserting lead")?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_recent(&self, limit: i64, offset: i64) -> Result<Vec<Lead>> {
        let (limit, offset) = super::clamp_page(Some(limit), Some(offset));
        let rows = sqlx::query(
            "SELECT * FROM leads ORDER BY id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("listing recent leads")?;

        rows.iter().map(row_to_lead).collect()
    }
}
