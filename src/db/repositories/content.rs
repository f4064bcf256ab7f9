//! Content repository
//!
//! Database access for courses, news and materials, which share the
//! `content_items` table and are told apart by `domain`.
//!
//! Collections come back in repository order (ascending id) and in every
//! publish state; eligibility is decided by the catalog engine.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{ContentDomain, ContentItem, CreateContentInput, PublishState};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Content repository trait
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Every item of a domain
    async fn list_all(&self, domain: ContentDomain) -> Result<Vec<ContentItem>>;

    /// Items of a domain targeted at one audience level
    async fn list_by_level(&self, domain: ContentDomain, level_id: i64) -> Result<Vec<ContentItem>>;

    async fn get_by_id(&self, domain: ContentDomain, id: i64) -> Result<Option<ContentItem>>;

    async fn create(&self, input: &CreateContentInput) -> Result<ContentItem>;
}

/// SQLx-based content repository for SQLite and MySQL
pub struct SqlxContentRepository {
    pool: DynDatabasePool,
}

impl SqlxContentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ContentRepository> {
        Arc::new(Self::new(pool))
    }
}

const SELECT_COLUMNS: &str = "SELECT id, domain, title, description, category_id, level_id, state, \
     published_at, featured, price FROM content_items";

/// Optional extra predicate on top of the domain
#[derive(Clone, Copy)]
enum Scope {
    All,
    Level(i64),
}

impl Scope {
    fn sql(&self) -> String {
        let predicate = match self {
            Scope::All => "",
            Scope::Level(_) => " AND level_id = ?",
        };
        format!("{} WHERE domain = ?{} ORDER BY id", SELECT_COLUMNS, predicate)
    }

    fn value(&self) -> Option<i64> {
        match self {
            Scope::All => None,
            Scope::Level(id) => Some(*id),
        }
    }
}

impl SqlxContentRepository {
    async fn list(&self, domain: ContentDomain, scope: Scope) -> Result<Vec<ContentItem>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.sqlite()?, domain, scope).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.mysql()?, domain, scope).await,
        }
    }
}

#[async_trait]
impl ContentRepository for SqlxContentRepository {
    async fn list_all(&self, domain: ContentDomain) -> Result<Vec<ContentItem>> {
        self.list(domain, Scope::All).await
    }

    async fn list_by_level(&self, domain: ContentDomain, level_id: i64) -> Result<Vec<ContentItem>> {
        self.list(domain, Scope::Level(level_id)).await
    }

    async fn get_by_id(&self, domain: ContentDomain, id: i64) -> Result<Option<ContentItem>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.sqlite()?, domain, id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.mysql()?, domain, id).await,
        }
    }

    async fn create(&self, input: &CreateContentInput) -> Result<ContentItem> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.sqlite()?, input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.mysql()?, input).await,
        }
    }
}

fn parse_domain(raw: &str) -> Result<ContentDomain> {
    ContentDomain::from_str(raw).with_context(|| format!("Unknown content domain '{}'", raw))
}

/// Unrecognised states keep the row but make it ineligible
fn parse_state(id: i64, raw: &str) -> PublishState {
    let state = PublishState::from_stored(raw);
    if state == PublishState::Unknown {
        tracing::warn!("Content item {} has unknown publish state '{}', treating as unpublished", id, raw);
    }
    state
}

/// Item a freshly inserted row stands for
fn created_item(id: i64, input: &CreateContentInput, date: DateTime<Utc>) -> ContentItem {
    ContentItem {
        id,
        domain: input.domain,
        title: input.title.clone(),
        description: input.description.clone(),
        category_id: input.category_id,
        level_id: input.level_id,
        state: input.state.unwrap_or_default(),
        date,
        featured: input.featured,
        price: input.price,
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn list_sqlite(pool: &SqlitePool, domain: ContentDomain, scope: Scope) -> Result<Vec<ContentItem>> {
    let sql = scope.sql();
    let mut query = sqlx::query(&sql).bind(domain.as_str());
    if let Some(value) = scope.value() {
        query = query.bind(value);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .with_context(|| format!("Failed to list {} content", domain))?;

    rows.iter().map(row_to_item_sqlite).collect()
}

async fn get_by_id_sqlite(pool: &SqlitePool, domain: ContentDomain, id: i64) -> Result<Option<ContentItem>> {
    let sql = format!("{} WHERE domain = ? AND id = ?", SELECT_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(domain.as_str())
        .bind(id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to get {} item {}", domain, id))?;

    row.as_ref().map(row_to_item_sqlite).transpose()
}

async fn create_sqlite(pool: &SqlitePool, input: &CreateContentInput) -> Result<ContentItem> {
    let date = input.date.unwrap_or_else(Utc::now);
    let result = sqlx::query(
        r#"
        INSERT INTO content_items
            (domain, title, description, category_id, level_id, state, published_at, featured, price, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.domain.as_str())
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.category_id)
    .bind(input.level_id)
    .bind(input.state.unwrap_or_default().as_str())
    .bind(date)
    .bind(input.featured)
    .bind(input.price)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to create content item")?;

    Ok(created_item(result.last_insert_rowid(), input, date))
}

fn row_to_item_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<ContentItem> {
    let id: i64 = row.try_get("id")?;
    let domain: String = row.try_get("domain")?;
    let state: String = row.try_get("state")?;

    Ok(ContentItem {
        id,
        domain: parse_domain(&domain)?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category_id: row.try_get("category_id")?,
        level_id: row.try_get("level_id")?,
        state: parse_state(id, &state),
        date: row.try_get("published_at")?,
        featured: row.try_get("featured")?,
        price: row.try_get("price")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn list_mysql(pool: &MySqlPool, domain: ContentDomain, scope: Scope) -> Result<Vec<ContentItem>> {
    let sql = scope.sql();
    let mut query = sqlx::query(&sql).bind(domain.as_str());
    if let Some(value) = scope.value() {
        query = query.bind(value);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .with_context(|| format!("Failed to list {} content", domain))?;

    rows.iter().map(row_to_item_mysql).collect()
}

async fn get_by_id_mysql(pool: &MySqlPool, domain: ContentDomain, id: i64) -> Result<Option<ContentItem>> {
    let sql = format!("{} WHERE domain = ? AND id = ?", SELECT_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(domain.as_str())
        .bind(id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to get {} item {}", domain, id))?;

    row.as_ref().map(row_to_item_mysql).transpose()
}

async fn create_mysql(pool: &MySqlPool, input: &CreateContentInput) -> Result<ContentItem> {
    let date = input.date.unwrap_or_else(Utc::now);
    let result = sqlx::query(
        r#"
        INSERT INTO content_items
            (domain, title, description, category_id, level_id, state, published_at, featured, price, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.domain.as_str())
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.category_id)
    .bind(input.level_id)
    .bind(input.state.unwrap_or_default().as_str())
    .bind(date)
    .bind(input.featured)
    .bind(input.price)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to create content item")?;

    Ok(created_item(result.last_insert_id() as i64, input, date))
}

fn row_to_item_mysql(row: &sqlx::mysql::MySqlRow) -> Result<ContentItem> {
    let id: i64 = row.try_get("id")?;
    let domain: String = row.try_get("domain")?;
    let state: String = row.try_get("state")?;

    Ok(ContentItem {
        id,
        domain: parse_domain(&domain)?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category_id: row.try_get("category_id")?,
        level_id: row.try_get("level_id")?,
        state: parse_state(id, &state),
        date: row.try_get("published_at")?,
        featured: row.try_get("featured")?,
        price: row.try_get("price")?,
    })
}
