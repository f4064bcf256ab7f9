//! Session repository
//!
//! Read access to sessions issued by the login collaborator, plus the
//! inserts needed to seed members and sessions.
//!
//! This module provides:
//! - `SessionRepository` trait defining the interface for session data access
//! - `SqlxSessionRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Identity, Member, Session};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Identity behind a session token; `None` for unknown or expired tokens
    async fn find_identity(&self, token: &str) -> Result<Option<Identity>>;

    /// Issue a new session for a member
    async fn create(&self, member_id: i64, ttl: Duration) -> Result<Session>;

    async fn create_member(&self, username: &str, level_id: Option<i64>, role: Option<&str>) -> Result<Member>;
}

/// SQLx-based session repository implementation
pub struct SqlxSessionRepository {
    pool: DynDatabasePool,
}

impl SqlxSessionRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

/// Session joined with its member
struct SessionRow {
    expires_at: DateTime<Utc>,
    level_id: Option<i64>,
    role: Option<String>,
}

impl SessionRow {
    fn into_identity(self) -> Option<Identity> {
        if self.expires_at <= Utc::now() {
            return None;
        }
        Some(Identity {
            authenticated: true,
            level_id: self.level_id,
            role: self.role,
        })
    }
}

const FIND_SESSION: &str = r#"
    SELECT s.expires_at, m.level_id, m.role
    FROM sessions s
    JOIN members m ON m.id = s.member_id
    WHERE s.id = ?
"#;

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn find_identity(&self, token: &str) -> Result<Option<Identity>> {
        let row = match self.pool.driver() {
            DatabaseDriver::Sqlite => find_session_sqlite(self.pool.sqlite()?, token).await?,
            DatabaseDriver::Mysql => find_session_mysql(self.pool.mysql()?, token).await?,
        };
        Ok(row.and_then(SessionRow::into_identity))
    }

    async fn create(&self, member_id: i64, ttl: Duration) -> Result<Session> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().simple().to_string(),
            member_id,
            expires_at: now + ttl,
            created_at: now,
        };

        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_session_sqlite(self.pool.sqlite()?, &session).await?,
            DatabaseDriver::Mysql => create_session_mysql(self.pool.mysql()?, &session).await?,
        }

        Ok(session)
    }

    async fn create_member(&self, username: &str, level_id: Option<i64>, role: Option<&str>) -> Result<Member> {
        let created_at = Utc::now();
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_member_sqlite(self.pool.sqlite()?, username, level_id, role, created_at).await?
            }
            DatabaseDriver::Mysql => {
                create_member_mysql(self.pool.mysql()?, username, level_id, role, created_at).await?
            }
        };

        Ok(Member {
            id,
            username: username.to_string(),
            level_id,
            role: role.map(str::to_string),
            created_at,
        })
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn find_session_sqlite(pool: &SqlitePool, token: &str) -> Result<Option<SessionRow>> {
    let row = sqlx::query(FIND_SESSION)
        .bind(token)
        .fetch_optional(pool)
        .await
        .context("Failed to look up session")?;

    match row {
        Some(row) => Ok(Some(SessionRow {
            expires_at: row.try_get("expires_at")?,
            level_id: row.try_get("level_id")?,
            role: row.try_get("role")?,
        })),
        None => Ok(None),
    }
}

async fn create_session_sqlite(pool: &SqlitePool, session: &Session) -> Result<()> {
    sqlx::query("INSERT INTO sessions (id, member_id, expires_at, created_at) VALUES (?, ?, ?, ?)")
        .bind(&session.id)
        .bind(session.member_id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(pool)
        .await
        .context("Failed to create session")?;

    Ok(())
}

async fn create_member_sqlite(
    pool: &SqlitePool,
    username: &str,
    level_id: Option<i64>,
    role: Option<&str>,
    created_at: DateTime<Utc>,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO members (username, level_id, role, created_at) VALUES (?, ?, ?, ?)")
        .bind(username)
        .bind(level_id)
        .bind(role)
        .bind(created_at)
        .execute(pool)
        .await
        .context("Failed to create member")?;

    Ok(result.last_insert_rowid())
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn find_session_mysql(pool: &MySqlPool, token: &str) -> Result<Option<SessionRow>> {
    let row = sqlx::query(FIND_SESSION)
        .bind(token)
        .fetch_optional(pool)
        .await
        .context("Failed to look up session")?;

    match row {
        Some(row) => Ok(Some(SessionRow {
            expires_at: row.try_get("expires_at")?,
            level_id: row.try_get("level_id")?,
            role: row.try_get("role")?,
        })),
        None => Ok(None),
    }
}

async fn create_session_mysql(pool: &MySqlPool, session: &Session) -> Result<()> {
    sqlx::query("INSERT INTO sessions (id, member_id, expires_at, created_at) VALUES (?, ?, ?, ?)")
        .bind(&session.id)
        .bind(session.member_id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(pool)
        .await
        .context("Failed to create session")?;

    Ok(())
}

async fn create_member_mysql(
    pool: &MySqlPool,
    username: &str,
    level_id: Option<i64>,
    role: Option<&str>,
    created_at: DateTime<Utc>,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO members (username, level_id, role, created_at) VALUES (?, ?, ?, ?)")
        .bind(username)
        .bind(level_id)
        .bind(role)
        .bind(created_at)
        .execute(pool)
        .await
        .context("Failed to create member")?;

    Ok(result.last_insert_id() as i64)
}
