//! Identity service
//!
//! Turns a session token into the `Identity` the catalog browses with.
//! Missing, unknown and expired tokens all mean anonymous; so does a failing
//! session store, which is logged and never surfaced to the caller.

use anyhow::Context;
use chrono::Duration;
use std::sync::Arc;

use crate::db::repositories::SessionRepository;
use crate::models::{Identity, Member, Session};

/// Default session lifetime in days
const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

pub struct IdentityService {
    repo: Arc<dyn SessionRepository>,
    session_ttl: Duration,
}

impl IdentityService {
    pub fn new(repo: Arc<dyn SessionRepository>) -> Self {
        Self {
            repo,
            session_ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
        }
    }

    pub fn with_session_ttl(mut self, session_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self
    }

    pub async fn resolve(&self, token: Option<&str>) -> Identity {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Identity::anonymous();
        };

        match self.repo.find_identity(token).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                tracing::debug!("Session token not recognised, browsing anonymously");
                Identity::anonymous()
            }
            Err(e) => {
                tracing::warn!("Session lookup failed, browsing anonymously: {:#}", e);
                Identity::anonymous()
            }
        }
    }

    /// Register a member; used for seeding and tests
    pub async fn register_member(
        &self,
        username: &str,
        level_id: Option<i64>,
        role: Option<&str>,
    ) -> anyhow::Result<Member> {
        self.repo
            .create_member(username, level_id, role)
            .await
            .with_context(|| format!("Failed to register member {}", username))
    }

    pub async fn issue_session(&self, member_id: i64) -> anyhow::Result<Session> {
        self.repo
            .create(member_id, self.session_ttl)
            .await
            .with_context(|| format!("Failed to issue session for member {}", member_id))
    }
}
