//! Session and member models
//!
//! Sessions are issued by the external login collaborator; this crate only
//! reads them to derive an `Identity`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Identity;

/// Registered member of the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Audience level the member is enrolled in
    pub level_id: Option<i64>,
    /// Role name
    pub role: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Identity this member browses with
    pub fn identity(&self) -> Identity {
        Identity {
            authenticated: true,
            level_id: self.level_id,
            role: self.role.clone(),
        }
    }
}

/// Session entity for an authenticated member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session ID (token)
    pub id: String,
    /// Associated member ID
    pub member_id: i64,
    /// Expiration timestamp
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}
