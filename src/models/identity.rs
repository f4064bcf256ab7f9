//! Caller identity
//!
//! Supplied by the session collaborator and handed to the catalog as a plain
//! value. The catalog never reads ambient session state.

use serde::{Deserialize, Serialize};

/// Who is browsing the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Whether the caller presented a valid session
    pub authenticated: bool,
    /// Audience level the user belongs to
    #[serde(default)]
    pub level_id: Option<i64>,
    /// Free-form role name ("student", "teacher", "admin", ...)
    #[serde(default)]
    pub role: Option<String>,
}

impl Identity {
    /// The identity used when no valid session is present
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated identity with an optional level
    pub fn authenticated(level_id: Option<i64>) -> Self {
        Self {
            authenticated: true,
            level_id,
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_has_nothing() {
        let identity = Identity::anonymous();
        assert!(!identity.authenticated);
        assert!(identity.level_id.is_none());
        assert!(identity.role.is_none());
    }

    #[test]
    fn test_authenticated_with_role() {
        let identity = Identity::authenticated(Some(2)).with_role("teacher");
        assert!(identity.authenticated);
        assert_eq!(identity.level_id, Some(2));
        assert_eq!(identity.role.as_deref(), Some("teacher"));
    }
}
