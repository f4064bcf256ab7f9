//! Visibility gate
//!
//! Anonymous visitors get a capped preview of each collection; signed-in
//! members see everything. The gate runs last, right before pagination, so
//! the capped length decides whether pagination is shown at all.

use crate::models::Identity;

/// Default preview size for anonymous visitors
pub const DEFAULT_ANONYMOUS_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityGate {
    anonymous_limit: usize,
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self::new(DEFAULT_ANONYMOUS_LIMIT)
    }
}

impl VisibilityGate {
    pub fn new(anonymous_limit: usize) -> Self {
        Self { anonymous_limit }
    }

    /// Cap for this identity, `None` when unlimited
    pub fn limit_for(&self, identity: &Identity) -> Option<usize> {
        if identity.authenticated {
            None
        } else {
            Some(self.anonymous_limit)
        }
    }

    pub fn apply<T>(&self, mut items: Vec<T>, identity: &Identity) -> Vec<T> {
        if let Some(limit) = self.limit_for(identity) {
            items.truncate(limit);
        }
        items
    }
}
