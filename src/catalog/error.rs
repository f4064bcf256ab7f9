//! Catalog error taxonomy

/// Errors produced by the catalog engine and its collaborators
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Slug or id resolves to no eligible item
    #[error("Content not found: {0}")]
    NotFound(String),

    /// Criteria reference a category absent from the directory.
    ///
    /// The filter pipeline turns this into an empty result; it never reaches callers.
    #[error("Invalid criteria: {0}")]
    InvalidCriteria(String),

    /// Transport, query or decode failure in the repository collaborator
    #[error("Repository error: {0}")]
    Repository(#[from] anyhow::Error),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}
