//! Services layer
//!
//! Services sit between the repositories and the HTTP API:
//! - Coordinating repositories and the cache
//! - Feeding the catalog engine through `ContentSource`
//! - Handling validation and error cases

pub mod catalog;
pub mod content;
pub mod directory;
pub mod identity;

pub use catalog::CatalogService;
pub use content::{ContentService, ContentServiceError};
pub use directory::{DirectoryNames, DirectoryService, DirectoryServiceError};
pub use identity::IdentityService;
