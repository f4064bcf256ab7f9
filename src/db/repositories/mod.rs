//! Database repositories
//!
//! Each repository is an async trait with a SQLx implementation covering
//! both SQLite and MySQL.

pub mod content;
pub mod directory;
pub mod session;

pub use content::{ContentRepository, SqlxContentRepository};
pub use directory::{DirectoryRepository, SqlxDirectoryRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
