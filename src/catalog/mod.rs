//! Catalog engine
//!
//! Pure, synchronous building blocks shared by the courses, news and
//! materials listings:
//! - `slug`: title/id codec and slug resolution
//! - `filter`: fetch shape, category and search predicates, ordering profiles
//! - `highlight`: featured subset with recency fallback
//! - `gate`: anonymous preview cap
//! - `pagination`: fixed-size slicing
//! - `listing`: generation-guarded listing state machine and its async driver

mod error;
pub mod filter;
pub mod gate;
pub mod highlight;
pub mod listing;
pub mod pagination;
pub mod slug;
pub mod text;

pub use error::CatalogError;
pub use filter::{FetchRequest, ListingProfile, SortOrder};
pub use gate::VisibilityGate;
pub use highlight::select_highlights;
pub use listing::{
    Applied, CatalogSnapshot, ContentSource, FetchTicket, Listing, ListingController,
    ListingState, ListingView,
};
pub use pagination::Paginator;
pub use slug::{clean_slug, decode_id, encode_slug, SlugInput};
