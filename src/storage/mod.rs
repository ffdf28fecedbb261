//! Storage abstractions for harvested items.
//!
//! Items are keyed by link. Inserting a link that is already stored is a
//! no-op reported as `false`, which keeps the original `first_seen` and so
//! the item's position in recency order.
//!
//! ## Table Layout
//!
//! ```text
//! news
//! ├── id          INTEGER  autoincrement, tie-breaker for equal timestamps
//! ├── link        TEXT     unique
//! ├── title       TEXT
//! └── first_seen  INTEGER  microseconds since the Unix epoch
//! ```

pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Item, NewsItem};

// Re-export for convenience
pub use sqlite::SqliteStorage;

/// Trait for item storage backends.
///
/// Implementations serialize their own writes; callers share one handle
/// across tasks without further coordination.
#[async_trait]
pub trait ItemStorage: Send + Sync {
    /// Insert an item unless its link is already stored.
    ///
    /// Returns whether a new row was created.
    async fn insert(&self, item: &NewsItem) -> Result<bool>;

    /// Items whose title contains `term`, newest first.
    ///
    /// `None` or an empty term lists every item. Matching is case-sensitive.
    async fn query(&self, term: Option<&str>) -> Result<Vec<Item>>;

    /// Number of stored items.
    async fn count(&self) -> Result<usize>;
}
