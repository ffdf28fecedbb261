//! Search service over the item store.

use std::sync::Arc;

use crate::error::Result;
use crate::models::NewsItem;
use crate::storage::ItemStorage;

/// Read-through query surface for the search endpoint.
#[derive(Clone)]
pub struct QueryService {
    storage: Arc<dyn ItemStorage>,
}

impl QueryService {
    pub fn new(storage: Arc<dyn ItemStorage>) -> Self {
        Self { storage }
    }

    /// Items matching `term` in store order, newest first.
    pub async fn handle(&self, term: Option<&str>) -> Result<Vec<NewsItem>> {
        let items = self.storage.query(term).await?;
        log::debug!("Search {:?} returned {} items", term, items.len());
        Ok(items.into_iter().map(NewsItem::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;
    use chrono::DateTime;

    #[tokio::test]
    async fn test_handle_preserves_store_order() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        for (i, title) in ["older story", "newer story", "unrelated"].iter().enumerate() {
            let first_seen = DateTime::from_timestamp(100 + i as i64, 0).unwrap();
            storage
                .insert_at(&NewsItem::new(format!("https://e.com/{i}"), *title), first_seen)
                .await
                .unwrap();
        }
        let service = QueryService::new(Arc::new(storage));

        let found = service.handle(Some("story")).await.unwrap();
        assert_eq!(
            found,
            vec![
                NewsItem::new("https://e.com/1", "newer story"),
                NewsItem::new("https://e.com/0", "older story"),
            ]
        );

        let all = service.handle(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].link, "https://e.com/2");
    }
}
