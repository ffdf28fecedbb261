//! Harvested item data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A (link, title) pair extracted from a source page.
///
/// This is also the shape returned by the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    /// Absolute URL; the item's identity
    pub link: String,

    /// Headline text, possibly empty
    pub title: String,
}

impl NewsItem {
    pub fn new(link: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            title: title.into(),
        }
    }
}

/// A stored item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub link: String,
    pub title: String,

    /// Set at the first successful insert, never updated
    pub first_seen: DateTime<Utc>,
}

impl From<Item> for NewsItem {
    fn from(item: Item) -> Self {
        Self {
            link: item.link,
            title: item.title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_item_json_shape() {
        let item = NewsItem::new("https://example.com/a/1", "Title");
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"link": "https://example.com/a/1", "title": "Title"})
        );
    }

    #[test]
    fn test_item_drops_first_seen() {
        let item = Item {
            link: "https://example.com/a/1".to_string(),
            title: "Title".to_string(),
            first_seen: Utc::now(),
        };
        assert_eq!(NewsItem::from(item), NewsItem::new("https://example.com/a/1", "Title"));
    }
}
