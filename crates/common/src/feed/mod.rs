//! Merged updates feed
//!
//! Combines two heterogeneous, independently-fetched sources (news rows and
//! feed-visible notifications) into one reverse-chronological stream. Each
//! input arrives sorted newest-first, so the union is a two-pointer merge
//! rather than a re-sort; equal timestamps break by id descending so output
//! is deterministic.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::{News, Notification};

/// Which source a feed item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
    News,
    Notification,
}

/// One entry in the merged feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub source: FeedSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl FeedItem {
    /// Build a feed item from a news row
    pub fn from_news(news: News) -> Self {
        Self {
            id: news.id,
            title: news.title,
            body: news.content,
            source: FeedSource::News,
            priority: None,
            created_at: news.created_at,
        }
    }

    /// Build a feed item from a notification row
    pub fn from_notification(notification: Notification) -> Self {
        Self {
            id: notification.id,
            title: notification.title,
            body: notification.description,
            source: FeedSource::Notification,
            priority: Some(notification.priority),
            created_at: notification.created_at,
        }
    }
}

/// Descending sort key: newest first, id breaks ties
fn sort_key(item: &FeedItem) -> (DateTime<FixedOffset>, Uuid) {
    (item.created_at, item.id)
}

/// Merge two newest-first sequences into the top `limit` of their union
///
/// Both inputs must already be sorted descending by (created_at, id); the
/// repository's fetch queries guarantee this.
pub fn merge_feeds(news: Vec<FeedItem>, notifications: Vec<FeedItem>, limit: usize) -> Vec<FeedItem> {
    let mut merged = Vec::with_capacity(limit.min(news.len() + notifications.len()));
    let mut a = news.into_iter().peekable();
    let mut b = notifications.into_iter().peekable();

    while merged.len() < limit {
        let take_first = match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => Some(sort_key(x) >= sort_key(y)),
            (Some(_), None) => Some(true),
            (None, Some(_)) => Some(false),
            (None, None) => None,
        };

        match take_first {
            Some(true) => {
                if let Some(item) = a.next() {
                    merged.push(item);
                }
            }
            Some(false) => {
                if let Some(item) = b.next() {
                    merged.push(item);
                }
            }
            None => break,
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(id: u128, source: FeedSource, secs: i64) -> FeedItem {
        FeedItem {
            id: Uuid::from_u128(id),
            title: format!("item {}", id),
            body: "body".to_string(),
            source,
            priority: None,
            created_at: Utc.timestamp_opt(secs, 0).unwrap().into(),
        }
    }

    #[test]
    fn test_merge_interleaves_by_timestamp() {
        // News at t=300 and t=100, notification at t=200
        let news = vec![
            item(1, FeedSource::News, 300),
            item(3, FeedSource::News, 100),
        ];
        let notifications = vec![item(2, FeedSource::Notification, 200)];

        let merged = merge_feeds(news, notifications, 10);

        let ids: Vec<u128> = merged.iter().map(|i| i.id.as_u128()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_merge_truncates_to_limit() {
        let news = vec![
            item(1, FeedSource::News, 400),
            item(2, FeedSource::News, 300),
        ];
        let notifications = vec![
            item(3, FeedSource::Notification, 350),
            item(4, FeedSource::Notification, 250),
        ];

        let merged = merge_feeds(news, notifications, 2);

        let ids: Vec<u128> = merged.iter().map(|i| i.id.as_u128()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_merge_tie_break_is_deterministic() {
        // Same timestamp: higher id wins
        let news = vec![item(5, FeedSource::News, 100)];
        let notifications = vec![item(9, FeedSource::Notification, 100)];

        let merged = merge_feeds(news.clone(), notifications.clone(), 10);
        let ids: Vec<u128> = merged.iter().map(|i| i.id.as_u128()).collect();
        assert_eq!(ids, vec![9, 5]);

        // Swapping argument order changes nothing
        let merged = merge_feeds(notifications, news, 10);
        let ids: Vec<u128> = merged.iter().map(|i| i.id.as_u128()).collect();
        assert_eq!(ids, vec![9, 5]);
    }

    #[test]
    fn test_merge_handles_empty_sources() {
        assert!(merge_feeds(Vec::new(), Vec::new(), 10).is_empty());

        let news = vec![item(1, FeedSource::News, 100)];
        let merged = merge_feeds(news, Vec::new(), 10);
        assert_eq!(merged.len(), 1);

        let notifications = vec![item(2, FeedSource::Notification, 100)];
        let merged = merge_feeds(Vec::new(), notifications, 10);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_feed_visible_types() {
        assert!(crate::FEED_NOTIFICATION_TYPES.contains(&"news"));
        assert!(crate::FEED_NOTIFICATION_TYPES.contains(&"announcement"));
        assert!(crate::FEED_NOTIFICATION_TYPES.contains(&"update"));
        assert!(!crate::FEED_NOTIFICATION_TYPES.contains(&"general"));
    }
}
