//! Merged updates feed and personal notifications

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

use crate::AppState;
use ecevision_common::{
    auth::AuthContext,
    cache::keys,
    db::{models::Notification, Repository},
    errors::Result,
    feed::{merge_feeds, FeedItem},
    metrics, DEFAULT_FEED_LIMIT,
};

/// How many rows to pull from each source before merging; the cache holds
/// the merged result at this depth and requests slice it down
const FEED_FETCH_DEPTH: u64 = 100;

/// Query parameters for the updates feed
#[derive(Debug, Default, Deserialize)]
pub struct FeedParams {
    pub limit: Option<usize>,
}

/// Notification data returned to clients
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub priority: String,
    pub broadcast: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            broadcast: notification.is_broadcast(),
            title: notification.title,
            description: notification.description,
            kind: notification.kind,
            priority: notification.priority,
            created_at: notification.created_at.to_rfc3339(),
        }
    }
}

/// Load the merged feed from both sources at full depth
async fn load_feed(repo: &Repository) -> Result<Vec<FeedItem>> {
    let news = repo.list_recent_news(FEED_FETCH_DEPTH).await?;
    let notifications = repo
        .list_recent_feed_notifications(FEED_FETCH_DEPTH)
        .await?;

    let news_items: Vec<FeedItem> = news.into_iter().map(FeedItem::from_news).collect();
    let notification_items: Vec<FeedItem> = notifications
        .into_iter()
        .map(FeedItem::from_notification)
        .collect();

    Ok(merge_feeds(
        news_items,
        notification_items,
        FEED_FETCH_DEPTH as usize,
    ))
}

/// The public updates feed: news merged with feed-visible notifications,
/// newest first
pub async fn updates_feed(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> Result<Json<Vec<FeedItem>>> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_FEED_LIMIT)
        .min(FEED_FETCH_DEPTH as usize);

    let start = Instant::now();
    let repo = Repository::new(state.db.clone());

    let mut items = match state.cache {
        Some(ref cache) => {
            match cache.get::<Vec<FeedItem>>(&keys::updates_feed()).await {
                Ok(Some(cached)) => {
                    metrics::record_cache(true, "feed");
                    cached
                }
                Ok(None) => {
                    metrics::record_cache(false, "feed");
                    let loaded = load_feed(&repo).await?;
                    if let Err(e) = cache.set(&keys::updates_feed(), &loaded).await {
                        tracing::warn!(error = %e, "Failed to cache feed");
                    }
                    loaded
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Feed cache read failed, loading from source");
                    load_feed(&repo).await?
                }
            }
        }
        None => load_feed(&repo).await?,
    };

    items.truncate(limit);

    metrics::record_feed(start.elapsed().as_secs_f64(), items.len());

    Ok(Json(items))
}

/// The caller's notifications: rows addressed to them plus broadcasts
pub async fn my_notifications(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<NotificationResponse>>> {
    let repo = Repository::new(state.db.clone());

    let notifications = repo.list_notifications_for_user(auth.user_id).await?;

    Ok(Json(
        notifications.into_iter().map(Into::into).collect(),
    ))
}
