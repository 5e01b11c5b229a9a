//! Admin moderation handlers
//!
//! Every handler requires the admin role. Moderation writes that notify an
//! idea's owner commit the status change and the notification together.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use ecevision_common::{
    auth::AuthContext,
    cache::keys,
    db::{
        models::{IdeaStatus, NotificationType, Priority},
        DashboardCounts, Repository,
    },
    errors::{AppError, Result},
    metrics, FEED_NOTIFICATION_TYPES,
};

use super::feed::NotificationResponse;
use super::ideas::IdeaResponse;
use super::invalidate_updates_feed;
use super::news::NewsResponse;
use super::queries::QueryResponse;

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RecentUser {
    pub id: Uuid,
    pub full_name: String,
    pub role: String,
    pub hall_ticket_number: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct RecentItem {
    pub id: Uuid,
    pub title: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub counts: DashboardCounts,
    pub recent_users: Vec<RecentUser>,
    pub recent_ideas: Vec<RecentItem>,
    pub recent_notifications: Vec<RecentItem>,
    pub recent_news: Vec<RecentItem>,
}

/// Admin dashboard: entity counts plus the five most recent of each surface
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<DashboardResponse>> {
    auth.require_admin()?;

    let repo = Repository::new(state.db.clone());

    let counts = match state.cache {
        Some(ref cache) => {
            cache
                .get_or_load(&keys::dashboard_counts(), 30, || async {
                    repo.dashboard_counts().await
                })
                .await?
        }
        None => repo.dashboard_counts().await?,
    };

    let recent_users = repo
        .list_recent_profiles(5)
        .await?
        .into_iter()
        .map(|p| RecentUser {
            id: p.id,
            full_name: p.full_name,
            role: p.role,
            hall_ticket_number: p.hall_ticket_number,
            created_at: p.created_at.to_rfc3339(),
        })
        .collect();

    let recent_ideas = repo
        .list_recent_ideas(5)
        .await?
        .into_iter()
        .map(|i| RecentItem {
            id: i.id,
            title: i.title,
            created_at: i.created_at.to_rfc3339(),
        })
        .collect();

    let recent_notifications = repo
        .list_recent_notifications(5)
        .await?
        .into_iter()
        .map(|n| RecentItem {
            id: n.id,
            title: n.title,
            created_at: n.created_at.to_rfc3339(),
        })
        .collect();

    let recent_news = repo
        .list_recent_news(5)
        .await?
        .into_iter()
        .map(|n| RecentItem {
            id: n.id,
            title: n.title,
            created_at: n.created_at.to_rfc3339(),
        })
        .collect();

    Ok(Json(DashboardResponse {
        counts,
        recent_users,
        recent_ideas,
        recent_notifications,
        recent_news,
    }))
}

// ============================================================================
// User Management
// ============================================================================

#[derive(Debug, Serialize)]
pub struct AdminUserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub is_blocked: bool,
    pub hall_ticket_number: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    pub blocked: bool,
}

/// List every user for moderation
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<AdminUserResponse>>> {
    auth.require_admin()?;

    let repo = Repository::new(state.db.clone());

    let profiles = repo.list_profiles().await?;

    Ok(Json(
        profiles
            .into_iter()
            .map(|p| AdminUserResponse {
                id: p.id,
                email: p.email,
                full_name: p.full_name,
                role: p.role,
                is_blocked: p.is_blocked,
                hall_ticket_number: p.hall_ticket_number,
                created_at: p.created_at.to_rfc3339(),
            })
            .collect(),
    ))
}

/// Block or unblock a user
///
/// Does not revoke issued tokens; the auth middleware re-checks the flag on
/// every request.
pub async fn set_user_blocked(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<Uuid>,
    Json(request): Json<BlockRequest>,
) -> Result<StatusCode> {
    auth.require_admin()?;

    let repo = Repository::new(state.db.clone());

    repo.set_profile_blocked(user_id, request.blocked).await?;

    metrics::record_moderation(if request.blocked { "block_user" } else { "unblock_user" });

    tracing::info!(
        user_id = %user_id,
        admin_id = %auth.user_id,
        blocked = request.blocked,
        "User block flag changed"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Hard-delete a user and every row they own or authored
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode> {
    auth.require_admin()?;

    let repo = Repository::new(state.db.clone());

    repo.delete_profile(user_id).await?;

    metrics::record_moderation("delete_user");

    tracing::info!(user_id = %user_id, admin_id = %auth.user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Idea Moderation
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: IdeaStatus,
}

#[derive(Debug, Deserialize)]
pub struct FeatureRequest {
    pub featured: bool,
}

/// Transition an idea between pending and approved
///
/// Approval notifies the owner in the same transaction.
pub async fn set_idea_status(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(idea_id): Path<Uuid>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<IdeaResponse>> {
    auth.require_admin()?;

    let repo = Repository::new(state.db.clone());

    let idea = repo.set_idea_status(idea_id, request.status).await?;

    metrics::record_moderation(match request.status {
        IdeaStatus::Approved => "approve_idea",
        IdeaStatus::Pending => "deapprove_idea",
    });

    // The owner notification is feed-visible
    invalidate_updates_feed(&state).await;

    tracing::info!(
        idea_id = %idea_id,
        admin_id = %auth.user_id,
        status = %idea.status,
        "Idea status changed"
    );

    respond_with_idea(&repo, idea).await
}

/// Set or clear an idea's featured flag
///
/// Independent of status; featuring notifies the owner in the same
/// transaction.
pub async fn set_idea_featured(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(idea_id): Path<Uuid>,
    Json(request): Json<FeatureRequest>,
) -> Result<Json<IdeaResponse>> {
    auth.require_admin()?;

    let repo = Repository::new(state.db.clone());

    let idea = repo.set_idea_featured(idea_id, request.featured).await?;

    metrics::record_moderation(if request.featured { "feature_idea" } else { "unfeature_idea" });

    invalidate_updates_feed(&state).await;

    tracing::info!(
        idea_id = %idea_id,
        admin_id = %auth.user_id,
        featured = request.featured,
        "Idea featured flag changed"
    );

    respond_with_idea(&repo, idea).await
}

/// Hard-delete an idea and its dependent rows
pub async fn delete_idea(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(idea_id): Path<Uuid>,
) -> Result<StatusCode> {
    auth.require_admin()?;

    let repo = Repository::new(state.db.clone());

    repo.delete_idea(idea_id).await?;

    metrics::record_moderation("delete_idea");

    tracing::info!(idea_id = %idea_id, admin_id = %auth.user_id, "Idea deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn respond_with_idea(
    repo: &Repository,
    idea: ecevision_common::db::models::Idea,
) -> Result<Json<IdeaResponse>> {
    let author_name = repo
        .find_profile_by_id(idea.user_id)
        .await?
        .map(|p| p.full_name)
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(Json(IdeaResponse::new(idea, author_name)))
}

// ============================================================================
// Notification Dispatch
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct SendNotificationRequest {
    /// "all" for a broadcast, or a user id
    pub target: String,

    #[validate(length(min = 1, max = 300))]
    pub title: String,

    #[validate(length(min = 1, max = 2000))]
    pub description: String,

    #[serde(rename = "type")]
    pub kind: Option<NotificationType>,

    pub priority: Option<Priority>,
}

/// Notification log entry with the addressee's name resolved
#[derive(Debug, Serialize)]
pub struct NotificationLogEntry {
    #[serde(flatten)]
    pub notification: NotificationResponse,
    pub recipient_name: Option<String>,
}

/// Send a notification to one user or broadcast to everyone
///
/// A broadcast is a single row with no addressee, not a fan-out.
pub async fn send_notification(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<SendNotificationRequest>,
) -> Result<(StatusCode, Json<NotificationResponse>)> {
    auth.require_admin()?;
    request.validate()?;

    let target = if request.target == "all" {
        None
    } else {
        Some(
            Uuid::parse_str(&request.target).map_err(|_| AppError::InvalidFormat {
                message: "target must be \"all\" or a user id".to_string(),
            })?,
        )
    };

    let repo = Repository::new(state.db.clone());

    let kind = request.kind.unwrap_or(NotificationType::Announcement);
    let notification = repo
        .create_notification(
            target,
            request.title,
            request.description,
            kind,
            request.priority.unwrap_or(Priority::Low),
        )
        .await?;

    metrics::record_notification(notification.is_broadcast());

    if FEED_NOTIFICATION_TYPES.contains(&notification.kind.as_str()) {
        invalidate_updates_feed(&state).await;
    }

    tracing::info!(
        notification_id = %notification.id,
        admin_id = %auth.user_id,
        broadcast = notification.is_broadcast(),
        "Notification sent"
    );

    Ok((StatusCode::CREATED, Json(notification.into())))
}

/// The full notification log with recipient names resolved
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<NotificationLogEntry>>> {
    auth.require_admin()?;

    let repo = Repository::new(state.db.clone());

    let notifications = repo.list_all_notifications().await?;

    let profiles = repo.list_profiles().await?;
    let name_of: HashMap<Uuid, String> = profiles
        .into_iter()
        .map(|p| (p.id, p.full_name))
        .collect();

    Ok(Json(
        notifications
            .into_iter()
            .map(|n| NotificationLogEntry {
                recipient_name: n.user_id.and_then(|id| name_of.get(&id).cloned()),
                notification: n.into(),
            })
            .collect(),
    ))
}

/// Delete a notification
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(notification_id): Path<Uuid>,
) -> Result<StatusCode> {
    auth.require_admin()?;

    let repo = Repository::new(state.db.clone());

    repo.delete_notification(notification_id).await?;

    invalidate_updates_feed(&state).await;

    tracing::info!(
        notification_id = %notification_id,
        admin_id = %auth.user_id,
        "Notification deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// News Management
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct NewsRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: String,

    #[validate(length(min = 1, max = 20000))]
    pub content: String,
}

/// Publish a news item
pub async fn create_news(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<NewsRequest>,
) -> Result<(StatusCode, Json<NewsResponse>)> {
    auth.require_admin()?;
    request.validate()?;

    let repo = Repository::new(state.db.clone());

    let news = repo.create_news(request.title, request.content).await?;

    invalidate_updates_feed(&state).await;

    tracing::info!(news_id = %news.id, admin_id = %auth.user_id, "News published");

    Ok((StatusCode::CREATED, Json(news.into())))
}

/// Edit a news item
pub async fn update_news(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(news_id): Path<Uuid>,
    Json(request): Json<NewsRequest>,
) -> Result<Json<NewsResponse>> {
    auth.require_admin()?;
    request.validate()?;

    let repo = Repository::new(state.db.clone());

    let news = repo
        .update_news(news_id, request.title, request.content)
        .await?;

    invalidate_updates_feed(&state).await;

    tracing::info!(news_id = %news_id, admin_id = %auth.user_id, "News updated");

    Ok(Json(news.into()))
}

/// Delete a news item
pub async fn delete_news(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(news_id): Path<Uuid>,
) -> Result<StatusCode> {
    auth.require_admin()?;

    let repo = Repository::new(state.db.clone());

    repo.delete_news(news_id).await?;

    invalidate_updates_feed(&state).await;

    tracing::info!(news_id = %news_id, admin_id = %auth.user_id, "News deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Help Query Management
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct RespondRequest {
    #[validate(length(min = 1, max = 5000))]
    pub response: String,
}

/// Help query log entry with the requester's name resolved
#[derive(Debug, Serialize)]
pub struct QueryLogEntry {
    #[serde(flatten)]
    pub query: QueryResponse,
    pub requester_name: Option<String>,
}

/// Every help query, newest first
pub async fn list_queries(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<QueryLogEntry>>> {
    auth.require_admin()?;

    let repo = Repository::new(state.db.clone());

    let queries = repo.list_all_queries().await?;

    let profiles = repo.list_profiles().await?;
    let name_of: HashMap<Uuid, String> = profiles
        .into_iter()
        .map(|p| (p.id, p.full_name))
        .collect();

    Ok(Json(
        queries
            .into_iter()
            .map(|q| QueryLogEntry {
                requester_name: name_of.get(&q.user_id).cloned(),
                query: q.into(),
            })
            .collect(),
    ))
}

/// Record a response and resolve the query
pub async fn respond_to_query(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(query_id): Path<Uuid>,
    Json(request): Json<RespondRequest>,
) -> Result<Json<QueryResponse>> {
    auth.require_admin()?;
    request.validate()?;

    let repo = Repository::new(state.db.clone());

    let query = repo.respond_to_query(query_id, request.response).await?;

    tracing::info!(query_id = %query_id, admin_id = %auth.user_id, "Help query resolved");

    Ok(Json(query.into()))
}
