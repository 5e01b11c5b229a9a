//! Idea handlers: listing, submission, editing, upvoting

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use ecevision_common::{
    auth::AuthContext,
    db::{models::Idea, IdeaFilter, Repository, UpvoteOutcome},
    errors::{AppError, Result},
    metrics,
};

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^https?://").expect("valid link pattern"))
}

/// Reject any link that is not an http(s) URL
fn validate_links(links: &[String]) -> Result<()> {
    for link in links {
        if !link_pattern().is_match(link) {
            return Err(AppError::InvalidFormat {
                message: format!("Link must start with http:// or https://: {}", link),
            });
        }
    }
    Ok(())
}

/// Query parameters for idea listings
#[derive(Debug, Default, Deserialize)]
pub struct ListIdeasParams {
    /// Free-text search across title, description, and skills
    pub q: Option<String>,

    /// Category name, or a skill to match against
    pub category: Option<String>,

    #[serde(default)]
    pub featured: bool,

    #[serde(default)]
    pub approved: bool,
}

impl From<ListIdeasParams> for IdeaFilter {
    fn from(params: ListIdeasParams) -> Self {
        IdeaFilter {
            search: params.q,
            category: params.category,
            featured_only: params.featured,
            approved_only: params.approved,
        }
    }
}

/// Request to submit a new idea
#[derive(Debug, Deserialize, Validate)]
pub struct CreateIdeaRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: String,

    #[validate(length(min = 1, max = 10000))]
    pub description: String,

    #[validate(length(min = 1, max = 100))]
    pub category: String,

    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default)]
    pub links: Vec<String>,
}

/// Request to edit an idea in place; every field is overwritten
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateIdeaRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: String,

    #[validate(length(min = 1, max = 10000))]
    pub description: String,

    #[validate(length(min = 1, max = 100))]
    pub category: String,

    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default)]
    pub links: Vec<String>,
}

/// Idea data returned to clients
#[derive(Debug, Serialize)]
pub struct IdeaResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_name: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub skills: Vec<String>,
    pub links: Vec<String>,
    pub status: String,
    pub is_featured: bool,
    pub upvotes: i32,
    pub views: i32,
    pub created_at: String,
}

impl IdeaResponse {
    pub(crate) fn new(idea: Idea, author_name: String) -> Self {
        Self {
            id: idea.id,
            user_id: idea.user_id,
            author_name,
            title: idea.title,
            description: idea.description,
            category: idea.category,
            skills: idea.skills,
            links: idea.links,
            status: idea.status,
            is_featured: idea.is_featured,
            upvotes: idea.upvotes,
            views: idea.views,
            created_at: idea.created_at.to_rfc3339(),
        }
    }
}

/// List ideas passing the filter, newest first
///
/// Author names are resolved by a second profile scan rather than a join.
pub async fn list_ideas(
    State(state): State<AppState>,
    Query(params): Query<ListIdeasParams>,
) -> Result<Json<Vec<IdeaResponse>>> {
    let repo = Repository::new(state.db.clone());

    let filter = IdeaFilter::from(params);
    let ideas = repo.list_ideas(&filter).await?;

    let profiles = repo.list_profiles().await?;
    let name_of: HashMap<Uuid, String> = profiles
        .into_iter()
        .map(|p| (p.id, p.full_name))
        .collect();

    let response = ideas
        .into_iter()
        .map(|idea| {
            let author = name_of
                .get(&idea.user_id)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string());
            IdeaResponse::new(idea, author)
        })
        .collect();

    Ok(Json(response))
}

/// Submit a new idea; enters moderation as pending
pub async fn create_idea(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateIdeaRequest>,
) -> Result<(StatusCode, Json<IdeaResponse>)> {
    request.validate()?;
    validate_links(&request.links)?;

    let repo = Repository::new(state.db.clone());

    let idea = repo
        .create_idea(
            auth.user_id,
            request.title,
            request.description,
            request.category,
            request.skills,
            request.links,
        )
        .await?;

    metrics::record_idea_submitted(&idea.category);

    tracing::info!(
        idea_id = %idea.id,
        user_id = %auth.user_id,
        title = %idea.title,
        "Idea submitted"
    );

    let author_name = repo
        .find_profile_by_id(auth.user_id)
        .await?
        .map(|p| p.full_name)
        .unwrap_or_else(|| "Unknown".to_string());

    Ok((StatusCode::CREATED, Json(IdeaResponse::new(idea, author_name))))
}

/// Get a single idea with its author's display name
pub async fn get_idea(
    State(state): State<AppState>,
    Path(idea_id): Path<Uuid>,
) -> Result<Json<IdeaResponse>> {
    let repo = Repository::new(state.db.clone());

    let idea = repo
        .find_idea_by_id(idea_id)
        .await?
        .ok_or_else(|| AppError::IdeaNotFound {
            id: idea_id.to_string(),
        })?;

    let author_name = repo
        .find_profile_by_id(idea.user_id)
        .await?
        .map(|p| p.full_name)
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(Json(IdeaResponse::new(idea, author_name)))
}

/// Edit an idea in place
///
/// Owner only; the moderation status is left untouched.
pub async fn update_idea(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(idea_id): Path<Uuid>,
    Json(request): Json<UpdateIdeaRequest>,
) -> Result<Json<IdeaResponse>> {
    request.validate()?;
    validate_links(&request.links)?;

    let repo = Repository::new(state.db.clone());

    let idea = repo
        .find_idea_by_id(idea_id)
        .await?
        .ok_or_else(|| AppError::IdeaNotFound {
            id: idea_id.to_string(),
        })?;

    auth.require_user(idea.user_id)?;

    let updated = repo
        .update_idea(
            idea_id,
            request.title,
            request.description,
            request.category,
            request.skills,
            request.links,
        )
        .await?;

    tracing::info!(idea_id = %idea_id, user_id = %auth.user_id, "Idea updated");

    let author_name = repo
        .find_profile_by_id(updated.user_id)
        .await?
        .map(|p| p.full_name)
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(Json(IdeaResponse::new(updated, author_name)))
}

/// Upvote an idea (idempotent add)
///
/// Repeat calls while already upvoted are no-ops returning the unchanged
/// count.
pub async fn upvote_idea(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(idea_id): Path<Uuid>,
) -> Result<Json<UpvoteOutcome>> {
    let repo = Repository::new(state.db.clone());

    let outcome = repo.upvote_idea(idea_id, auth.user_id).await?;

    if outcome.applied {
        metrics::record_idea_upvote();
        tracing::info!(idea_id = %idea_id, user_id = %auth.user_id, "Idea upvoted");
    }

    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_links() {
        assert!(validate_links(&[]).is_ok());
        assert!(validate_links(&["https://example.com".to_string()]).is_ok());
        assert!(validate_links(&["http://example.com".to_string()]).is_ok());
        assert!(validate_links(&["ftp://example.com".to_string()]).is_err());
        assert!(validate_links(&["example.com".to_string()]).is_err());
    }

    #[test]
    fn test_filter_from_params() {
        let filter = IdeaFilter::from(ListIdeasParams {
            q: Some("mesh".to_string()),
            category: Some("Technology".to_string()),
            featured: true,
            approved: false,
        });

        assert_eq!(filter.search.as_deref(), Some("mesh"));
        assert_eq!(filter.category.as_deref(), Some("Technology"));
        assert!(filter.featured_only);
        assert!(!filter.approved_only);
    }
}
