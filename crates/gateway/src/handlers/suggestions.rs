//! Suggestion thread handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use ecevision_common::{
    auth::AuthContext,
    db::{Repository, SuggestionThreadEntry, ToggleOutcome},
    errors::{AppError, Result},
    metrics,
};

/// Request to post a suggestion
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSuggestionRequest {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

/// List an idea's suggestion thread, most recent first
pub async fn list_suggestions(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(idea_id): Path<Uuid>,
) -> Result<Json<Vec<SuggestionThreadEntry>>> {
    let repo = Repository::new(state.db.clone());

    repo.find_idea_by_id(idea_id)
        .await?
        .ok_or_else(|| AppError::IdeaNotFound {
            id: idea_id.to_string(),
        })?;

    let thread = repo
        .list_suggestion_thread(idea_id, Some(auth.user_id))
        .await?;

    Ok(Json(thread))
}

/// Post a suggestion on an idea
///
/// The idea's owner is rejected with Forbidden and no row is created.
pub async fn create_suggestion(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(idea_id): Path<Uuid>,
    Json(request): Json<CreateSuggestionRequest>,
) -> Result<(StatusCode, Json<SuggestionThreadEntry>)> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());

    let suggestion = repo
        .create_suggestion(idea_id, auth.user_id, request.content)
        .await?;

    metrics::record_suggestion();

    tracing::info!(
        suggestion_id = %suggestion.id,
        idea_id = %idea_id,
        user_id = %auth.user_id,
        "Suggestion posted"
    );

    let author_name = repo
        .find_profile_by_id(auth.user_id)
        .await?
        .map(|p| p.full_name)
        .unwrap_or_else(|| "Unknown".to_string());

    Ok((
        StatusCode::CREATED,
        Json(SuggestionThreadEntry {
            suggestion,
            author_name,
            upvotes: 0,
            upvoter_names: Vec::new(),
            upvoted_by_caller: false,
        }),
    ))
}

/// Toggle the caller's upvote on a suggestion
pub async fn toggle_suggestion_upvote(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(suggestion_id): Path<Uuid>,
) -> Result<Json<ToggleOutcome>> {
    let repo = Repository::new(state.db.clone());

    let outcome = repo
        .toggle_suggestion_upvote(suggestion_id, auth.user_id)
        .await?;

    tracing::info!(
        suggestion_id = %suggestion_id,
        user_id = %auth.user_id,
        upvoted = outcome.upvoted,
        "Suggestion upvote toggled"
    );

    Ok(Json(outcome))
}
