//! Social graph handlers: profile directory, follow edges, explore stats

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use ecevision_common::{
    auth::AuthContext,
    cache::keys,
    db::{IdeaFilter, Repository},
    errors::{AppError, Result},
    metrics,
};

use super::auth::ProfileResponse;

/// Directory entry: profile with derived activity counts
#[derive(Debug, Serialize)]
pub struct DirectoryEntry {
    pub id: Uuid,
    pub full_name: String,
    pub role: String,
    pub skills: Vec<String>,
    pub idea_count: u64,
    pub follower_count: u64,
}

/// Profile detail with derived activity counts
#[derive(Debug, Serialize)]
pub struct ProfileDetailResponse {
    #[serde(flatten)]
    pub profile: ProfileResponse,
    pub idea_count: u64,
    pub follower_count: u64,
}

/// Follow state after a connect/disconnect
#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub following: bool,
    pub followers: u64,
}

/// Request to update the caller's own profile
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,

    #[serde(default)]
    pub skills: Vec<String>,

    pub hall_ticket_number: Option<String>,

    pub mobile: Option<String>,
}

/// Aggregate stats for the explore page
#[derive(Debug, Serialize, Deserialize)]
pub struct ExploreStats {
    /// Total number of submitted ideas
    pub active_ideas: u64,

    /// Distinct users who have submitted at least one idea
    pub active_innovators: u64,

    /// Idea counts per category
    pub trending_topics: HashMap<String, u64>,
}

/// List every profile with idea and follower counts
///
/// Counts are aggregated from full table reads rather than stored
/// counters.
pub async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<DirectoryEntry>>> {
    let repo = Repository::new(state.db.clone());

    let profiles = repo.list_profiles().await?;
    let ideas = repo.list_ideas(&IdeaFilter::default()).await?;
    let connections = repo.list_connections().await?;

    let mut idea_counts: HashMap<Uuid, u64> = HashMap::new();
    for idea in &ideas {
        *idea_counts.entry(idea.user_id).or_insert(0) += 1;
    }

    let mut follower_counts: HashMap<Uuid, u64> = HashMap::new();
    for edge in &connections {
        *follower_counts.entry(edge.following_id).or_insert(0) += 1;
    }

    let entries = profiles
        .into_iter()
        .map(|profile| DirectoryEntry {
            idea_count: idea_counts.get(&profile.id).copied().unwrap_or(0),
            follower_count: follower_counts.get(&profile.id).copied().unwrap_or(0),
            id: profile.id,
            full_name: profile.full_name,
            role: profile.role,
            skills: profile.skills,
        })
        .collect();

    Ok(Json(entries))
}

/// Get a single profile with its activity counts
pub async fn get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<ProfileDetailResponse>> {
    let repo = Repository::new(state.db.clone());

    let profile = repo
        .find_profile_by_id(profile_id)
        .await?
        .ok_or_else(|| AppError::ProfileNotFound {
            id: profile_id.to_string(),
        })?;

    let idea_count = repo.list_ideas_by_user(profile_id).await?.len() as u64;
    let follower_count = repo.count_followers(profile_id).await?;

    Ok(Json(ProfileDetailResponse {
        profile: profile.into(),
        idea_count,
        follower_count,
    }))
}

/// Update the caller's own profile
pub async fn update_my_profile(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());

    let profile = repo
        .update_profile(
            auth.user_id,
            request.full_name,
            request.skills,
            request.hall_ticket_number,
            request.mobile,
        )
        .await?;

    tracing::info!(user_id = %auth.user_id, "Profile updated");

    Ok(Json(profile.into()))
}

/// Follow a profile (idempotent)
pub async fn follow(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<FollowResponse>> {
    let repo = Repository::new(state.db.clone());

    let (created, followers) = repo.connect(auth.user_id, profile_id).await?;

    if created {
        metrics::record_connection();
        tracing::info!(
            follower_id = %auth.user_id,
            following_id = %profile_id,
            "Connection created"
        );
    }

    Ok(Json(FollowResponse {
        following: true,
        followers,
    }))
}

/// Unfollow a profile
///
/// A missing edge reports NotFound and leaves counts untouched.
pub async fn unfollow(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<FollowResponse>> {
    let repo = Repository::new(state.db.clone());

    let followers = repo.disconnect(auth.user_id, profile_id).await?;

    tracing::info!(
        follower_id = %auth.user_id,
        following_id = %profile_id,
        "Connection removed"
    );

    Ok(Json(FollowResponse {
        following: false,
        followers,
    }))
}

/// Aggregate stats for the explore page, briefly cached
pub async fn explore_stats(State(state): State<AppState>) -> Result<Json<ExploreStats>> {
    let repo = Repository::new(state.db.clone());

    let load = || async {
        let ideas = repo.list_ideas(&IdeaFilter::default()).await?;

        let innovators: HashSet<Uuid> = ideas.iter().map(|idea| idea.user_id).collect();

        let mut trending_topics: HashMap<String, u64> = HashMap::new();
        for idea in &ideas {
            let category = if idea.category.is_empty() {
                "Other".to_string()
            } else {
                idea.category.clone()
            };
            *trending_topics.entry(category).or_insert(0) += 1;
        }

        Ok(ExploreStats {
            active_ideas: ideas.len() as u64,
            active_innovators: innovators.len() as u64,
            trending_topics,
        })
    };

    let stats = match state.cache {
        Some(ref cache) => cache.get_or_load(&keys::explore_stats(), 60, load).await?,
        None => load().await?,
    };

    Ok(Json(stats))
}
