//! Achievement handlers

use axum::{extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use ecevision_common::{
    auth::AuthContext,
    db::{models::Achievement, Repository},
    errors::Result,
};

/// Achievement data returned to clients
#[derive(Debug, Serialize)]
pub struct AchievementResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub badge_type: String,
    pub awarded_at: String,
}

impl From<Achievement> for AchievementResponse {
    fn from(achievement: Achievement) -> Self {
        Self {
            id: achievement.id,
            title: achievement.title,
            description: achievement.description,
            badge_type: achievement.badge_type,
            awarded_at: achievement.awarded_at.to_rfc3339(),
        }
    }
}

/// List the caller's achievements, most recent first
pub async fn my_achievements(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<AchievementResponse>>> {
    let repo = Repository::new(state.db.clone());

    let achievements = repo.list_achievements_for_user(auth.user_id).await?;

    Ok(Json(achievements.into_iter().map(Into::into).collect()))
}
