//! Public news handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use ecevision_common::{
    db::{models::News, Repository},
    errors::{AppError, Result},
};

/// News data returned to clients
#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

impl From<News> for NewsResponse {
    fn from(news: News) -> Self {
        Self {
            id: news.id,
            title: news.title,
            content: news.content,
            created_at: news.created_at.to_rfc3339(),
        }
    }
}

/// List news, newest first
pub async fn list_news(State(state): State<AppState>) -> Result<Json<Vec<NewsResponse>>> {
    let repo = Repository::new(state.db.clone());

    let news = repo.list_news().await?;

    Ok(Json(news.into_iter().map(Into::into).collect()))
}

/// Get a single news item
pub async fn get_news(
    State(state): State<AppState>,
    Path(news_id): Path<Uuid>,
) -> Result<Json<NewsResponse>> {
    let repo = Repository::new(state.db.clone());

    let news = repo
        .find_news_by_id(news_id)
        .await?
        .ok_or_else(|| AppError::NewsNotFound {
            id: news_id.to_string(),
        })?;

    Ok(Json(news.into()))
}
