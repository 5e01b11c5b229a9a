//! Help query (support ticket) handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use ecevision_common::{
    auth::AuthContext,
    db::{models::HelpQuery, Repository},
    errors::Result,
};

/// Request to open a help query
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQueryRequest {
    #[validate(length(min = 1, max = 300))]
    pub subject: String,

    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

/// Help query data returned to clients
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub id: Uuid,
    pub subject: String,
    pub message: String,
    pub status: String,
    pub admin_response: Option<String>,
    pub created_at: String,
}

impl From<HelpQuery> for QueryResponse {
    fn from(query: HelpQuery) -> Self {
        Self {
            id: query.id,
            subject: query.subject,
            message: query.message,
            status: query.status,
            admin_response: query.admin_response,
            created_at: query.created_at.to_rfc3339(),
        }
    }
}

/// Open a help query with status=open
pub async fn create_query(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateQueryRequest>,
) -> Result<(StatusCode, Json<QueryResponse>)> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());

    let query = repo
        .create_query(auth.user_id, request.subject, request.message)
        .await?;

    tracing::info!(query_id = %query.id, user_id = %auth.user_id, "Help query opened");

    Ok((StatusCode::CREATED, Json(query.into())))
}

/// List the caller's own help queries, newest first
pub async fn my_queries(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<QueryResponse>>> {
    let repo = Repository::new(state.db.clone());

    let queries = repo.list_queries_for_user(auth.user_id).await?;

    Ok(Json(queries.into_iter().map(Into::into).collect()))
}
