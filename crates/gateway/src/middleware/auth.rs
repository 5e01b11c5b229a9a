//! Authentication middleware
//!
//! Validates the bearer token, loads the caller's profile, rejects blocked
//! accounts, and injects an AuthContext for handlers to extract. Loading the
//! profile on every request means a block or role change takes effect
//! immediately, without session revocation machinery.

use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use ecevision_common::{
    auth::{extract_bearer_token, AuthContext},
    db::Repository,
    errors::AppError,
};
use uuid::Uuid;

use crate::AppState;

/// Require a valid, non-blocked authenticated user
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized {
            message: "Missing Authorization header".to_string(),
        })?;

    let token = extract_bearer_token(auth_header).ok_or_else(|| AppError::Unauthorized {
        message: "Expected bearer token".to_string(),
    })?;

    let claims = state.jwt.validate_token(token)?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized {
        message: "Invalid token subject".to_string(),
    })?;

    let repo = Repository::new(state.db.clone());
    let profile = repo
        .find_profile_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized {
            message: "Unknown user".to_string(),
        })?;

    if profile.is_blocked {
        return Err(AppError::AccountBlocked);
    }

    let context = AuthContext {
        user_id,
        role: profile.user_role(),
        request_id,
    };

    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}
