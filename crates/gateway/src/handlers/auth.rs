//! Authentication handlers: registration, login, password reset

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use ecevision_common::{
    auth::{
        generate_reset_token, hash_password, hash_reset_token, verify_password,
    },
    db::Repository,
    errors::{AppError, Result},
};

/// Request to register a new account
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 200))]
    pub full_name: String,

    #[serde(default)]
    pub skills: Vec<String>,

    pub hall_ticket_number: Option<String>,

    pub mobile: Option<String>,
}

/// Request to sign in
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Request to start a password reset
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email)]
    pub email: String,
}

/// Request to complete a password reset
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetConfirm {
    #[validate(length(min = 1))]
    pub token: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// Profile data returned to clients
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub skills: Vec<String>,
    pub hall_ticket_number: Option<String>,
    pub mobile: Option<String>,
    pub is_blocked: bool,
    pub created_at: String,
}

impl From<ecevision_common::db::models::Profile> for ProfileResponse {
    fn from(profile: ecevision_common::db::models::Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            full_name: profile.full_name,
            role: profile.role,
            skills: profile.skills,
            hall_ticket_number: profile.hall_ticket_number,
            mobile: profile.mobile,
            is_blocked: profile.is_blocked,
            created_at: profile.created_at.to_rfc3339(),
        }
    }
}

/// Successful authentication response
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub profile: ProfileResponse,
}

/// Register a new account with role=student
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());
    let password_hash = hash_password(&request.password)?;

    let profile = repo
        .create_profile(
            request.email.to_lowercase(),
            password_hash,
            request.full_name,
            request.skills,
            request.hall_ticket_number,
            request.mobile,
        )
        .await?;

    let token = state.jwt.generate_token(profile.id, profile.user_role())?;

    tracing::info!(user_id = %profile.id, "Account registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            profile: profile.into(),
        }),
    ))
}

/// Sign in with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());

    let profile = repo
        .find_profile_by_email(&request.email.to_lowercase())
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&request.password, &profile.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    if profile.is_blocked {
        return Err(AppError::AccountBlocked);
    }

    let token = state.jwt.generate_token(profile.id, profile.user_role())?;

    tracing::info!(user_id = %profile.id, "User signed in");

    Ok(Json(AuthResponse {
        token,
        profile: profile.into(),
    }))
}

/// Start a password reset
///
/// Always answers 204 so the endpoint cannot be used to enumerate accounts.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<StatusCode> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());

    if let Some(profile) = repo
        .find_profile_by_email(&request.email.to_lowercase())
        .await?
    {
        let token = generate_reset_token();
        repo.create_password_reset(
            profile.id,
            hash_reset_token(&token),
            state.config.auth.reset_token_ttl_minutes,
        )
        .await?;

        // Delivery is out of band; the token never appears in the response
        tracing::info!(user_id = %profile.id, "Password reset requested");
        tracing::debug!(token = %token, "Password reset token issued");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Complete a password reset with a previously issued token
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetConfirm>,
) -> Result<StatusCode> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());

    let reset = repo
        .find_password_reset(&hash_reset_token(&request.token))
        .await?
        .ok_or_else(|| AppError::Unauthorized {
            message: "Invalid or expired reset token".to_string(),
        })?;

    if reset.is_expired() {
        repo.consume_password_reset(reset.id).await?;
        return Err(AppError::Unauthorized {
            message: "Invalid or expired reset token".to_string(),
        });
    }

    let password_hash = hash_password(&request.new_password)?;
    repo.update_password(reset.user_id, password_hash).await?;
    repo.consume_password_reset(reset.id).await?;

    tracing::info!(user_id = %reset.user_id, "Password reset completed");

    Ok(StatusCode::NO_CONTENT)
}
