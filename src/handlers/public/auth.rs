// handlers/public/auth.rs - POST /auth/register, POST /auth/login

use axum::extract::State;
use chrono::Utc;
use serde::Serialize;

use crate::auth::{hash_password, verify_password};
use crate::database::models::{LoginInput, NewUser, RegisterInput, User, UserPatch};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ValidJson};
use crate::state::AppState;

const MISSING_CREDENTIALS: &str = "Please provide email and password";
const USER_EXISTS: &str = "User already exists";
const INVALID_CREDENTIALS: &str = "invalid credentials";

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: &'static str,
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: User,
}

fn session(state: &AppState, message: &'static str, user: User) -> Result<SessionResponse, ApiError> {
    let token = state.tokens.issue(user.id, &user.email, user.is_admin)?;
    Ok(SessionResponse {
        message,
        token,
        expires_in: state.tokens.ttl_secs(),
        user,
    })
}

/// POST /auth/register - create an account and sign it in
pub async fn register(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<RegisterInput>,
) -> ApiResult<SessionResponse> {
    let (email, password) = input
        .credentials()
        .ok_or_else(|| ApiError::bad_request(MISSING_CREDENTIALS))?;

    if state.store.users.find_by_key(&email).await?.is_some() {
        return Err(ApiError::bad_request(USER_EXISTS));
    }

    let password_hash = hash_password(password, state.config.security.bcrypt_cost).await?;
    let new_user = NewUser {
        email,
        password_hash,
        username: input.username.clone(),
        first_name: input.first_name.clone(),
        last_name: input.last_name.clone(),
    };

    // A concurrent registration can still win the unique index
    let user = state.store.users.create(new_user).await.map_err(|e| match e {
        DatabaseError::Duplicate { .. } => ApiError::bad_request(USER_EXISTS),
        other => other.into(),
    })?;

    tracing::info!("Registered user {}", user.id);
    Ok(ApiResponse::created(session(&state, "user created", user)?))
}

/// POST /auth/login - exchange email and password for a session token.
///
/// Unknown email, wrong password and deactivated accounts all produce the
/// same 401, and each costs one bcrypt verification.
pub async fn login(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<LoginInput>,
) -> ApiResult<SessionResponse> {
    let (email, password) = input
        .credentials()
        .ok_or_else(|| ApiError::bad_request(MISSING_CREDENTIALS))?;

    let user = state.store.users.find_by_key(&email).await?;
    let verified = match &user {
        Some(user) => verify_password(password, &user.password).await?,
        None => {
            let dummy = state.dummy_hash().await?;
            verify_password(password, dummy).await?;
            false
        }
    };

    let user = match user {
        Some(user) if verified && user.is_active => user,
        _ => {
            tracing::warn!("Failed login attempt");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
    };

    let patch = UserPatch {
        last_login: Some(Utc::now()),
        ..UserPatch::default()
    };
    let user = state.store.users.update(user.id, patch).await?;

    tracing::info!("User {} logged in", user.id);
    Ok(ApiResponse::success(session(&state, "login successfully", user)?))
}
