// handlers/protected/user.rs - /user/* routes scoped to the caller

use axum::{extract::State, Extension};
use serde::Serialize;

use crate::database::models::{Farm, FarmInput, Group, User};
use crate::database::DatabaseError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Profile {
    pub user: User,
    pub groups: Vec<Group>,
    /// Farms whose `owner` is this user
    pub farms: Vec<Farm>,
}

/// GET /user/me - the caller's account, group memberships and farms
pub async fn me(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<Profile> {
    let user = state.store.users.get(auth.id).await?;

    let mut groups = Vec::with_capacity(user.groups.len());
    for id in &user.groups {
        match state.store.groups.get(*id).await {
            Ok(group) => groups.push(group),
            Err(DatabaseError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    let farms = state.store.farms.list(Some(auth.id)).await?;

    Ok(ApiResponse::success(Profile { user, groups, farms }))
}

/// GET /user/farms - farms owned by the caller
pub async fn farms_get(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<Farm>> {
    Ok(ApiResponse::success(state.store.farms.list(Some(auth.id)).await?))
}

/// POST /user/farms - create a farm owned by the caller
pub async fn farms_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ValidJson(input): ValidJson<FarmInput>,
) -> ApiResult<Farm> {
    let input = FarmInput {
        owner: Some(auth.id),
        ..input
    };
    let farm = state.store.farms.create(input).await?;
    tracing::info!("User {} created farm {}", auth.id, farm.id);
    Ok(ApiResponse::created(farm))
}
