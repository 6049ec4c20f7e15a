// handlers/public/farms.rs - /farms CRUD

use axum::extract::{Path, Query, State};

use crate::database::models::{Farm, FarmInput, FarmPatch};
use crate::error::ApiError;
use crate::handlers::{parse_filter, parse_id, RecordQuery};
use crate::middleware::{ApiResponse, ApiResult, ValidJson};
use crate::services::expand::{self, Expansion, FarmDetail};
use crate::state::AppState;

/// POST /farms
pub async fn post(State(state): State<AppState>, ValidJson(input): ValidJson<FarmInput>) -> ApiResult<Farm> {
    let farm = state.store.farms.create(input).await?;
    tracing::info!("Created farm {} ({})", farm.id, farm.name);
    Ok(ApiResponse::created(farm))
}

/// GET /farms - all farms, or those of `?owner=`
pub async fn list(State(state): State<AppState>, Query(query): Query<RecordQuery>) -> ApiResult<Vec<Farm>> {
    let owner = parse_filter("owner", query.owner.as_deref())?;
    Ok(ApiResponse::success(state.store.farms.list(owner).await?))
}

/// GET /farms/:id - farm with its IoT nodes and their sensors
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RecordQuery>,
) -> ApiResult<Expansion<Farm, FarmDetail>> {
    let farm = state.store.farms.get(parse_id::<Farm>(&id)?).await?;
    if !query.expand() {
        return Ok(ApiResponse::success(Expansion::Bare(farm)));
    }
    let detail = expand::farm_detail(&state.store, farm).await?;
    Ok(ApiResponse::success(Expansion::Expanded(detail)))
}

/// PATCH /farms/:id
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<ValidJson<FarmPatch>, ApiError>,
) -> ApiResult<Farm> {
    // A malformed id is a 404 whatever the body holds
    let id = parse_id::<Farm>(&id)?;
    let ValidJson(patch) = body?;
    let farm = state.store.farms.update(id, patch).await?;
    Ok(ApiResponse::success(farm))
}

/// DELETE /farms/:id - IoT nodes of the farm are left in place
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Farm> {
    let farm = state.store.farms.delete(parse_id::<Farm>(&id)?).await?;
    tracing::info!("Deleted farm {}", farm.id);
    Ok(ApiResponse::success(farm))
}
