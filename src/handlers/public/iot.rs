// handlers/public/iot.rs - /iot CRUD

use axum::extract::{Path, Query, State};

use crate::database::models::{IotInput, IotNode, IotPatch};
use crate::error::ApiError;
use crate::handlers::{parse_filter, parse_id, RecordQuery};
use crate::middleware::{ApiResponse, ApiResult, ValidJson};
use crate::services::expand::{self, Expansion, IotDetail};
use crate::state::AppState;

/// POST /iot
pub async fn post(State(state): State<AppState>, ValidJson(input): ValidJson<IotInput>) -> ApiResult<IotNode> {
    let iot = state.store.iots.create(input).await?;
    tracing::info!("Created IoT node {} on farm {}", iot.id, iot.farm);
    Ok(ApiResponse::created(iot))
}

/// GET /iot - nodes with their sensors, optionally only those of `?farm=`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<RecordQuery>,
) -> ApiResult<Expansion<Vec<IotNode>, Vec<IotDetail>>> {
    let farm = parse_filter("farm", query.farm.as_deref())?;
    let iots = state.store.iots.list(farm).await?;
    if !query.expand() {
        return Ok(ApiResponse::success(Expansion::Bare(iots)));
    }
    let detail = expand::iots_with_sensors(&state.store, iots).await?;
    Ok(ApiResponse::success(Expansion::Expanded(detail)))
}

/// GET /iot/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RecordQuery>,
) -> ApiResult<Expansion<IotNode, IotDetail>> {
    let iot = state.store.iots.get(parse_id::<IotNode>(&id)?).await?;
    if !query.expand() {
        return Ok(ApiResponse::success(Expansion::Bare(iot)));
    }
    let mut detail = expand::iots_with_sensors(&state.store, vec![iot]).await?;
    Ok(ApiResponse::success(Expansion::Expanded(detail.remove(0))))
}

/// PATCH /iot/:id
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<ValidJson<IotPatch>, ApiError>,
) -> ApiResult<IotNode> {
    let id = parse_id::<IotNode>(&id)?;
    let ValidJson(patch) = body?;
    let iot = state.store.iots.update(id, patch).await?;
    Ok(ApiResponse::success(iot))
}

/// DELETE /iot/:id - sensors of the node stay retrievable
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<IotNode> {
    let iot = state.store.iots.delete(parse_id::<IotNode>(&id)?).await?;
    tracing::info!("Deleted IoT node {}", iot.id);
    Ok(ApiResponse::success(iot))
}
