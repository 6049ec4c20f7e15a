// handlers/public/readings.rs - /readings

use axum::extract::{Path, Query, State};

use crate::database::models::{IotNode, Reading, ReadingBatch};
use crate::handlers::{parse_filter, parse_id, RecordQuery};
use crate::middleware::{ApiResponse, ApiResult, ValidJson};
use crate::services::expand::{self, IotDetail, SensorDetail};
use crate::state::AppState;

/// POST /readings - batch insert.
///
/// Entries are stored one at a time; on failure the ones already stored stay.
pub async fn post(
    State(state): State<AppState>,
    ValidJson(batch): ValidJson<ReadingBatch>,
) -> ApiResult<Vec<Reading>> {
    let readings = state.store.readings.create_many(batch.into_inner()).await?;
    tracing::debug!("Stored {} readings", readings.len());
    Ok(ApiResponse::created(readings))
}

/// GET /readings - all readings, or those of `?sensor=`
pub async fn list(State(state): State<AppState>, Query(query): Query<RecordQuery>) -> ApiResult<Vec<Reading>> {
    let sensor = parse_filter("sensor", query.sensor.as_deref())?;
    Ok(ApiResponse::success(state.store.readings.list(sensor).await?))
}

/// GET /readings/iot/:iot_id - node with each sensor and its readings
pub async fn by_iot(
    State(state): State<AppState>,
    Path(iot_id): Path<String>,
) -> ApiResult<IotDetail<SensorDetail>> {
    let iot = state.store.iots.get(parse_id::<IotNode>(&iot_id)?).await?;
    Ok(ApiResponse::success(expand::iot_with_readings(&state.store, iot).await?))
}

/// GET /readings/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Reading> {
    let reading = state.store.readings.get(parse_id::<Reading>(&id)?).await?;
    Ok(ApiResponse::success(reading))
}

/// DELETE /readings/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Reading> {
    let reading = state.store.readings.delete(parse_id::<Reading>(&id)?).await?;
    Ok(ApiResponse::success(reading))
}
