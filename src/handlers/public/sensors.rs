// handlers/public/sensors.rs - /sensors CRUD

use axum::extract::{Path, Query, State};

use crate::database::models::{Sensor, SensorInput, SensorPatch};
use crate::error::ApiError;
use crate::handlers::{parse_filter, parse_id, RecordQuery};
use crate::middleware::{ApiResponse, ApiResult, ValidJson};
use crate::services::expand::{self, Expansion, SensorDetail};
use crate::state::AppState;

/// POST /sensors
pub async fn post(State(state): State<AppState>, ValidJson(input): ValidJson<SensorInput>) -> ApiResult<Sensor> {
    let sensor = state.store.sensors.create(input).await?;
    tracing::info!("Created sensor {} on IoT node {}", sensor.id, sensor.iot);
    Ok(ApiResponse::created(sensor))
}

/// GET /sensors - sensors with their readings, optionally only those of `?iot=`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<RecordQuery>,
) -> ApiResult<Expansion<Vec<Sensor>, Vec<SensorDetail>>> {
    let iot = parse_filter("iot", query.iot.as_deref())?;
    let sensors = state.store.sensors.list(iot).await?;
    if !query.expand() {
        return Ok(ApiResponse::success(Expansion::Bare(sensors)));
    }
    let detail = expand::sensors_with_readings(&state.store, sensors).await?;
    Ok(ApiResponse::success(Expansion::Expanded(detail)))
}

/// GET /sensors/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RecordQuery>,
) -> ApiResult<Expansion<Sensor, SensorDetail>> {
    let sensor = state.store.sensors.get(parse_id::<Sensor>(&id)?).await?;
    if !query.expand() {
        return Ok(ApiResponse::success(Expansion::Bare(sensor)));
    }
    let mut detail = expand::sensors_with_readings(&state.store, vec![sensor]).await?;
    Ok(ApiResponse::success(Expansion::Expanded(detail.remove(0))))
}

/// PATCH /sensors/:id
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<ValidJson<SensorPatch>, ApiError>,
) -> ApiResult<Sensor> {
    let id = parse_id::<Sensor>(&id)?;
    let ValidJson(patch) = body?;
    let sensor = state.store.sensors.update(id, patch).await?;
    Ok(ApiResponse::success(sensor))
}

/// DELETE /sensors/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Sensor> {
    let sensor = state.store.sensors.delete(parse_id::<Sensor>(&id)?).await?;
    tracing::info!("Deleted sensor {}", sensor.id);
    Ok(ApiResponse::success(sensor))
}
