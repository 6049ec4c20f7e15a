use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full application router with every route group and global layer
pub fn app(state: AppState) -> Router {
    let api = &state.config.api;
    let security = &state.config.security;

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(farm_routes())
        .merge(iot_routes())
        .merge(sensor_routes())
        .merge(reading_routes())
        // Protected
        .merge(user_routes(state.clone()))
        .layer(DefaultBodyLimit::max(api.max_request_size_bytes));

    if security.enable_cors {
        router = router.layer(cors_layer(&security.cors_origins));
    }
    if api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();
    CorsLayer::permissive().allow_origin(AllowOrigin::list(origins))
}

fn auth_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

fn user_routes(state: AppState) -> Router<AppState> {
    use protected::user;

    Router::new()
        .route("/user/me", get(user::me))
        .route("/user/farms", get(user::farms_get).post(user::farms_post))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn farm_routes() -> Router<AppState> {
    use public::farms;

    Router::new()
        .route("/farms", get(farms::list).post(farms::post))
        .route(
            "/farms/:id",
            get(farms::get).patch(farms::patch).delete(farms::delete),
        )
}

fn iot_routes() -> Router<AppState> {
    use public::iot;

    Router::new()
        .route("/iot", get(iot::list).post(iot::post))
        .route("/iot/:id", get(iot::get).patch(iot::patch).delete(iot::delete))
}

fn sensor_routes() -> Router<AppState> {
    use public::sensors;

    Router::new()
        .route("/sensors", get(sensors::list).post(sensors::post))
        .route(
            "/sensors/:id",
            get(sensors::get).patch(sensors::patch).delete(sensors::delete),
        )
}

fn reading_routes() -> Router<AppState> {
    use public::readings;

    Router::new()
        .route("/readings", get(readings::list).post(readings::post))
        .route("/readings/iot/:iot_id", get(readings::by_iot))
        .route("/readings/:id", get(readings::get).delete(readings::delete))
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Farmwatch API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "IoT farm monitoring backend",
            "endpoints": {
                "auth": "/auth/register, /auth/login (public)",
                "user": "/user/me, /user/farms (bearer token)",
                "farms": "/farms[/:id]",
                "iot": "/iot[/:id]",
                "sensors": "/sensors[/:id]",
                "readings": "/readings[/:id], /readings/iot/:iot_id",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": format!("{:?}", state.store.backend()).to_lowercase()
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "store unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}
