use axum::Json;
use traincast_shared::types::api::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("traincast-content", env!("CARGO_PKG_VERSION")))
}
