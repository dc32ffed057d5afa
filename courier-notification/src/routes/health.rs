use axum::Json;
use courier_shared::types::api::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("courier-notification", env!("CARGO_PKG_VERSION")))
}
