//! Liveness endpoint.

use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::health::HealthResponse, services::health_service, state::SharedState};

/// Route for the health probe.
pub fn router() -> Router<SharedState> {
    Router::new().route("/health", get(health))
}

/// Report service health and the number of stored rooms.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health", body = HealthResponse),
    )
)]
pub(crate) async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(health_service::health(&state).await)
}
