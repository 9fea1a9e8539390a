//! Health reporting.

use tracing::warn;

use crate::{
    dto::health::{HealthResponse, HealthStatus},
    state::SharedState,
};

/// Probe the store and report coarse service health.
pub async fn health(state: &SharedState) -> HealthResponse {
    match state.rooms().room_ids().await {
        Ok(ids) => HealthResponse {
            status: HealthStatus::Ok,
            active_rooms: ids.len(),
        },
        Err(err) => {
            warn!(error = %err, "health probe failed to reach the store");
            HealthResponse {
                status: HealthStatus::Degraded,
                active_rooms: 0,
            }
        }
    }
}
