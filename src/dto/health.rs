//! Health endpoint payload.

use serde::Serialize;
use utoipa::ToSchema;

/// Coarse service health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Store reachable, service operating normally.
    Ok,
    /// Store unreachable; mutating operations will fail.
    Degraded,
}

/// Response of the health endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Coarse service health.
    pub status: HealthStatus,
    /// Number of rooms currently stored.
    pub active_rooms: usize,
}
