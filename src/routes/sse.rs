//! Live room stream endpoint.

use axum::{
    Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};

use crate::{error::AppError, services::sse_service, state::SharedState};

/// Route for the live room stream.
pub fn router() -> Router<SharedState> {
    Router::new().route("/rooms/{room_id}/events", get(room_events))
}

/// Subscribe to live snapshots of a room.
#[utoipa::path(
    get,
    path = "/rooms/{room_id}/events",
    tag = "sse",
    params(("room_id" = String, Path, description = "Room code")),
    responses(
        (status = 200, description = "SSE stream of `room` snapshots, ending with `room_closed`"),
        (status = 404, description = "Unknown room"),
    )
)]
pub(crate) async fn room_events(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let stream = sse_service::room_stream(&state, &room_id).await?;
    Ok(stream)
}
