//! Room registry endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::room::{CreateRoomRequest, JoinRoomRequest, PlayerActionRequest, RoomSnapshot},
    error::AppError,
    services::room_service,
    state::SharedState,
};

/// Routes for the room registry.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/{room_id}", get(room_snapshot))
        .route("/rooms/{room_id}/join", post(join_room))
        .route("/rooms/{room_id}/close", post(close_room))
}

/// Open a new room.
#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 200, description = "Room created", body = RoomSnapshot),
        (status = 400, description = "Invalid payload"),
        (status = 503, description = "Store unavailable"),
    )
)]
pub(crate) async fn create_room(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateRoomRequest>>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let snapshot = room_service::create_room(&state, payload).await?;
    Ok(Json(snapshot))
}

/// Read a room snapshot.
#[utoipa::path(
    get,
    path = "/rooms/{room_id}",
    tag = "rooms",
    params(("room_id" = String, Path, description = "Room code")),
    responses(
        (status = 200, description = "Current room state", body = RoomSnapshot),
        (status = 404, description = "Unknown room"),
    )
)]
pub(crate) async fn room_snapshot(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let snapshot = room_service::snapshot(&state, &room_id).await?;
    Ok(Json(snapshot))
}

/// Join an existing room.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/join",
    tag = "rooms",
    params(("room_id" = String, Path, description = "Room code")),
    request_body = JoinRoomRequest,
    responses(
        (status = 200, description = "Joined (or already a member)", body = RoomSnapshot),
        (status = 404, description = "Unknown room"),
        (status = 409, description = "Game already started"),
    )
)]
pub(crate) async fn join_room(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Valid(Json(payload)): Valid<Json<JoinRoomRequest>>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let snapshot = room_service::join_room(&state, &room_id, payload).await?;
    Ok(Json(snapshot))
}

/// Close a room outright.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/close",
    tag = "rooms",
    params(("room_id" = String, Path, description = "Room code")),
    request_body = PlayerActionRequest,
    responses(
        (status = 204, description = "Room deleted"),
        (status = 401, description = "Only the dj can close the room"),
        (status = 404, description = "Unknown room"),
    )
)]
pub(crate) async fn close_room(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Valid(Json(payload)): Valid<Json<PlayerActionRequest>>,
) -> Result<axum::http::StatusCode, AppError> {
    room_service::close_room(&state, &room_id, payload).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
