//! Game lifecycle endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use axum_valid::Valid;

use crate::{
    dto::{
        game::SelectSongRequest,
        room::{PlayerActionRequest, RoomSnapshot},
    },
    error::AppError,
    services::lifecycle_service,
    state::SharedState,
};

/// Routes driving the game lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms/{room_id}/start", post(start_game))
        .route(
            "/rooms/{room_id}/games/{game_id}/rounds/{round_id}/song",
            post(select_song),
        )
        .route(
            "/rooms/{room_id}/games/{game_id}/rounds/{round_id}/close",
            post(close_round),
        )
        .route("/rooms/{room_id}/advance", post(advance_after_game))
        .route("/rooms/{room_id}/summary/ack", post(acknowledge_summary))
}

/// Start the first game of a waiting room.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/start",
    tag = "game",
    params(("room_id" = String, Path, description = "Room code")),
    request_body = PlayerActionRequest,
    responses(
        (status = 200, description = "First game installed", body = RoomSnapshot),
        (status = 400, description = "Not enough players"),
        (status = 401, description = "Only the dj can start"),
        (status = 409, description = "Room is not waiting"),
    )
)]
pub(crate) async fn start_game(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Valid(Json(payload)): Valid<Json<PlayerActionRequest>>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let snapshot = lifecycle_service::start_game(&state, &room_id, payload).await?;
    Ok(Json(snapshot))
}

/// Attach a submission to the active round and open the votes.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/games/{game_id}/rounds/{round_id}/song",
    tag = "game",
    params(
        ("room_id" = String, Path, description = "Room code"),
        ("game_id" = String, Path, description = "Game key"),
        ("round_id" = String, Path, description = "Round key"),
    ),
    request_body = SelectSongRequest,
    responses(
        (status = 200, description = "Votes opened", body = RoomSnapshot),
        (status = 401, description = "Only the dj can pick the song"),
        (status = 409, description = "Submissions incomplete or round not active"),
    )
)]
pub(crate) async fn select_song(
    State(state): State<SharedState>,
    Path((room_id, game_id, round_id)): Path<(String, String, String)>,
    Valid(Json(payload)): Valid<Json<SelectSongRequest>>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let snapshot =
        lifecycle_service::select_song(&state, &room_id, &game_id, &round_id, payload).await?;
    Ok(Json(snapshot))
}

/// Close the active round once everyone voted.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/games/{game_id}/rounds/{round_id}/close",
    tag = "game",
    params(
        ("room_id" = String, Path, description = "Room code"),
        ("game_id" = String, Path, description = "Game key"),
        ("round_id" = String, Path, description = "Round key"),
    ),
    request_body = PlayerActionRequest,
    responses(
        (status = 200, description = "Round settled", body = RoomSnapshot),
        (status = 401, description = "Only the dj can close the round"),
        (status = 409, description = "Votes incomplete or round not active"),
    )
)]
pub(crate) async fn close_round(
    State(state): State<SharedState>,
    Path((room_id, game_id, round_id)): Path<(String, String, String)>,
    Valid(Json(payload)): Valid<Json<PlayerActionRequest>>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let snapshot =
        lifecycle_service::close_round(&state, &room_id, &game_id, &round_id, payload).await?;
    Ok(Json(snapshot))
}

/// Re-run the post-game advance after an interrupted close.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/advance",
    tag = "game",
    params(("room_id" = String, Path, description = "Room code")),
    request_body = PlayerActionRequest,
    responses(
        (status = 200, description = "Game settled", body = RoomSnapshot),
        (status = 401, description = "Only the dj can advance"),
        (status = 409, description = "Nothing to advance"),
    )
)]
pub(crate) async fn advance_after_game(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Valid(Json(payload)): Valid<Json<PlayerActionRequest>>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let snapshot = lifecycle_service::advance_after_game(&state, &room_id, payload).await?;
    Ok(Json(snapshot))
}

/// Dismiss the between-games standings.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/summary/ack",
    tag = "game",
    params(("room_id" = String, Path, description = "Room code")),
    request_body = PlayerActionRequest,
    responses(
        (status = 200, description = "Song selection resumed", body = RoomSnapshot),
        (status = 401, description = "Only the incoming dj can dismiss"),
        (status = 409, description = "No summary on display"),
    )
)]
pub(crate) async fn acknowledge_summary(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Valid(Json(payload)): Valid<Json<PlayerActionRequest>>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let snapshot = lifecycle_service::acknowledge_summary(&state, &room_id, payload).await?;
    Ok(Json(snapshot))
}
