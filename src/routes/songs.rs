//! Submission ledger endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::game::{
        PlayerQuery, SubmissionProgressResponse, SubmitSongRequest, UnplayedSongsResponse,
    },
    dto::room::RoomSnapshot,
    error::AppError,
    services::song_service,
    state::SharedState,
};

/// Routes for the submission ledger.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms/{room_id}/games/{game_id}/songs", post(submit_song))
        .route(
            "/rooms/{room_id}/games/{game_id}/songs/progress",
            get(submission_progress),
        )
        .route(
            "/rooms/{room_id}/games/{game_id}/songs/unplayed",
            get(unplayed_songs),
        )
}

/// Submit (or replace) a song proposal.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/games/{game_id}/songs",
    tag = "songs",
    params(
        ("room_id" = String, Path, description = "Room code"),
        ("game_id" = String, Path, description = "Game key"),
    ),
    request_body = SubmitSongRequest,
    responses(
        (status = 200, description = "Submission recorded", body = RoomSnapshot),
        (status = 401, description = "Not a submitter for this game"),
        (status = 409, description = "Wrong phase or already played"),
    )
)]
pub(crate) async fn submit_song(
    State(state): State<SharedState>,
    Path((room_id, game_id)): Path<(String, String)>,
    Valid(Json(payload)): Valid<Json<SubmitSongRequest>>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let snapshot = song_service::submit_song(&state, &room_id, &game_id, payload).await?;
    Ok(Json(snapshot))
}

/// Submission progress of a game.
#[utoipa::path(
    get,
    path = "/rooms/{room_id}/games/{game_id}/songs/progress",
    tag = "songs",
    params(
        ("room_id" = String, Path, description = "Room code"),
        ("game_id" = String, Path, description = "Game key"),
    ),
    responses(
        (status = 200, description = "Who still has to submit", body = SubmissionProgressResponse),
        (status = 404, description = "Unknown room"),
    )
)]
pub(crate) async fn submission_progress(
    State(state): State<SharedState>,
    Path((room_id, game_id)): Path<(String, String)>,
) -> Result<Json<SubmissionProgressResponse>, AppError> {
    let progress = song_service::submission_progress(&state, &room_id, &game_id).await?;
    Ok(Json(progress))
}

/// DJ-only listing of the unplayed submissions.
#[utoipa::path(
    get,
    path = "/rooms/{room_id}/games/{game_id}/songs/unplayed",
    tag = "songs",
    params(
        ("room_id" = String, Path, description = "Room code"),
        ("game_id" = String, Path, description = "Game key"),
        PlayerQuery,
    ),
    responses(
        (status = 200, description = "Submissions still available to play", body = UnplayedSongsResponse),
        (status = 401, description = "Only the dj can see the pool"),
    )
)]
pub(crate) async fn unplayed_songs(
    State(state): State<SharedState>,
    Path((room_id, game_id)): Path<(String, String)>,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<UnplayedSongsResponse>, AppError> {
    let pool = song_service::unplayed_songs(&state, &room_id, &game_id, &query.player_id).await?;
    Ok(Json(pool))
}
