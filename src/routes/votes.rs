//! Voting endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::game::{CastVoteRequest, VoteProgressResponse},
    error::AppError,
    services::vote_service,
    state::SharedState,
};

/// Routes for round voting.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/rooms/{room_id}/games/{game_id}/rounds/{round_id}/votes",
            post(cast_vote),
        )
        .route(
            "/rooms/{room_id}/games/{game_id}/rounds/{round_id}/votes/progress",
            get(vote_progress),
        )
}

/// Cast (or change) a vote for the active round.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/games/{game_id}/rounds/{round_id}/votes",
    tag = "votes",
    params(
        ("room_id" = String, Path, description = "Room code"),
        ("game_id" = String, Path, description = "Game key"),
        ("round_id" = String, Path, description = "Round key"),
    ),
    request_body = CastVoteRequest,
    responses(
        (status = 200, description = "Vote recorded", body = VoteProgressResponse),
        (status = 400, description = "Unknown target"),
        (status = 401, description = "Not an eligible voter"),
        (status = 409, description = "Round not open for votes"),
    )
)]
pub(crate) async fn cast_vote(
    State(state): State<SharedState>,
    Path((room_id, game_id, round_id)): Path<(String, String, String)>,
    Valid(Json(payload)): Valid<Json<CastVoteRequest>>,
) -> Result<Json<VoteProgressResponse>, AppError> {
    let progress =
        vote_service::cast_vote(&state, &room_id, &game_id, &round_id, payload).await?;
    Ok(Json(progress))
}

/// Voting progress of a round.
#[utoipa::path(
    get,
    path = "/rooms/{room_id}/games/{game_id}/rounds/{round_id}/votes/progress",
    tag = "votes",
    params(
        ("room_id" = String, Path, description = "Room code"),
        ("game_id" = String, Path, description = "Game key"),
        ("round_id" = String, Path, description = "Round key"),
    ),
    responses(
        (status = 200, description = "Who still has to vote", body = VoteProgressResponse),
        (status = 404, description = "Unknown room"),
    )
)]
pub(crate) async fn vote_progress(
    State(state): State<SharedState>,
    Path((room_id, game_id, round_id)): Path<(String, String, String)>,
) -> Result<Json<VoteProgressResponse>, AppError> {
    let progress = vote_service::vote_progress(&state, &room_id, &game_id, &round_id).await?;
    Ok(Json(progress))
}
