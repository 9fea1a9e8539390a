//! OpenAPI document assembly.

use utoipa::OpenApi;

/// OpenAPI description of the HTTP surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Song Sleuth",
        description = "Server-authoritative backend for the guess-who-suggested-this-song party game."
    ),
    paths(
        crate::routes::health::health,
        crate::routes::rooms::create_room,
        crate::routes::rooms::room_snapshot,
        crate::routes::rooms::join_room,
        crate::routes::rooms::close_room,
        crate::routes::game::start_game,
        crate::routes::game::select_song,
        crate::routes::game::close_round,
        crate::routes::game::advance_after_game,
        crate::routes::game::acknowledge_summary,
        crate::routes::songs::submit_song,
        crate::routes::songs::submission_progress,
        crate::routes::songs::unplayed_songs,
        crate::routes::votes::cast_vote,
        crate::routes::votes::vote_progress,
        crate::routes::sse::room_events,
    ),
    components(schemas(
        crate::dto::room::CreateRoomRequest,
        crate::dto::room::JoinRoomRequest,
        crate::dto::room::PlayerActionRequest,
        crate::dto::room::RoomSnapshot,
        crate::dto::room::PlayerSnapshot,
        crate::dto::room::GameSnapshot,
        crate::dto::room::RoundSnapshot,
        crate::dto::room::RoundSongSnapshot,
        crate::dto::room::SubmissionSnapshot,
        crate::dto::room::VoteSnapshot,
        crate::dto::game::SubmitSongRequest,
        crate::dto::game::SelectSongRequest,
        crate::dto::game::SubmissionProgressResponse,
        crate::dto::game::UnplayedSongEntry,
        crate::dto::game::UnplayedSongsResponse,
        crate::dto::game::CastVoteRequest,
        crate::dto::game::VoteProgressResponse,
        crate::dto::sse::RoomClosedEvent,
        crate::dto::health::HealthResponse,
        crate::dto::health::HealthStatus,
        crate::state::rooms::RoomStatus,
        crate::state::rooms::RoundStatus,
        crate::state::rooms::GameMode,
    )),
    tags(
        (name = "rooms", description = "Room registry"),
        (name = "game", description = "Game lifecycle"),
        (name = "songs", description = "Submission ledger"),
        (name = "votes", description = "Round voting"),
        (name = "sse", description = "Live room streaming"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/health",
            "/rooms",
            "/rooms/{room_id}",
            "/rooms/{room_id}/join",
            "/rooms/{room_id}/close",
            "/rooms/{room_id}/start",
            "/rooms/{room_id}/advance",
            "/rooms/{room_id}/summary/ack",
            "/rooms/{room_id}/events",
            "/rooms/{room_id}/games/{game_id}/songs",
            "/rooms/{room_id}/games/{game_id}/songs/progress",
            "/rooms/{room_id}/games/{game_id}/songs/unplayed",
            "/rooms/{room_id}/games/{game_id}/rounds/{round_id}/song",
            "/rooms/{room_id}/games/{game_id}/rounds/{round_id}/close",
            "/rooms/{room_id}/games/{game_id}/rounds/{round_id}/votes",
            "/rooms/{room_id}/games/{game_id}/rounds/{round_id}/votes/progress",
        ] {
            assert!(
                paths.iter().any(|path| *path == expected),
                "missing path {expected}"
            );
        }
    }
}
