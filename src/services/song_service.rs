//! Submission ledger operations.

use tracing::info;

use crate::{
    config::AppConfig,
    dto::{
        game::{SubmissionProgressResponse, SubmitSongRequest, UnplayedSongEntry, UnplayedSongsResponse},
        room::RoomSnapshot,
    },
    error::ServiceError,
    state::{
        SharedState,
        rooms::{Game, PlayerId, PlayerSong, Room, RoomStatus},
    },
};

/// Players required to submit for `game`. With late joiners exempt this is
/// the ledger roster frozen at game creation; otherwise the live room
/// roster, minus the DJ unless the DJ also submits.
pub fn submission_roster(room: &Room, game: &Game, config: &AppConfig) -> Vec<PlayerId> {
    if config.late_joiners_exempt {
        return game.player_songs.keys().cloned().collect();
    }
    room.players
        .keys()
        .filter(|id| config.dj_submits_song || **id != game.dj_id)
        .cloned()
        .collect()
}

/// Record (or replace) a player's song proposal for the active game.
pub async fn submit_song(
    state: &SharedState,
    room_id: &str,
    game_id: &str,
    request: SubmitSongRequest,
) -> Result<RoomSnapshot, ServiceError> {
    let _gate = state.lock_room(room_id).await;
    let repo = state.rooms();
    let mut room = repo
        .load(room_id)
        .await?
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;

    if room.status != RoomStatus::SongSelection {
        return Err(ServiceError::PhaseMismatch(format!(
            "submissions are only accepted during song selection, room is {:?}",
            room.status
        )));
    }
    if room.current_game != game_id {
        return Err(ServiceError::PhaseMismatch(format!(
            "game `{game_id}` is not the active game"
        )));
    }
    if !room.players.contains_key(&request.player_id) {
        return Err(ServiceError::Unauthorized(format!(
            "player `{}` is not in room `{room_id}`",
            request.player_id
        )));
    }

    let config = state.config().clone();
    let game = room
        .games
        .get_mut(game_id)
        .ok_or_else(|| ServiceError::PhaseMismatch(format!("game `{game_id}` does not exist")))?;

    if request.player_id == game.dj_id && !config.dj_submits_song {
        return Err(ServiceError::Unauthorized(
            "the dj does not submit a song".into(),
        ));
    }
    match game.player_songs.get(&request.player_id) {
        Some(Some(existing)) if existing.was_played => {
            return Err(ServiceError::PhaseMismatch(
                "this submission was already played".into(),
            ));
        }
        None if config.late_joiners_exempt => {
            return Err(ServiceError::PhaseMismatch(format!(
                "player `{}` joined after game `{game_id}` started",
                request.player_id
            )));
        }
        _ => {}
    }

    let song = PlayerSong {
        song_id: request.song_id,
        song_title: request.song_title,
        was_played: false,
    };
    repo.put_player_song(room_id, game_id, &request.player_id, &song)
        .await?;
    info!(room = %room_id, game = %game_id, player = %request.player_id, "song submitted");
    game.player_songs
        .insert(request.player_id.clone(), Some(song));
    Ok(RoomSnapshot::from(&room))
}

/// How far along submissions are for a game. Read-only.
pub async fn submission_progress(
    state: &SharedState,
    room_id: &str,
    game_id: &str,
) -> Result<SubmissionProgressResponse, ServiceError> {
    let room = state
        .rooms()
        .load(room_id)
        .await?
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;
    let game = room
        .games
        .get(game_id)
        .ok_or_else(|| ServiceError::PhaseMismatch(format!("game `{game_id}` does not exist")))?;

    let roster = submission_roster(&room, game, state.config());
    let pending: Vec<PlayerId> = roster
        .iter()
        .filter(|id| !matches!(game.player_songs.get(*id), Some(Some(_))))
        .cloned()
        .collect();
    Ok(SubmissionProgressResponse {
        game_id: game.id.clone(),
        all_submitted: pending.is_empty(),
        pending,
    })
}

/// List the submissions the DJ has not played yet. DJ-only, so song titles
/// never leak to voters through this endpoint.
pub async fn unplayed_songs(
    state: &SharedState,
    room_id: &str,
    game_id: &str,
    player_id: &str,
) -> Result<UnplayedSongsResponse, ServiceError> {
    let room = state
        .rooms()
        .load(room_id)
        .await?
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;
    let game = room
        .games
        .get(game_id)
        .ok_or_else(|| ServiceError::PhaseMismatch(format!("game `{game_id}` does not exist")))?;

    if player_id != game.dj_id {
        return Err(ServiceError::Unauthorized(
            "only the dj can see the submission pool".into(),
        ));
    }

    Ok(UnplayedSongsResponse {
        game_id: game.id.clone(),
        songs: game
            .unplayed_submissions()
            .map(|(suggested_by, song)| UnplayedSongEntry {
                suggested_by: suggested_by.clone(),
                song_id: song.song_id.clone(),
                song_title: song.song_title.clone(),
            })
            .collect(),
    })
}
