//! Game lifecycle operations: start, song pick, round close, summary.

use serde_json::{Map, Value};
use tracing::{error, info};

use crate::{
    dao::rooms::RoomRepository,
    dto::{
        game::SelectSongRequest,
        room::{PlayerActionRequest, RoomSnapshot},
    },
    error::ServiceError,
    state::{
        SharedState,
        lifecycle::{self, RoomEvent},
        rooms::{Game, Room, RoomStatus, Round, RoundSong, RoundStatus, round_key},
    },
    services::{scoring, song_service},
};

/// Minimum players required before the first game can start.
const MIN_PLAYERS: usize = 2;

/// Start the first game of a waiting room. DJ-only.
pub async fn start_game(
    state: &SharedState,
    room_id: &str,
    request: PlayerActionRequest,
) -> Result<RoomSnapshot, ServiceError> {
    let _gate = state.lock_room(room_id).await;
    let repo = state.rooms();
    let mut room = load(&repo, room_id).await?;

    require_dj(&room, &request.player_id, "start the game")?;
    if room.player_count() < MIN_PLAYERS {
        return Err(ServiceError::Validation(format!(
            "at least {MIN_PLAYERS} players are required to start"
        )));
    }

    let next_status = lifecycle::advance(room.status, RoomEvent::StartGame)?;
    let submitters = if state.config().dj_submits_song {
        room.players.keys().cloned().collect()
    } else {
        room.non_dj_player_ids(&room.dj_id)
    };
    let voters = room.non_dj_player_ids(&room.dj_id);
    let game = Game::new(1, room.dj_id.clone(), submitters, voters);

    repo.put_game(room_id, &game).await?;
    let mut fields = Map::new();
    fields.insert("status".into(), json(&next_status)?);
    fields.insert("currentGame".into(), Value::String(game.id.clone()));
    fields.insert("currentRound".into(), Value::String(round_key(1)));
    repo.merge_room(room_id, fields).await?;
    info!(room = %room_id, dj = %room.dj_id, "game started");

    room.status = next_status;
    room.current_game = game.id.clone();
    room.current_round = round_key(1);
    room.games.insert(game.id.clone(), game);
    Ok(RoomSnapshot::from(&room))
}

/// Attach one of the unplayed submissions to the active round and open the
/// votes. DJ-only; requires every required submission to be in.
pub async fn select_song(
    state: &SharedState,
    room_id: &str,
    game_id: &str,
    round_id: &str,
    request: SelectSongRequest,
) -> Result<RoomSnapshot, ServiceError> {
    let _gate = state.lock_room(room_id).await;
    let repo = state.rooms();
    let mut room = load(&repo, room_id).await?;

    require_dj(&room, &request.player_id, "pick the song")?;
    require_active_round(&room, game_id, round_id)?;
    let next_status = lifecycle::advance(room.status, RoomEvent::SongChosen)?;

    let config = state.config().clone();
    let roster = {
        let game = expect_game(&room, game_id)?;
        song_service::submission_roster(&room, game, &config)
    };
    let game = room
        .games
        .get_mut(game_id)
        .ok_or_else(|| ServiceError::PhaseMismatch(format!("game `{game_id}` does not exist")))?;
    if !game.all_submitted(&roster) {
        return Err(ServiceError::PhaseMismatch(
            "not every player has submitted a song yet".into(),
        ));
    }

    let song = match game.player_songs.get(&request.suggested_by) {
        Some(Some(entry)) if !entry.was_played => RoundSong {
            song_id: entry.song_id.clone(),
            song_title: entry.song_title.clone(),
            suggested_by: request.suggested_by.clone(),
        },
        Some(Some(_)) => {
            return Err(ServiceError::PhaseMismatch(format!(
                "the submission of `{}` was already played",
                request.suggested_by
            )));
        }
        _ => {
            return Err(ServiceError::Validation(format!(
                "player `{}` has no submission in game `{game_id}`",
                request.suggested_by
            )));
        }
    };

    repo.merge_round(room_id, game_id, round_id, Some(&song), RoundStatus::Voting)
        .await?;
    let mut played = game.player_songs[&request.suggested_by]
        .clone()
        .ok_or_else(|| ServiceError::Validation("submission vanished".into()))?;
    played.was_played = true;
    repo.put_player_song(room_id, game_id, &request.suggested_by, &played)
        .await?;
    repo.set_status(room_id, next_status).await?;
    info!(room = %room_id, round = %round_id, suggested_by = %song.suggested_by, "song selected");

    game.player_songs
        .insert(request.suggested_by.clone(), Some(played));
    if let Some(round) = game.rounds.get_mut(round_id) {
        round.song = Some(song);
        round.status = RoundStatus::Voting;
    }
    room.status = next_status;
    Ok(RoomSnapshot::from(&room))
}

/// Close the active round once every voter has cast a vote. Appends the next
/// round, or settles the game when its rounds are exhausted. DJ-only.
pub async fn close_round(
    state: &SharedState,
    room_id: &str,
    game_id: &str,
    round_id: &str,
    request: PlayerActionRequest,
) -> Result<RoomSnapshot, ServiceError> {
    let _gate = state.lock_room(room_id).await;
    let repo = state.rooms();
    let mut room = load(&repo, room_id).await?;

    require_dj(&room, &request.player_id, "close the round")?;
    require_active_round(&room, game_id, round_id)?;

    let game = expect_game(&room, game_id)?;
    let round = game.rounds.get(round_id).ok_or_else(|| {
        ServiceError::PhaseMismatch(format!("round `{round_id}` does not exist"))
    })?;
    if round.status != RoundStatus::Voting {
        return Err(ServiceError::PhaseMismatch(format!(
            "round `{round_id}` is not open"
        )));
    }
    if !round.all_voted() {
        return Err(ServiceError::PhaseMismatch(
            "not every player has voted yet".into(),
        ));
    }

    repo.merge_round(room_id, game_id, round_id, None, RoundStatus::Completed)
        .await?;
    for voter in room.non_dj_player_ids(&room.dj_id) {
        repo.put_ready(room_id, &voter, false).await?;
    }
    info!(room = %room_id, round = %round_id, "round closed");
    {
        let game = room
            .games
            .get_mut(game_id)
            .ok_or_else(|| ServiceError::PhaseMismatch(format!("game `{game_id}` does not exist")))?;
        if let Some(round) = game.rounds.get_mut(round_id) {
            round.status = RoundStatus::Completed;
        }
        for player in room.players.values_mut() {
            player.ready = false;
        }
    }

    let game = expect_game(&room, game_id)?;
    if game.completed_rounds() < game.expected_rounds() {
        let voters: Vec<String> = game
            .rounds
            .values()
            .next()
            .map(|first| first.votes.keys().cloned().collect())
            .unwrap_or_default();
        let next = Round::new(game.rounds.len() + 1, voters);
        let next_status = lifecycle::advance(room.status, RoomEvent::NextRound)?;

        repo.put_round(room_id, game_id, &next).await?;
        let mut fields = Map::new();
        fields.insert("status".into(), json(&next_status)?);
        fields.insert("currentRound".into(), Value::String(next.id.clone()));
        repo.merge_room(room_id, fields).await?;

        room.status = next_status;
        room.current_round = next.id.clone();
        if let Some(game) = room.games.get_mut(game_id) {
            game.rounds.insert(next.id.clone(), next);
        }
        return Ok(RoomSnapshot::from(&room));
    }

    settle_game(state, &repo, &mut room, game_id).await?;
    Ok(RoomSnapshot::from(&room))
}

/// Recovery variant of the post-game advance: applies when the active game's
/// rounds are all completed but the room is still in voting, which can only
/// happen if a previous close was interrupted mid-write. DJ-only.
pub async fn advance_after_game(
    state: &SharedState,
    room_id: &str,
    request: PlayerActionRequest,
) -> Result<RoomSnapshot, ServiceError> {
    let _gate = state.lock_room(room_id).await;
    let repo = state.rooms();
    let mut room = load(&repo, room_id).await?;

    require_dj(&room, &request.player_id, "advance the game")?;
    if room.status != RoomStatus::Voting {
        return Err(ServiceError::PhaseMismatch(format!(
            "room is {:?}, nothing to advance",
            room.status
        )));
    }
    let game_id = room.current_game.clone();
    let game = expect_game(&room, &game_id)?;
    if game.completed_rounds() < game.expected_rounds() {
        return Err(ServiceError::PhaseMismatch(
            "the active game still has open rounds".into(),
        ));
    }

    settle_game(state, &repo, &mut room, &game_id).await?;
    Ok(RoomSnapshot::from(&room))
}

/// Dismiss the between-games standings and resume song selection for the
/// game installed at settle time. Only the incoming DJ may acknowledge.
pub async fn acknowledge_summary(
    state: &SharedState,
    room_id: &str,
    request: PlayerActionRequest,
) -> Result<RoomSnapshot, ServiceError> {
    let _gate = state.lock_room(room_id).await;
    let repo = state.rooms();
    let mut room = load(&repo, room_id).await?;

    require_dj(&room, &request.player_id, "dismiss the summary")?;
    let next_status = lifecycle::advance(room.status, RoomEvent::SummaryAcknowledged)?;
    repo.set_status(room_id, next_status).await?;
    info!(room = %room_id, "summary acknowledged");
    room.status = next_status;
    Ok(RoomSnapshot::from(&room))
}

/// Settle a completed game: apply score deltas, then either rotate the DJ
/// into a fresh game and show the summary, or finish the room when every
/// player has held the DJ role.
async fn settle_game(
    state: &SharedState,
    repo: &RoomRepository,
    room: &mut Room,
    game_id: &str,
) -> Result<(), ServiceError> {
    let deltas = scoring::compute_scores(expect_game(room, game_id)?);
    for delta in &deltas {
        if let Some(player) = room.players.get_mut(&delta.player_id) {
            player.score += delta.points;
            repo.put_score(&room.id, &player.id, player.score).await?;
        }
    }

    let last_game = room.games.len() == room.player_count();
    let next_status = lifecycle::advance(room.status, RoomEvent::GameCompleted { last_game })?;

    if next_status == RoomStatus::Finished {
        let mut fields = Map::new();
        fields.insert("status".into(), json(&next_status)?);
        fields.insert("justFinishedGame".into(), Value::String(game_id.into()));
        fields.insert("currentGame".into(), Value::String(String::new()));
        fields.insert("currentRound".into(), Value::String(String::new()));
        repo.merge_room(&room.id, fields).await?;
        info!(room = %room.id, game = %game_id, "room finished");

        room.status = next_status;
        room.just_finished_game = game_id.to_string();
        room.current_game.clear();
        room.current_round.clear();
        return Ok(());
    }

    let Some(next_dj) = room.next_dj().map(|player| player.id.clone()) else {
        error!(room = %room.id, games = room.games.len(), "dj rotation exhausted before the room finished");
        return Err(ServiceError::NoEligibleDj);
    };
    let submitters = if state.config().dj_submits_song {
        room.players.keys().cloned().collect()
    } else {
        room.non_dj_player_ids(&next_dj)
    };
    let voters = room.non_dj_player_ids(&next_dj);
    let game = Game::new(room.games.len() + 1, next_dj.clone(), submitters, voters);

    repo.put_game(&room.id, &game).await?;
    let mut fields = Map::new();
    fields.insert("status".into(), json(&next_status)?);
    fields.insert("djId".into(), Value::String(next_dj.clone()));
    fields.insert("currentGame".into(), Value::String(game.id.clone()));
    fields.insert("currentRound".into(), Value::String(round_key(1)));
    fields.insert("justFinishedGame".into(), Value::String(game_id.into()));
    repo.merge_room(&room.id, fields).await?;
    info!(room = %room.id, game = %game.id, dj = %next_dj, "next game installed");

    room.status = next_status;
    room.dj_id = next_dj;
    room.current_game = game.id.clone();
    room.current_round = round_key(1);
    room.just_finished_game = game_id.to_string();
    room.games.insert(game.id.clone(), game);
    Ok(())
}

async fn load(repo: &RoomRepository, room_id: &str) -> Result<Room, ServiceError> {
    repo.load(room_id)
        .await?
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))
}

fn require_dj(room: &Room, player_id: &str, action: &str) -> Result<(), ServiceError> {
    if room.dj_id != player_id {
        return Err(ServiceError::Unauthorized(format!(
            "only the dj can {action}"
        )));
    }
    Ok(())
}

fn require_active_round(room: &Room, game_id: &str, round_id: &str) -> Result<(), ServiceError> {
    if room.current_game != game_id || room.current_round != round_id {
        return Err(ServiceError::PhaseMismatch(format!(
            "round `{game_id}/{round_id}` is not the active round"
        )));
    }
    Ok(())
}

fn expect_game<'a>(room: &'a Room, game_id: &str) -> Result<&'a Game, ServiceError> {
    room.games
        .get(game_id)
        .ok_or_else(|| ServiceError::PhaseMismatch(format!("game `{game_id}` does not exist")))
}

fn json<T: serde::Serialize>(value: &T) -> Result<Value, ServiceError> {
    serde_json::to_value(value)
        .map_err(|err| ServiceError::Validation(format!("encoding failed: {err}")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::memory::MemoryTree,
        dto::{
            game::{CastVoteRequest, SubmitSongRequest},
            room::{CreateRoomRequest, JoinRoomRequest},
        },
        services::{room_service, vote_service},
        state::{AppState, rooms::GameMode},
    };

    fn test_state() -> SharedState {
        AppState::new(AppConfig::default(), Arc::new(MemoryTree::new()))
    }

    fn act(player: &str) -> PlayerActionRequest {
        PlayerActionRequest {
            player_id: player.into(),
        }
    }

    async fn lobby(state: &SharedState, players: &[&str]) -> String {
        let room = room_service::create_room(
            state,
            CreateRoomRequest {
                player_id: players[0].into(),
                nickname: format!("nick-{}", players[0]),
                game_mode: GameMode::Together,
            },
        )
        .await
        .unwrap();
        for id in &players[1..] {
            room_service::join_room(
                state,
                &room.id,
                JoinRoomRequest {
                    player_id: (*id).into(),
                    nickname: format!("nick-{id}"),
                },
            )
            .await
            .unwrap();
        }
        room.id
    }

    async fn submit_all(state: &SharedState, room_id: &str, game_id: &str, players: &[&str]) {
        for player in players {
            song_service::submit_song(
                state,
                room_id,
                game_id,
                SubmitSongRequest {
                    player_id: (*player).into(),
                    song_id: format!("song-{player}"),
                    song_title: format!("Title {player}"),
                },
            )
            .await
            .unwrap();
        }
    }

    async fn vote_all(
        state: &SharedState,
        room_id: &str,
        game_id: &str,
        round_id: &str,
        votes: &[(&str, &str)],
    ) {
        for (voter, target) in votes {
            vote_service::cast_vote(
                state,
                room_id,
                game_id,
                round_id,
                CastVoteRequest {
                    voter_id: (*voter).into(),
                    target_id: (*target).into(),
                },
            )
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn start_requires_the_dj_and_two_players() {
        let state = test_state();
        let room_id = lobby(&state, &["p1"]).await;
        let err = start_game(&state, &room_id, act("p1")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let room_id = lobby(&state, &["p1", "p2"]).await;
        let err = start_game(&state, &room_id, act("p2")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        let snapshot = start_game(&state, &room_id, act("p1")).await.unwrap();
        assert_eq!(snapshot.status, RoomStatus::SongSelection);
        assert_eq!(snapshot.current_game, "game1");
        assert_eq!(snapshot.current_round, "round1");
    }

    #[tokio::test]
    async fn select_requires_all_submissions() {
        let state = test_state();
        let room_id = lobby(&state, &["p1", "p2", "p3"]).await;
        start_game(&state, &room_id, act("p1")).await.unwrap();
        submit_all(&state, &room_id, "game1", &["p2"]).await;

        let err = select_song(
            &state,
            &room_id,
            "game1",
            "round1",
            SelectSongRequest {
                player_id: "p1".into(),
                suggested_by: "p2".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::PhaseMismatch(_)));
    }

    #[tokio::test]
    async fn close_round_appends_the_next_round() {
        let state = test_state();
        let room_id = lobby(&state, &["p1", "p2", "p3"]).await;
        start_game(&state, &room_id, act("p1")).await.unwrap();
        submit_all(&state, &room_id, "game1", &["p2", "p3"]).await;

        select_song(
            &state,
            &room_id,
            "game1",
            "round1",
            SelectSongRequest {
                player_id: "p1".into(),
                suggested_by: "p2".into(),
            },
        )
        .await
        .unwrap();
        vote_all(
            &state,
            &room_id,
            "game1",
            "round1",
            &[("p2", "p3"), ("p3", "p2")],
        )
        .await;

        let snapshot = close_round(&state, &room_id, "game1", "round1", act("p1"))
            .await
            .unwrap();
        assert_eq!(snapshot.status, RoomStatus::SongSelection);
        assert_eq!(snapshot.current_round, "round2");
        assert_eq!(snapshot.games[0].rounds.len(), 2);
    }

    #[tokio::test]
    async fn close_round_requires_every_vote() {
        let state = test_state();
        let room_id = lobby(&state, &["p1", "p2", "p3"]).await;
        start_game(&state, &room_id, act("p1")).await.unwrap();
        submit_all(&state, &room_id, "game1", &["p2", "p3"]).await;
        select_song(
            &state,
            &room_id,
            "game1",
            "round1",
            SelectSongRequest {
                player_id: "p1".into(),
                suggested_by: "p2".into(),
            },
        )
        .await
        .unwrap();
        vote_all(&state, &room_id, "game1", "round1", &[("p2", "p3")]).await;

        let err = close_round(&state, &room_id, "game1", "round1", act("p1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PhaseMismatch(_)));
    }

    async fn play_round(
        state: &SharedState,
        room_id: &str,
        game_id: &str,
        round_id: &str,
        dj: &str,
        suggested_by: &str,
        votes: &[(&str, &str)],
    ) -> RoomSnapshot {
        select_song(
            state,
            room_id,
            game_id,
            round_id,
            SelectSongRequest {
                player_id: dj.into(),
                suggested_by: suggested_by.into(),
            },
        )
        .await
        .unwrap();
        vote_all(state, room_id, game_id, round_id, votes).await;
        close_round(state, room_id, game_id, round_id, act(dj))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn completed_game_scores_and_rotates_the_dj() {
        let state = test_state();
        let room_id = lobby(&state, &["p1", "p2", "p3"]).await;
        start_game(&state, &room_id, act("p1")).await.unwrap();
        submit_all(&state, &room_id, "game1", &["p2", "p3"]).await;

        // p3 guesses right both rounds, p2 never does.
        play_round(
            &state,
            &room_id,
            "game1",
            "round1",
            "p1",
            "p2",
            &[("p2", "p3"), ("p3", "p2")],
        )
        .await;
        let snapshot = play_round(
            &state,
            &room_id,
            "game1",
            "round2",
            "p1",
            "p3",
            &[("p2", "p2"), ("p3", "p3")],
        )
        .await;

        assert_eq!(snapshot.status, RoomStatus::Summary);
        assert_eq!(snapshot.just_finished_game, "game1");
        assert_eq!(snapshot.current_game, "game2");
        assert_eq!(snapshot.current_round, "round1");
        // p3: one correct guess plus one self-guessed consolation round.
        let scores: Vec<(String, u32)> = snapshot
            .players
            .iter()
            .map(|p| (p.id.clone(), p.score))
            .collect();
        assert!(scores.contains(&("p3".to_string(), 2)));
        assert!(scores.contains(&("p2".to_string(), 0)));
        // Highest scorer among unused players becomes the next dj.
        assert_eq!(snapshot.dj_id, "p3");
    }

    #[tokio::test]
    async fn summary_acknowledgement_is_new_dj_only() {
        let state = test_state();
        let room_id = lobby(&state, &["p1", "p2", "p3"]).await;
        start_game(&state, &room_id, act("p1")).await.unwrap();
        submit_all(&state, &room_id, "game1", &["p2", "p3"]).await;
        play_round(
            &state,
            &room_id,
            "game1",
            "round1",
            "p1",
            "p2",
            &[("p2", "p3"), ("p3", "p2")],
        )
        .await;
        let snapshot = play_round(
            &state,
            &room_id,
            "game1",
            "round2",
            "p1",
            "p3",
            &[("p2", "p3"), ("p3", "p2")],
        )
        .await;
        assert_eq!(snapshot.status, RoomStatus::Summary);
        let new_dj = snapshot.dj_id.clone();
        assert_ne!(new_dj, "p1");

        let err = acknowledge_summary(&state, &room_id, act("p1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        let snapshot = acknowledge_summary(&state, &room_id, act(&new_dj))
            .await
            .unwrap();
        assert_eq!(snapshot.status, RoomStatus::SongSelection);
    }

    #[tokio::test]
    async fn room_finishes_when_every_player_was_dj() {
        let state = test_state();
        let room_id = lobby(&state, &["p1", "p2"]).await;
        start_game(&state, &room_id, act("p1")).await.unwrap();

        // Game 1: p1 is dj, p2 submits and votes alone.
        submit_all(&state, &room_id, "game1", &["p2"]).await;
        let snapshot = play_round(
            &state,
            &room_id,
            "game1",
            "round1",
            "p1",
            "p2",
            &[("p2", "p2")],
        )
        .await;
        assert_eq!(snapshot.status, RoomStatus::Summary);
        assert_eq!(snapshot.dj_id, "p2");

        acknowledge_summary(&state, &room_id, act("p2")).await.unwrap();

        // Game 2: p2 is dj; afterwards the rotation is exhausted.
        submit_all(&state, &room_id, "game2", &["p1"]).await;
        let snapshot = play_round(
            &state,
            &room_id,
            "game2",
            "round1",
            "p2",
            "p1",
            &[("p1", "p1")],
        )
        .await;
        assert_eq!(snapshot.status, RoomStatus::Finished);
        assert_eq!(snapshot.just_finished_game, "game2");
        assert!(snapshot.current_game.is_empty());
        assert!(snapshot.current_round.is_empty());
    }

    #[tokio::test]
    async fn standalone_advance_rejects_open_games() {
        let state = test_state();
        let room_id = lobby(&state, &["p1", "p2", "p3"]).await;
        start_game(&state, &room_id, act("p1")).await.unwrap();
        submit_all(&state, &room_id, "game1", &["p2", "p3"]).await;
        select_song(
            &state,
            &room_id,
            "game1",
            "round1",
            SelectSongRequest {
                player_id: "p1".into(),
                suggested_by: "p2".into(),
            },
        )
        .await
        .unwrap();

        let err = advance_after_game(&state, &room_id, act("p1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PhaseMismatch(_)));
    }

    #[tokio::test]
    async fn standalone_advance_recovers_an_interrupted_close() {
        let state = test_state();
        let room_id = lobby(&state, &["p1", "p2"]).await;
        start_game(&state, &room_id, act("p1")).await.unwrap();
        submit_all(&state, &room_id, "game1", &["p2"]).await;
        select_song(
            &state,
            &room_id,
            "game1",
            "round1",
            SelectSongRequest {
                player_id: "p1".into(),
                suggested_by: "p2".into(),
            },
        )
        .await
        .unwrap();
        vote_all(&state, &room_id, "game1", "round1", &[("p2", "p2")]).await;

        // Simulate a close that persisted the round but never advanced.
        state
            .rooms()
            .merge_round(&room_id, "game1", "round1", None, RoundStatus::Completed)
            .await
            .unwrap();

        let snapshot = advance_after_game(&state, &room_id, act("p1"))
            .await
            .unwrap();
        assert_eq!(snapshot.status, RoomStatus::Summary);
        assert_eq!(snapshot.dj_id, "p2");
        assert_eq!(snapshot.current_game, "game2");

        // A second advance is a replay and must be rejected.
        let err = advance_after_game(&state, &room_id, act("p2"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PhaseMismatch(_)));
    }
}
