//! Voting operations.

use tracing::info;

use crate::{
    dto::game::{CastVoteRequest, VoteProgressResponse},
    error::ServiceError,
    state::{
        SharedState,
        rooms::{PlayerId, Round, RoundStatus},
    },
};

/// Cast (or change) a vote for the active round. Re-voting overwrites the
/// previous guess until the round closes.
pub async fn cast_vote(
    state: &SharedState,
    room_id: &str,
    game_id: &str,
    round_id: &str,
    request: CastVoteRequest,
) -> Result<VoteProgressResponse, ServiceError> {
    let _gate = state.lock_room(room_id).await;
    let repo = state.rooms();
    let mut room = repo
        .load(room_id)
        .await?
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;

    if room.current_game != game_id || room.current_round != round_id {
        return Err(ServiceError::PhaseMismatch(format!(
            "round `{game_id}/{round_id}` is not the active round"
        )));
    }
    if !room.players.contains_key(&request.target_id) {
        return Err(ServiceError::Validation(format!(
            "guessed player `{}` is not in room `{room_id}`",
            request.target_id
        )));
    }

    let late_joiners_exempt = state.config().late_joiners_exempt;
    let in_room = room.players.contains_key(&request.voter_id);
    let game = room
        .games
        .get_mut(game_id)
        .ok_or_else(|| ServiceError::PhaseMismatch(format!("game `{game_id}` does not exist")))?;
    if request.voter_id == game.dj_id {
        return Err(ServiceError::Unauthorized("the dj does not vote".into()));
    }
    let round = game
        .rounds
        .get_mut(round_id)
        .ok_or_else(|| ServiceError::PhaseMismatch(format!("round `{round_id}` does not exist")))?;
    if round.status != RoundStatus::Voting {
        return Err(ServiceError::PhaseMismatch(format!(
            "round `{round_id}` is not open for votes"
        )));
    }

    let eligible = if late_joiners_exempt {
        round.votes.contains_key(&request.voter_id)
    } else {
        in_room
    };
    if !eligible {
        return Err(ServiceError::Unauthorized(format!(
            "player `{}` is not an eligible voter in round `{round_id}`",
            request.voter_id
        )));
    }

    repo.put_vote(room_id, game_id, round_id, &request.voter_id, &request.target_id)
        .await?;
    repo.put_ready(room_id, &request.voter_id, true).await?;
    info!(room = %room_id, round = %round_id, voter = %request.voter_id, "vote cast");
    round
        .votes
        .insert(request.voter_id.clone(), Some(request.target_id));

    Ok(progress_of(round))
}

/// How far along voting is for a round. Read-only.
pub async fn vote_progress(
    state: &SharedState,
    room_id: &str,
    game_id: &str,
    round_id: &str,
) -> Result<VoteProgressResponse, ServiceError> {
    let room = state
        .rooms()
        .load(room_id)
        .await?
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;
    let round = room
        .games
        .get(game_id)
        .and_then(|game| game.rounds.get(round_id))
        .ok_or_else(|| {
            ServiceError::PhaseMismatch(format!("round `{game_id}/{round_id}` does not exist"))
        })?;
    Ok(progress_of(round))
}

fn progress_of(round: &Round) -> VoteProgressResponse {
    let pending: Vec<PlayerId> = round
        .votes
        .iter()
        .filter(|(_, guess)| guess.is_none())
        .map(|(voter, _)| voter.clone())
        .collect();
    VoteProgressResponse {
        round_id: round.id.clone(),
        all_voted: pending.is_empty(),
        pending,
    }
}
