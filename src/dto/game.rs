//! Game, submission, and vote payloads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::validation::validate_player_id;

/// A player's song proposal for the current game.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSongRequest {
    /// Submitting player.
    #[validate(custom(function = validate_player_id))]
    pub player_id: String,
    /// External identifier of the track.
    #[validate(length(min = 1))]
    pub song_id: String,
    /// Display title of the track.
    #[validate(length(min = 1))]
    pub song_title: String,
}

/// DJ's pick of which submission to play next.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectSongRequest {
    /// Acting DJ.
    #[validate(custom(function = validate_player_id))]
    pub player_id: String,
    /// Whose submission to play.
    #[validate(custom(function = validate_player_id))]
    pub suggested_by: String,
}

/// Submission progress of the current game.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionProgressResponse {
    /// Game key the progress refers to.
    pub game_id: String,
    /// Whether every required player has submitted.
    pub all_submitted: bool,
    /// Players whose submission is still missing.
    pub pending: Vec<String>,
}

/// One unplayed submission shown to the DJ when picking the next song.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnplayedSongEntry {
    /// Suggesting player.
    pub suggested_by: String,
    /// External identifier of the track.
    pub song_id: String,
    /// Display title of the track.
    pub song_title: String,
}

/// DJ-only listing of the submissions still available to play.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnplayedSongsResponse {
    /// Game key the listing refers to.
    pub game_id: String,
    /// Submissions not yet played, in roster order.
    pub songs: Vec<UnplayedSongEntry>,
}

/// Identifies the requesting player on read-only endpoints.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PlayerQuery {
    /// Requesting player.
    pub player_id: String,
}

/// A voter's guess at the suggester of the playing song.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    /// Voting player.
    #[validate(custom(function = validate_player_id))]
    pub voter_id: String,
    /// Guessed suggester.
    #[validate(custom(function = validate_player_id))]
    pub target_id: String,
}

/// Voting progress of a round.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteProgressResponse {
    /// Round key the progress refers to.
    pub round_id: String,
    /// Whether every eligible voter has cast a vote.
    pub all_voted: bool,
    /// Voters whose vote is still missing.
    pub pending: Vec<String>,
}
