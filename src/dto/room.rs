//! Room registry payloads and snapshots.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::validation::{validate_nickname, validate_player_id},
    state::rooms::{Game, GameMode, Player, Room, RoomStatus, Round, RoundStatus},
};

/// Request to open a new room.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    /// Client-established identity of the initiator.
    #[validate(custom(function = validate_player_id))]
    pub player_id: String,
    /// Initiator's display nickname.
    #[validate(custom(function = validate_nickname))]
    pub nickname: String,
    /// How the group listens to the played songs.
    pub game_mode: GameMode,
}

/// Request to join an existing room.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    /// Client-established identity of the joiner.
    #[validate(custom(function = validate_player_id))]
    pub player_id: String,
    /// Joiner's display nickname.
    #[validate(custom(function = validate_nickname))]
    pub nickname: String,
}

/// Identifies the acting player for DJ-only or player-scoped actions that
/// carry no other payload.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerActionRequest {
    /// Client-established identity of the actor.
    #[validate(custom(function = validate_player_id))]
    pub player_id: String,
}

/// One participant as exposed to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    /// Player identity.
    pub id: String,
    /// Display nickname.
    pub name: String,
    /// Accumulated score.
    pub score: u32,
    /// Per-round readiness flag.
    pub ready: bool,
}

impl From<&Player> for PlayerSnapshot {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            score: player.score,
            ready: player.ready,
        }
    }
}

/// One submission ledger entry as exposed to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSnapshot {
    /// Submitting player.
    pub player_id: String,
    /// Whether the submission has arrived.
    pub submitted: bool,
    /// Whether the DJ already played it.
    pub was_played: bool,
}

/// One cast (or pending) vote as exposed to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteSnapshot {
    /// Voting player.
    pub voter_id: String,
    /// Guessed suggester, absent while the vote is pending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guess: Option<String>,
}

/// The played song of a round. The suggester is withheld while voting is
/// still open so the answer cannot leak through a snapshot.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoundSongSnapshot {
    /// External identifier of the track.
    pub song_id: String,
    /// Display title of the track.
    pub song_title: String,
    /// Player whose submission this is; only revealed once the round closed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_by: Option<String>,
}

/// One round as exposed to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoundSnapshot {
    /// Round key, `round1..roundM`.
    pub id: String,
    /// The played song, absent until the DJ picks one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song: Option<RoundSongSnapshot>,
    /// Votes in roster order.
    pub votes: Vec<VoteSnapshot>,
    /// Phase of this round.
    pub status: RoundStatus,
}

impl From<&Round> for RoundSnapshot {
    fn from(round: &Round) -> Self {
        let completed = round.status == RoundStatus::Completed;
        Self {
            id: round.id.clone(),
            song: round.song.as_ref().map(|song| RoundSongSnapshot {
                song_id: song.song_id.clone(),
                song_title: song.song_title.clone(),
                suggested_by: completed.then(|| song.suggested_by.clone()),
            }),
            votes: round
                .votes
                .iter()
                .map(|(voter, guess)| VoteSnapshot {
                    voter_id: voter.clone(),
                    guess: guess.clone(),
                })
                .collect(),
            status: round.status,
        }
    }
}

/// One game as exposed to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Game key, `game1..gameK`.
    pub id: String,
    /// DJ for this game.
    pub dj_id: String,
    /// Submission ledger in roster order; song details stay hidden.
    pub submissions: Vec<SubmissionSnapshot>,
    /// Rounds in play order.
    pub rounds: Vec<RoundSnapshot>,
}

impl From<&Game> for GameSnapshot {
    fn from(game: &Game) -> Self {
        Self {
            id: game.id.clone(),
            dj_id: game.dj_id.clone(),
            submissions: game
                .player_songs
                .iter()
                .map(|(player_id, entry)| SubmissionSnapshot {
                    player_id: player_id.clone(),
                    submitted: entry.is_some(),
                    was_played: entry.as_ref().is_some_and(|song| song.was_played),
                })
                .collect(),
            rounds: game.rounds.values().map(RoundSnapshot::from).collect(),
        }
    }
}

/// Full client-facing view of a room.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    /// Room code.
    pub id: String,
    /// Current lifecycle phase.
    pub status: RoomStatus,
    /// Player currently acting as DJ.
    pub dj_id: String,
    /// Participants in join order.
    pub players: Vec<PlayerSnapshot>,
    /// Games in play order.
    pub games: Vec<GameSnapshot>,
    /// Key of the active game, empty when not applicable.
    pub current_game: String,
    /// Key of the active round, empty when not applicable.
    pub current_round: String,
    /// Key of the most recently completed game.
    pub just_finished_game: String,
    /// Play-mode configuration.
    pub game_mode: GameMode,
    /// RFC3339 creation timestamp.
    pub created_at: String,
}

impl From<&Room> for RoomSnapshot {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            status: room.status,
            dj_id: room.dj_id.clone(),
            players: room.players.values().map(PlayerSnapshot::from).collect(),
            games: room.games.values().map(GameSnapshot::from).collect(),
            current_game: room.current_game.clone(),
            current_round: room.current_round.clone(),
            just_finished_game: room.just_finished_game.clone(),
            game_mode: room.game_mode,
            created_at: super::format_unix_ms(room.created_at_ms),
        }
    }
}
