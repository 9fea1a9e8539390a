//! Domain model for rooms, games, and rounds.
//!
//! Wire names are camelCase (`djId`, `playerSongs`, ...) to match the shape
//! of the shared room tree. Collections are insertion
//! ordered: `games` keys run `game1..gameK` and `rounds` keys `round1..roundM`
//! with no gaps.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Opaque client-established player identity.
pub type PlayerId = String;

/// Phase a room is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Players are gathering; joins are accepted only here.
    Waiting,
    /// Players submit songs; the DJ picks the next one to play.
    SongSelection,
    /// A song is playing and non-DJ players vote on its suggester.
    Voting,
    /// Standings are displayed between games.
    Summary,
    /// Terminal state; the room awaits housekeeping.
    Finished,
}

/// Phase of a single round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    /// Created but not yet active.
    Waiting,
    /// Waiting for the DJ to pick the round's song.
    SongSelection,
    /// Votes are being cast.
    Voting,
    /// Closed; immutable from here on.
    Completed,
}

/// Orthogonal room configuration carried for clients; no behavioral branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Everyone listens on one shared device.
    Together,
    /// Everyone listens on their own device.
    Separate,
}

/// One participant of a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Identity established by the client.
    pub id: PlayerId,
    /// Display nickname (validated to be at least three characters).
    pub name: String,
    /// Accumulated score; never decreases within a session.
    pub score: u32,
    /// Per-round readiness flag, reset at round boundaries.
    pub ready: bool,
}

impl Player {
    /// Fresh player with a zero score.
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            score: 0,
            ready: false,
        }
    }
}

/// A song proposal sitting in a game's submission ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSong {
    /// External identifier of the track.
    pub song_id: String,
    /// Display title of the track.
    pub song_title: String,
    /// Set once the DJ has played this submission in a round.
    pub was_played: bool,
}

/// The song attached to a round once the DJ picked it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSong {
    /// External identifier of the track.
    pub song_id: String,
    /// Display title of the track.
    pub song_title: String,
    /// Player whose submission this is; the voting target to guess.
    pub suggested_by: PlayerId,
}

/// One song-guessing cycle within a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    /// Sequential key, `round1..roundM`.
    pub id: String,
    /// The played song, absent until the DJ picks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song: Option<RoundSong>,
    /// Voter id to guessed player id; pre-populated with `None` for every
    /// eligible (non-DJ) voter.
    pub votes: IndexMap<PlayerId, Option<PlayerId>>,
    /// Phase of this round.
    pub status: RoundStatus,
}

impl Round {
    /// Build a fresh round with empty votes for the given voters.
    pub fn new(number: usize, voters: impl IntoIterator<Item = PlayerId>) -> Self {
        Self {
            id: round_key(number),
            song: None,
            votes: voters.into_iter().map(|id| (id, None)).collect(),
            status: RoundStatus::SongSelection,
        }
    }

    /// Whether every voter in this round's roster has a non-empty vote.
    pub fn all_voted(&self) -> bool {
        self.votes.values().all(|vote| vote.is_some())
    }
}

/// One DJ tenure: a submission ledger plus as many rounds as submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Sequential key, `game1..gameK`.
    pub id: String,
    /// DJ for this game; never repeats across games of one room.
    pub dj_id: PlayerId,
    /// Submission ledger: player id to proposal, `None` until submitted.
    pub player_songs: IndexMap<PlayerId, Option<PlayerSong>>,
    /// Rounds keyed `round1..roundM`.
    pub rounds: IndexMap<String, Round>,
}

impl Game {
    /// Build a new game with an empty ledger for `submitters` and a first
    /// round with empty votes for `voters`.
    pub fn new(
        number: usize,
        dj_id: PlayerId,
        submitters: impl IntoIterator<Item = PlayerId>,
        voters: impl IntoIterator<Item = PlayerId>,
    ) -> Self {
        let mut rounds = IndexMap::new();
        let round = Round::new(1, voters);
        rounds.insert(round.id.clone(), round);
        Self {
            id: game_key(number),
            dj_id,
            player_songs: submitters.into_iter().map(|id| (id, None)).collect(),
            rounds,
        }
    }

    /// Whether every player on `roster` has a non-empty ledger entry.
    pub fn all_submitted<'a>(&self, roster: impl IntoIterator<Item = &'a PlayerId>) -> bool {
        roster
            .into_iter()
            .all(|id| matches!(self.player_songs.get(id), Some(Some(_))))
    }

    /// Submissions the DJ has not played yet.
    pub fn unplayed_submissions(&self) -> impl Iterator<Item = (&PlayerId, &PlayerSong)> {
        self.player_songs.iter().filter_map(|(id, entry)| {
            entry
                .as_ref()
                .filter(|song| !song.was_played)
                .map(|song| (id, song))
        })
    }

    /// Number of rounds this game will run: one per ledger entry.
    pub fn expected_rounds(&self) -> usize {
        self.player_songs.len()
    }

    /// Number of rounds already closed.
    pub fn completed_rounds(&self) -> usize {
        self.rounds
            .values()
            .filter(|round| round.status == RoundStatus::Completed)
            .count()
    }
}

/// One play session identified by a short human-enterable code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Room code.
    pub id: String,
    /// Current lifecycle phase.
    pub status: RoomStatus,
    /// Player currently acting as DJ; keys into `players`.
    pub dj_id: PlayerId,
    /// Participants keyed by id, insertion ordered.
    pub players: IndexMap<PlayerId, Player>,
    /// Games keyed `game1..gameK`, K at most the player count.
    pub games: IndexMap<String, Game>,
    /// Key of the active game, empty when not applicable.
    #[serde(default)]
    pub current_game: String,
    /// Key of the active round, empty when not applicable.
    #[serde(default)]
    pub current_round: String,
    /// Key of the most recently completed game, selects what to summarize.
    #[serde(default)]
    pub just_finished_game: String,
    /// Orthogonal play-mode configuration.
    pub game_mode: GameMode,
    /// Creation timestamp, unix milliseconds.
    #[serde(default)]
    pub created_at_ms: u64,
}

impl Room {
    /// Build a fresh waiting room with the initiator installed as DJ.
    pub fn new(id: String, initiator: Player, game_mode: GameMode, created_at_ms: u64) -> Self {
        let dj_id = initiator.id.clone();
        let mut players = IndexMap::new();
        players.insert(initiator.id.clone(), initiator);
        Self {
            id,
            status: RoomStatus::Waiting,
            dj_id,
            players,
            games: IndexMap::new(),
            current_game: String::new(),
            current_round: String::new(),
            just_finished_game: String::new(),
            game_mode,
            created_at_ms,
        }
    }

    /// Number of participants.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Player ids that have already held the DJ role in this room.
    pub fn used_dj_ids(&self) -> Vec<&PlayerId> {
        self.games.values().map(|game| &game.dj_id).collect()
    }

    /// Pick the next DJ: players never used as DJ, highest score first,
    /// ties broken by player id ascending so the choice is deterministic.
    /// `None` means the rotation is exhausted.
    pub fn next_dj(&self) -> Option<&Player> {
        let used = self.used_dj_ids();
        let mut candidates: Vec<&Player> = self
            .players
            .values()
            .filter(|player| !used.contains(&&player.id))
            .collect();
        candidates.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        candidates.first().copied()
    }

    /// Players other than `dj_id`, in roster order.
    pub fn non_dj_player_ids(&self, dj_id: &str) -> Vec<PlayerId> {
        self.players
            .keys()
            .filter(|id| id.as_str() != dj_id)
            .cloned()
            .collect()
    }
}

/// Sequential key for game `number` (1-based).
pub fn game_key(number: usize) -> String {
    format!("game{number}")
}

/// Sequential key for round `number` (1-based).
pub fn round_key(number: usize) -> String {
    format!("round{number}")
}

/// Extract the 1-based number from a `game{N}` key.
pub fn game_number(key: &str) -> Option<usize> {
    key.strip_prefix("game")?.parse().ok()
}

/// Extract the 1-based number from a `round{N}` key.
pub fn round_number(key: &str) -> Option<usize> {
    key.strip_prefix("round")?.parse().ok()
}
