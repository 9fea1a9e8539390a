//! Typed repository over the room subtree.
//!
//! Wraps the five tree primitives into record-level operations so services
//! never touch raw paths. Writes are targeted: pointer/status changes use
//! merge-updates, new games/rounds/players use subtree sets, and room
//! deletion is a null tombstone.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::{
    dao::{
        storage::{StorageError, StorageResult},
        tree::{DocumentTree, TreeChange},
    },
    state::rooms::{Game, Player, PlayerSong, Room, RoomStatus, Round, RoundStatus},
};

/// Repository handle; cheap to construct per operation.
#[derive(Clone)]
pub struct RoomRepository {
    tree: Arc<dyn DocumentTree>,
}

impl RoomRepository {
    /// Wrap a tree handle.
    pub fn new(tree: Arc<dyn DocumentTree>) -> Self {
        Self { tree }
    }

    fn room_path(room_id: &str) -> String {
        format!("rooms/{room_id}")
    }

    fn game_path(room_id: &str, game_id: &str) -> String {
        format!("rooms/{room_id}/games/{game_id}")
    }

    fn round_path(room_id: &str, game_id: &str, round_id: &str) -> String {
        format!("rooms/{room_id}/games/{game_id}/rounds/{round_id}")
    }

    /// Whether the room exists.
    pub async fn exists(&self, room_id: &str) -> StorageResult<bool> {
        self.tree.exists(Self::room_path(room_id)).await
    }

    /// Point read of a full room record.
    pub async fn load(&self, room_id: &str) -> StorageResult<Option<Room>> {
        let path = Self::room_path(room_id);
        let Some(value) = self.tree.read(path.clone()).await? else {
            return Ok(None);
        };
        let room =
            serde_json::from_value(value).map_err(|err| StorageError::corrupt(path, err))?;
        Ok(Some(room))
    }

    /// Replace the whole room record (creation).
    pub async fn create(&self, room: &Room) -> StorageResult<()> {
        let value = to_value(room)?;
        self.tree.set(Self::room_path(&room.id), Some(value)).await
    }

    /// Tombstone the room record wholesale.
    pub async fn delete(&self, room_id: &str) -> StorageResult<()> {
        self.tree.set(Self::room_path(room_id), None).await
    }

    /// Upsert one player record.
    pub async fn put_player(&self, room_id: &str, player: &Player) -> StorageResult<()> {
        let path = format!("rooms/{room_id}/players/{}", player.id);
        self.tree.set(path, Some(to_value(player)?)).await
    }

    /// Merge named top-level fields of the room record (status, pointers,
    /// DJ id) without clobbering siblings.
    pub async fn merge_room(&self, room_id: &str, fields: Map<String, Value>) -> StorageResult<()> {
        self.tree.update(Self::room_path(room_id), fields).await
    }

    /// Convenience merge of just the room status.
    pub async fn set_status(&self, room_id: &str, status: RoomStatus) -> StorageResult<()> {
        let mut fields = Map::new();
        fields.insert("status".into(), to_value(&status)?);
        self.merge_room(room_id, fields).await
    }

    /// Write a whole game record (new game with its first round).
    pub async fn put_game(&self, room_id: &str, game: &Game) -> StorageResult<()> {
        self.tree
            .set(Self::game_path(room_id, &game.id), Some(to_value(game)?))
            .await
    }

    /// Write a whole round record (appending the next round of a game).
    pub async fn put_round(&self, room_id: &str, game_id: &str, round: &Round) -> StorageResult<()> {
        self.tree
            .set(
                Self::round_path(room_id, game_id, &round.id),
                Some(to_value(round)?),
            )
            .await
    }

    /// Merge the round's song and status (DJ picked a song).
    pub async fn merge_round(
        &self,
        room_id: &str,
        game_id: &str,
        round_id: &str,
        song: Option<&crate::state::rooms::RoundSong>,
        status: RoundStatus,
    ) -> StorageResult<()> {
        let mut fields = Map::new();
        if let Some(song) = song {
            fields.insert("song".into(), to_value(song)?);
        }
        fields.insert("status".into(), to_value(&status)?);
        self.tree
            .update(Self::round_path(room_id, game_id, round_id), fields)
            .await
    }

    /// Upsert one submission ledger entry.
    pub async fn put_player_song(
        &self,
        room_id: &str,
        game_id: &str,
        player_id: &str,
        song: &PlayerSong,
    ) -> StorageResult<()> {
        let path = format!(
            "rooms/{room_id}/games/{game_id}/playerSongs/{player_id}"
        );
        self.tree.set(path, Some(to_value(song)?)).await
    }

    /// Upsert one vote; re-voting overwrites the previous guess.
    pub async fn put_vote(
        &self,
        room_id: &str,
        game_id: &str,
        round_id: &str,
        voter_id: &str,
        target_id: &str,
    ) -> StorageResult<()> {
        let mut fields = Map::new();
        fields.insert(voter_id.into(), Value::String(target_id.into()));
        let path = format!("{}/votes", Self::round_path(room_id, game_id, round_id));
        self.tree.update(path, fields).await
    }

    /// Merge a player's readiness flag.
    pub async fn put_ready(&self, room_id: &str, player_id: &str, ready: bool) -> StorageResult<()> {
        let mut fields = Map::new();
        fields.insert("ready".into(), Value::Bool(ready));
        let path = format!("rooms/{room_id}/players/{player_id}");
        self.tree.update(path, fields).await
    }

    /// Merge a player's new score.
    pub async fn put_score(&self, room_id: &str, player_id: &str, score: u32) -> StorageResult<()> {
        let mut fields = Map::new();
        fields.insert("score".into(), Value::from(score));
        let path = format!("rooms/{room_id}/players/{player_id}");
        self.tree.update(path, fields).await
    }

    /// Ids of every stored room (housekeeping scan).
    pub async fn room_ids(&self) -> StorageResult<Vec<String>> {
        let Some(value) = self.tree.read("rooms".into()).await? else {
            return Ok(Vec::new());
        };
        let Value::Object(rooms) = value else {
            return Ok(Vec::new());
        };
        Ok(rooms.keys().cloned().collect())
    }

    /// Subscribe to every change under the room's subtree.
    pub fn watch(&self, room_id: &str) -> broadcast::Receiver<TreeChange> {
        self.tree.subscribe(Self::room_path(room_id))
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> StorageResult<Value> {
    serde_json::to_value(value)
        .map_err(|err| StorageError::corrupt(String::from("<encode>"), err))
}
