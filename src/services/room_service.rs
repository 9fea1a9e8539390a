//! Room registry operations: create, join, close, snapshot.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use tracing::info;

use crate::{
    dao::storage::StorageError,
    dto::room::{CreateRoomRequest, JoinRoomRequest, PlayerActionRequest, RoomSnapshot},
    error::ServiceError,
    state::{
        SharedState,
        rooms::{Player, Room, RoomStatus},
    },
};

/// Characters used in generated room codes. Ambiguous glyphs (O/0, I/1) are
/// left out so codes survive being read aloud.
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Collision retries before giving up on code generation.
const MAX_CODE_ATTEMPTS: usize = 32;

/// Create a new room with the initiator installed as first player and DJ.
pub async fn create_room(
    state: &SharedState,
    request: CreateRoomRequest,
) -> Result<RoomSnapshot, ServiceError> {
    if request.player_id.trim().is_empty() {
        return Err(ServiceError::MissingIdentity);
    }
    let repo = state.rooms();

    let mut code = None;
    for _ in 0..MAX_CODE_ATTEMPTS {
        let candidate = random_code(state.config().room_code_length);
        if !repo.exists(&candidate).await? {
            code = Some(candidate);
            break;
        }
    }
    let Some(code) = code else {
        return Err(ServiceError::Unavailable(StorageError::unavailable(
            "room code space exhausted",
            std::io::Error::other("code generation retries exceeded"),
        )));
    };

    let initiator = Player::new(request.player_id, request.nickname.trim().to_string());
    let room = Room::new(code, initiator, request.game_mode, unix_millis());

    let _gate = state.lock_room(&room.id).await;
    repo.create(&room).await?;
    info!(room = %room.id, dj = %room.dj_id, "room created");
    Ok(RoomSnapshot::from(&room))
}

/// Join an existing room; only allowed while the room is waiting. Rejoining
/// with a known player id is a no-op.
pub async fn join_room(
    state: &SharedState,
    room_id: &str,
    request: JoinRoomRequest,
) -> Result<RoomSnapshot, ServiceError> {
    if request.player_id.trim().is_empty() {
        return Err(ServiceError::MissingIdentity);
    }

    let _gate = state.lock_room(room_id).await;
    let repo = state.rooms();
    let mut room = repo
        .load(room_id)
        .await?
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;

    if room.players.contains_key(&request.player_id) {
        return Ok(RoomSnapshot::from(&room));
    }
    if room.status != RoomStatus::Waiting {
        return Err(ServiceError::GameAlreadyStarted(room_id.to_string()));
    }

    let player = Player::new(request.player_id, request.nickname.trim().to_string());
    repo.put_player(room_id, &player).await?;
    info!(room = %room.id, player = %player.id, "player joined");
    room.players.insert(player.id.clone(), player);
    Ok(RoomSnapshot::from(&room))
}

/// Delete a room outright. Only the current DJ may close a room.
pub async fn close_room(
    state: &SharedState,
    room_id: &str,
    request: PlayerActionRequest,
) -> Result<(), ServiceError> {
    let _gate = state.lock_room(room_id).await;
    let repo = state.rooms();
    let room = repo
        .load(room_id)
        .await?
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;

    if room.dj_id != request.player_id {
        return Err(ServiceError::Unauthorized(
            "only the dj can close the room".into(),
        ));
    }

    repo.delete(room_id).await?;
    state.forget_room(room_id);
    info!(room = %room_id, "room closed");
    Ok(())
}

/// Read-only view of a room; taken without the write gate.
pub async fn snapshot(state: &SharedState, room_id: &str) -> Result<RoomSnapshot, ServiceError> {
    let room = state
        .rooms()
        .load(room_id)
        .await?
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;
    Ok(RoomSnapshot::from(&room))
}

fn random_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let index = rng.random_range(0..ROOM_CODE_ALPHABET.len());
            ROOM_CODE_ALPHABET[index] as char
        })
        .collect()
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::memory::MemoryTree,
        state::{AppState, rooms::GameMode},
    };

    fn test_state() -> SharedState {
        AppState::new(AppConfig::default(), Arc::new(MemoryTree::new()))
    }

    fn create_request(player_id: &str) -> CreateRoomRequest {
        CreateRoomRequest {
            player_id: player_id.into(),
            nickname: format!("nick-{player_id}"),
            game_mode: GameMode::Together,
        }
    }

    #[tokio::test]
    async fn create_installs_initiator_as_dj() {
        let state = test_state();
        let snapshot = create_room(&state, create_request("p1")).await.unwrap();
        assert_eq!(snapshot.dj_id, "p1");
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.id.len(), state.config().room_code_length);
        assert!(
            snapshot
                .id
                .bytes()
                .all(|byte| ROOM_CODE_ALPHABET.contains(&byte))
        );
    }

    #[tokio::test]
    async fn join_is_idempotent_per_player_id() {
        let state = test_state();
        let room = create_room(&state, create_request("p1")).await.unwrap();

        let join = JoinRoomRequest {
            player_id: "p2".into(),
            nickname: "bob".into(),
        };
        let snapshot = join_room(&state, &room.id, join).await.unwrap();
        assert_eq!(snapshot.players.len(), 2);

        let rejoin = JoinRoomRequest {
            player_id: "p2".into(),
            nickname: "bob again".into(),
        };
        let snapshot = join_room(&state, &room.id, rejoin).await.unwrap();
        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(snapshot.players[1].name, "bob");
    }

    #[tokio::test]
    async fn join_rejected_once_the_game_started() {
        let state = test_state();
        let room = create_room(&state, create_request("p1")).await.unwrap();
        state
            .rooms()
            .set_status(&room.id, RoomStatus::SongSelection)
            .await
            .unwrap();

        let join = JoinRoomRequest {
            player_id: "p2".into(),
            nickname: "bob".into(),
        };
        let err = join_room(&state, &room.id, join).await.unwrap_err();
        assert!(matches!(err, ServiceError::GameAlreadyStarted(_)));
    }

    #[tokio::test]
    async fn only_the_dj_can_close() {
        let state = test_state();
        let room = create_room(&state, create_request("p1")).await.unwrap();
        join_room(
            &state,
            &room.id,
            JoinRoomRequest {
                player_id: "p2".into(),
                nickname: "bob".into(),
            },
        )
        .await
        .unwrap();

        let err = close_room(
            &state,
            &room.id,
            PlayerActionRequest {
                player_id: "p2".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        close_room(
            &state,
            &room.id,
            PlayerActionRequest {
                player_id: "p1".into(),
            },
        )
        .await
        .unwrap();
        let err = snapshot(&state, &room.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::RoomNotFound(_)));
    }

    #[tokio::test]
    async fn missing_identity_is_rejected() {
        let state = test_state();
        let err = create_room(&state, create_request("  ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingIdentity));
    }
}
