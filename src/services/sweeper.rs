//! Periodic removal of finished rooms.

use tracing::{info, warn};

use crate::{
    error::ServiceError,
    state::{SharedState, rooms::RoomStatus},
};

/// Background loop deleting finished rooms on the configured interval.
/// Spawned once at startup; never returns.
pub async fn run(state: SharedState) {
    loop {
        tokio::time::sleep(state.config().sweep_interval).await;
        match sweep(&state).await {
            Ok(0) => {}
            Ok(removed) => info!(removed, "swept rooms"),
            Err(err) => warn!(error = %err, "room sweep failed"),
        }
    }
}

/// One sweep pass. Holds each room's write gate while deciding, so a sweep
/// never races an in-flight mutation on the same room.
pub async fn sweep(state: &SharedState) -> Result<usize, ServiceError> {
    let repo = state.rooms();
    let mut removed = 0;
    for room_id in repo.room_ids().await? {
        let _gate = state.lock_room(&room_id).await;
        let Some(room) = repo.load(&room_id).await? else {
            state.forget_room(&room_id);
            continue;
        };
        if state.config().sweep_all_rooms || room.status == RoomStatus::Finished {
            repo.delete(&room_id).await?;
            state.forget_room(&room_id);
            removed += 1;
        }
    }
    Ok(removed)
}
