//! Shared application state.

/// Pure room lifecycle state machine.
pub mod lifecycle;
/// Domain model for rooms, games, and rounds.
pub mod rooms;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{config::AppConfig, dao::{rooms::RoomRepository, tree::DocumentTree}};

/// Shared handle to [`AppState`].
pub type SharedState = Arc<AppState>;

/// Central application state: configuration, the store handle, and the
/// per-room write gates that serialize every mutating operation for a room.
pub struct AppState {
    config: AppConfig,
    tree: Arc<dyn DocumentTree>,
    write_gates: DashMap<String, Arc<Mutex<()>>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be
    /// cloned cheaply.
    pub fn new(config: AppConfig, tree: Arc<dyn DocumentTree>) -> SharedState {
        Arc::new(Self {
            config,
            tree,
            write_gates: DashMap::new(),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Repository handle over the shared room tree.
    pub fn rooms(&self) -> RoomRepository {
        RoomRepository::new(self.tree.clone())
    }

    /// Acquire the room's write gate. Every mutating operation for a room
    /// holds this guard for its full load-validate-mutate-persist cycle, so
    /// writers for one room are strictly serialized while read-only
    /// snapshots stay concurrent.
    pub async fn lock_room(&self, room_id: &str) -> OwnedMutexGuard<()> {
        let gate = self
            .write_gates
            .entry(room_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        gate.lock_owned().await
    }

    /// Drop the write gate of a room that no longer exists.
    pub fn forget_room(&self, room_id: &str) {
        self.write_gates.remove(room_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::memory::MemoryTree;

    #[tokio::test]
    async fn write_gates_are_per_room() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryTree::new()));

        let guard_a = state.lock_room("AAAAAA").await;
        // A different room locks independently.
        let _guard_b = state.lock_room("BBBBBB").await;

        // The same room's gate is held.
        assert!(
            state
                .write_gates
                .get("AAAAAA")
                .unwrap()
                .clone()
                .try_lock_owned()
                .is_err()
        );
        drop(guard_a);
        assert!(
            state
                .write_gates
                .get("AAAAAA")
                .unwrap()
                .clone()
                .try_lock_owned()
                .is_ok()
        );
    }
}
