//! In-process [`DocumentTree`] backend.
//!
//! Holds the whole tree as one `serde_json::Value` object behind an async
//! lock and fans change notifications out over per-subscriber broadcast
//! channels. Latency is in-process, but the backend still speaks the same
//! five primitives a remote document store would.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tokio::sync::{RwLock, broadcast};

use crate::dao::{
    storage::StorageResult,
    tree::{DocumentTree, TreeChange, paths_overlap},
};

/// Capacity of each subscriber's change channel.
const WATCH_CAPACITY: usize = 32;

/// In-memory document tree.
pub struct MemoryTree {
    root: Arc<RwLock<Value>>,
    watchers: Arc<DashMap<u64, (String, broadcast::Sender<TreeChange>)>>,
    next_watcher: Arc<std::sync::atomic::AtomicU64>,
}

impl MemoryTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            root: Arc::new(RwLock::new(Value::Object(Map::new()))),
            watchers: Arc::new(DashMap::new()),
            next_watcher: Arc::new(std::sync::atomic::AtomicU64::new(0)),
        }
    }

    fn notify(watchers: &DashMap<u64, (String, broadcast::Sender<TreeChange>)>, path: &str) {
        let mut dead = Vec::new();
        for entry in watchers.iter() {
            let (prefix, sender) = entry.value();
            if !paths_overlap(prefix, path) {
                continue;
            }
            if sender.receiver_count() == 0 {
                dead.push(*entry.key());
                continue;
            }
            let _ = sender.send(TreeChange { path: path.into() });
        }
        for key in dead {
            watchers.remove(&key);
        }
    }
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTree for MemoryTree {
    fn read(&self, path: String) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let root = self.root.clone();
        Box::pin(async move {
            let guard = root.read().await;
            Ok(lookup(&guard, &path).cloned())
        })
    }

    fn set(&self, path: String, value: Option<Value>) -> BoxFuture<'static, StorageResult<()>> {
        let root = self.root.clone();
        let watchers = self.watchers.clone();
        Box::pin(async move {
            {
                let mut guard = root.write().await;
                write_at(&mut guard, &path, value.unwrap_or(Value::Null));
            }
            Self::notify(&watchers, &path);
            Ok(())
        })
    }

    fn update(
        &self,
        path: String,
        fields: Map<String, Value>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let root = self.root.clone();
        let watchers = self.watchers.clone();
        Box::pin(async move {
            {
                let mut guard = root.write().await;
                let target = materialize(&mut guard, &path);
                if let Value::Object(object) = target {
                    for (key, value) in fields {
                        if value.is_null() {
                            object.remove(&key);
                        } else {
                            object.insert(key, value);
                        }
                    }
                } else {
                    let mut object = Map::new();
                    for (key, value) in fields {
                        if !value.is_null() {
                            object.insert(key, value);
                        }
                    }
                    *target = Value::Object(object);
                }
            }
            Self::notify(&watchers, &path);
            Ok(())
        })
    }

    fn exists(&self, path: String) -> BoxFuture<'static, StorageResult<bool>> {
        let root = self.root.clone();
        Box::pin(async move {
            let guard = root.read().await;
            Ok(lookup(&guard, &path).is_some())
        })
    }

    fn subscribe(&self, prefix: String) -> broadcast::Receiver<TreeChange> {
        let (sender, receiver) = broadcast::channel(WATCH_CAPACITY);
        let id = self
            .next_watcher
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.watchers.insert(id, (prefix, sender));
        receiver
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Walk down to the value at `path`, treating null as absent.
fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments(path) {
        current = current.as_object()?.get(segment)?;
    }
    if current.is_null() { None } else { Some(current) }
}

/// View `value` as an object, coercing non-objects to an empty one.
fn object_slot(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("coerced to object above"),
    }
}

/// Replace the subtree at `path` with `value`; null removes the key.
fn write_at(root: &mut Value, path: &str, value: Value) {
    let parts: Vec<&str> = segments(path).collect();
    let Some((last, ancestors)) = parts.split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for segment in ancestors {
        current = object_slot(current)
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let parent = object_slot(current);
    if value.is_null() {
        parent.remove(*last);
    } else {
        parent.insert((*last).to_string(), value);
    }
}

/// Get a mutable handle to the value at `path`, creating intermediate
/// objects on the way down.
fn materialize<'a>(root: &'a mut Value, path: &str) -> &'a mut Value {
    let mut current = root;
    for segment in segments(path) {
        current = object_slot(current)
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> MemoryTree {
        MemoryTree::new()
    }

    #[tokio::test]
    async fn set_then_read_roundtrip() {
        let tree = tree();
        tree.set("rooms/AB/players/p1".into(), Some(json!({"name": "ala"})))
            .await
            .unwrap();
        let value = tree.read("rooms/AB/players/p1".into()).await.unwrap();
        assert_eq!(value, Some(json!({"name": "ala"})));
        assert!(tree.exists("rooms/AB".into()).await.unwrap());
    }

    #[tokio::test]
    async fn update_merges_without_clobbering_siblings() {
        let tree = tree();
        tree.set("rooms/AB".into(), Some(json!({"status": "waiting", "djId": "p1"})))
            .await
            .unwrap();

        let mut fields = Map::new();
        fields.insert("status".into(), json!("song_selection"));
        tree.update("rooms/AB".into(), fields).await.unwrap();

        let value = tree.read("rooms/AB".into()).await.unwrap().unwrap();
        assert_eq!(value["status"], json!("song_selection"));
        assert_eq!(value["djId"], json!("p1"));
    }

    #[tokio::test]
    async fn null_set_tombstones_the_subtree() {
        let tree = tree();
        tree.set("rooms/AB".into(), Some(json!({"status": "finished"})))
            .await
            .unwrap();
        tree.set("rooms/AB".into(), None).await.unwrap();

        assert!(!tree.exists("rooms/AB".into()).await.unwrap());
        assert_eq!(tree.read("rooms/AB".into()).await.unwrap(), None);
        // The parent collection survives.
        assert!(tree.read("rooms".into()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn null_field_in_update_removes_it() {
        let tree = tree();
        tree.set("rooms/AB".into(), Some(json!({"justFinishedGame": "game1"})))
            .await
            .unwrap();

        let mut fields = Map::new();
        fields.insert("justFinishedGame".into(), Value::Null);
        tree.update("rooms/AB".into(), fields).await.unwrap();

        let value = tree.read("rooms/AB".into()).await.unwrap().unwrap();
        assert!(value.get("justFinishedGame").is_none());
    }

    #[tokio::test]
    async fn subscription_fires_for_descendant_writes() {
        let tree = tree();
        let mut receiver = tree.subscribe("rooms/AB".into());

        tree.set("rooms/AB/players/p2".into(), Some(json!({"name": "ola"})))
            .await
            .unwrap();
        let change = receiver.recv().await.unwrap();
        assert_eq!(change.path, "rooms/AB/players/p2");

        // Writes to unrelated rooms are not observed.
        tree.set("rooms/XY".into(), Some(json!({"status": "waiting"})))
            .await
            .unwrap();
        tree.set("rooms/AB".into(), None).await.unwrap();
        let change = receiver.recv().await.unwrap();
        assert_eq!(change.path, "rooms/AB");
    }
}
