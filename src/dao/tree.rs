//! Document-tree store abstraction.
//!
//! The core addresses persistent state through hierarchical slash-separated
//! paths (`rooms/{id}`, `rooms/{id}/players/{id}`, ...) and issues exactly
//! five primitives against the store: point reads, merge-updates of named
//! fields, subtree set/replace (with `null` acting as a tombstone delete),
//! existence checks, and push-based change subscriptions on a path prefix.
//! No query or filter operations exist.

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::dao::storage::StorageResult;

/// Notification fired after any successful write, carrying the written path.
#[derive(Debug, Clone)]
pub struct TreeChange {
    /// Path of the subtree that was written.
    pub path: String,
}

/// Abstraction over the persistence layer for the shared room tree.
pub trait DocumentTree: Send + Sync {
    /// Point read of the value stored at `path`, `None` when absent.
    fn read(&self, path: String) -> BoxFuture<'static, StorageResult<Option<Value>>>;

    /// Replace the subtree at `path` wholesale. A `Value::Null` (or a `None`)
    /// tombstones the subtree, removing it from the parent.
    fn set(&self, path: String, value: Option<Value>) -> BoxFuture<'static, StorageResult<()>>;

    /// Merge the named fields into the object at `path` without clobbering
    /// siblings. A `Value::Null` field removes that field.
    fn update(&self, path: String, fields: Map<String, Value>)
    -> BoxFuture<'static, StorageResult<()>>;

    /// Whether a non-null value exists at `path`.
    fn exists(&self, path: String) -> BoxFuture<'static, StorageResult<bool>>;

    /// Subscribe to changes touching `prefix`: the receiver fires for every
    /// write at, under, or above the given path.
    fn subscribe(&self, prefix: String) -> broadcast::Receiver<TreeChange>;
}

/// Whether a write at `written` is observable from a subscription on
/// `prefix`: either path is a segment-wise ancestor of the other.
pub fn paths_overlap(prefix: &str, written: &str) -> bool {
    let mut a = prefix.split('/').filter(|s| !s.is_empty());
    let mut b = written.split('/').filter(|s| !s.is_empty());
    loop {
        match (a.next(), b.next()) {
            (Some(x), Some(y)) if x == y => continue,
            (Some(_), Some(_)) => return false,
            _ => return true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_covers_descendants_and_ancestors() {
        assert!(paths_overlap("rooms/ABC123", "rooms/ABC123/players/p1"));
        assert!(paths_overlap("rooms/ABC123", "rooms"));
        assert!(paths_overlap("rooms/ABC123", "rooms/ABC123"));
    }

    #[test]
    fn overlap_is_segment_aware() {
        assert!(!paths_overlap("rooms/ABC123", "rooms/ABC12"));
        assert!(!paths_overlap("rooms/a", "rooms/ab"));
        assert!(!paths_overlap("rooms/ABC123", "rooms/XYZ789/players/p1"));
    }
}
