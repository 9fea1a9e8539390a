/// In-process document tree backend.
pub mod memory;
/// Typed repository mapping room records onto tree paths.
pub mod rooms;
/// Storage abstraction layer error types.
pub mod storage;
/// Document-tree store trait and change notifications.
pub mod tree;
