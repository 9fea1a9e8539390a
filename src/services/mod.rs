//! Business logic between the HTTP layer and the room tree.

/// OpenAPI document assembly.
pub mod documentation;
/// Health reporting.
pub mod health_service;
/// Game lifecycle operations: start, song pick, round close, summary.
pub mod lifecycle_service;
/// Room registry operations: create, join, close, snapshot.
pub mod room_service;
/// Pure scoring rules.
pub mod scoring;
/// Submission ledger operations.
pub mod song_service;
/// Live room streaming over SSE.
pub mod sse_service;
/// Periodic removal of finished rooms.
pub mod sweeper;
/// Voting operations.
pub mod vote_service;
