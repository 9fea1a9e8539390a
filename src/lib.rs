//! Server-authoritative backend for the guess-who-suggested-this-song party
//! game: players gather in code-addressed rooms, submit songs each game, and
//! vote on who suggested the track the DJ is playing. All rules run here;
//! clients render snapshots pushed over SSE.

/// Runtime configuration.
pub mod config;
/// Storage backends and the typed room repository.
pub mod dao;
/// Request/response payloads.
pub mod dto;
/// Error types shared across layers.
pub mod error;
/// HTTP surface.
pub mod routes;
/// Business logic.
pub mod services;
/// Shared state and the domain model.
pub mod state;
