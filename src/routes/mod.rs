//! HTTP surface of the service.

use axum::Router;

use crate::state::SharedState;

/// OpenAPI document and Swagger UI.
pub mod docs;
/// Game lifecycle endpoints.
pub mod game;
/// Liveness endpoint.
pub mod health;
/// Room registry endpoints.
pub mod rooms;
/// Submission ledger endpoints.
pub mod songs;
/// Live room stream endpoint.
pub mod sse;
/// Voting endpoints.
pub mod votes;

/// Assemble the full application router.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(rooms::router())
        .merge(game::router())
        .merge(songs::router())
        .merge(votes::router())
        .merge(sse::router())
        .merge(docs::router())
        .with_state(state)
}
