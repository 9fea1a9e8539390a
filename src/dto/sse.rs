//! Server-sent event envelope and payloads.

use axum::response::sse::Event;
use serde::Serialize;

/// A named SSE event carrying a JSON payload.
#[derive(Debug, Clone)]
pub struct ServerEvent {
    /// Event name clients subscribe to.
    pub event: String,
    /// JSON-encoded payload.
    pub data: String,
}

impl ServerEvent {
    /// Build a named event from any serializable payload.
    pub fn json<T: Serialize>(event: &str, payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event: event.to_string(),
            data: serde_json::to_string(payload)?,
        })
    }
}

impl From<ServerEvent> for Event {
    fn from(value: ServerEvent) -> Self {
        Event::default().event(value.event).data(value.data)
    }
}

/// Payload of the terminal `room_closed` event.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomClosedEvent {
    /// The room that was deleted.
    pub room_id: String,
}
