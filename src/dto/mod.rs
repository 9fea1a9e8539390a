//! Request/response payloads exposed over REST and SSE.

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Game, submission, and vote payloads.
pub mod game;
/// Health endpoint payload.
pub mod health;
/// Room registry payloads and snapshots.
pub mod room;
/// Server-sent event envelope and payloads.
pub mod sse;
/// Validation helpers for DTOs.
pub mod validation;

/// Format unix milliseconds as an RFC3339 timestamp string.
pub(crate) fn format_unix_ms(millis: u64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
        .and_then(|timestamp| timestamp.format(&Rfc3339).ok())
        .unwrap_or_else(|| "invalid-timestamp".into())
}
