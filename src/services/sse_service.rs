//! Live room streaming over SSE.
//!
//! Each subscriber gets a forwarder task bridging the tree's broadcast
//! notifications into a bounded per-client channel. Every change under the
//! room's subtree triggers a fresh snapshot, so clients never have to patch
//! state locally; a lagged client simply receives the latest snapshot.

use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio_stream::{StreamExt, wrappers::ReceiverStream};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dto::{
        room::RoomSnapshot,
        sse::{RoomClosedEvent, ServerEvent},
    },
    error::ServiceError,
    state::{SharedState, rooms::Room},
};

/// Per-client buffered events before backpressure kicks in.
const CLIENT_BUFFER: usize = 8;
/// Keep-alive comment interval.
const KEEP_ALIVE_SECS: u64 = 15;

/// Subscribe to a room's live snapshots. The stream opens with the current
/// snapshot, re-emits one on every change, and ends with a `room_closed`
/// event when the room is deleted.
pub async fn room_stream(
    state: &SharedState,
    room_id: &str,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, Infallible>> + use<>>, ServiceError> {
    let repo = state.rooms();
    let room = repo
        .load(room_id)
        .await?
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;

    let mut changes = repo.watch(room_id);
    let (tx, rx) = mpsc::channel::<Event>(CLIENT_BUFFER);
    let stream_id = Uuid::new_v4();
    let room_id = room_id.to_string();
    debug!(%stream_id, room = %room_id, "sse subscriber attached");

    tokio::spawn(async move {
        if send_snapshot(&tx, &room).await.is_err() {
            return;
        }
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                change = changes.recv() => match change {
                    Ok(_) | Err(RecvError::Lagged(_)) => {
                        if let Err(RecvError::Lagged(skipped)) = &change {
                            warn!(%stream_id, room = %room_id, skipped, "sse subscriber lagged; resynchronizing");
                        }
                        match repo.load(&room_id).await {
                            Ok(Some(room)) => {
                                if send_snapshot(&tx, &room).await.is_err() {
                                    break;
                                }
                            }
                            Ok(None) => {
                                send_closed(&tx, &room_id).await;
                                break;
                            }
                            Err(err) => {
                                warn!(%stream_id, room = %room_id, error = %err, "failed to reload room for sse");
                            }
                        }
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        debug!(%stream_id, room = %room_id, "sse subscriber detached");
    });

    let stream = ReceiverStream::new(rx).map(Ok::<Event, Infallible>);
    Ok(Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(KEEP_ALIVE_SECS))))
}

async fn send_snapshot(tx: &mpsc::Sender<Event>, room: &Room) -> Result<(), ()> {
    match ServerEvent::json("room", &RoomSnapshot::from(room)) {
        Ok(event) => tx.send(event.into()).await.map_err(|_| ()),
        Err(err) => {
            warn!(room = %room.id, error = %err, "failed to encode room snapshot");
            Ok(())
        }
    }
}

async fn send_closed(tx: &mpsc::Sender<Event>, room_id: &str) {
    let payload = RoomClosedEvent {
        room_id: room_id.to_string(),
    };
    if let Ok(event) = ServerEvent::json("room_closed", &payload) {
        let _ = tx.send(event.into()).await;
    }
}
