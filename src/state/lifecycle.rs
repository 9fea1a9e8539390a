//! Pure room lifecycle state machine.
//!
//! Rooms move `waiting → song_selection → voting`, loop back to
//! `song_selection` while rounds of the same game remain, then either cycle
//! through `summary → song_selection` for the next game or terminate in
//! `finished` once the DJ rotation is exhausted.

use thiserror::Error;

use crate::state::rooms::RoomStatus;

/// Events that can be applied to a room's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomEvent {
    /// DJ starts the first game from the waiting lobby.
    StartGame,
    /// DJ picked a submitted song for the current round.
    SongChosen,
    /// Round closed with more rounds left in the same game.
    NextRound,
    /// Round closed and the game is complete; `last_game` when the DJ
    /// rotation is exhausted.
    GameCompleted {
        /// Whether every player has now held the DJ role.
        last_game: bool,
    },
    /// DJ dismissed the between-games standings view.
    SummaryAcknowledged,
}

/// Error returned when attempting an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The status the room was in when the invalid event was received.
    pub from: RoomStatus,
    /// The event that cannot be applied from this status.
    pub event: RoomEvent,
}

/// Compute the status reached by applying `event` in `from`, if the
/// transition is valid.
pub fn advance(from: RoomStatus, event: RoomEvent) -> Result<RoomStatus, InvalidTransition> {
    let next = match (from, event) {
        (RoomStatus::Waiting, RoomEvent::StartGame) => RoomStatus::SongSelection,
        (RoomStatus::SongSelection, RoomEvent::SongChosen) => RoomStatus::Voting,
        (RoomStatus::Voting, RoomEvent::NextRound) => RoomStatus::SongSelection,
        (RoomStatus::Voting, RoomEvent::GameCompleted { last_game: false }) => RoomStatus::Summary,
        (RoomStatus::Voting, RoomEvent::GameCompleted { last_game: true }) => RoomStatus::Finished,
        (RoomStatus::Summary, RoomEvent::SummaryAcknowledged) => RoomStatus::SongSelection,
        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(status: RoomStatus, event: RoomEvent) -> RoomStatus {
        advance(status, event).unwrap()
    }

    #[test]
    fn full_happy_path_through_two_games() {
        let mut status = RoomStatus::Waiting;
        status = step(status, RoomEvent::StartGame);
        assert_eq!(status, RoomStatus::SongSelection);

        // Two rounds in game one.
        status = step(status, RoomEvent::SongChosen);
        assert_eq!(status, RoomStatus::Voting);
        status = step(status, RoomEvent::NextRound);
        status = step(status, RoomEvent::SongChosen);
        status = step(status, RoomEvent::GameCompleted { last_game: false });
        assert_eq!(status, RoomStatus::Summary);

        // Next game resumes song selection.
        status = step(status, RoomEvent::SummaryAcknowledged);
        assert_eq!(status, RoomStatus::SongSelection);
        status = step(status, RoomEvent::SongChosen);
        status = step(status, RoomEvent::NextRound);
        status = step(status, RoomEvent::SongChosen);
        status = step(status, RoomEvent::GameCompleted { last_game: true });
        assert_eq!(status, RoomStatus::Finished);
    }

    #[test]
    fn finished_is_terminal() {
        for event in [
            RoomEvent::StartGame,
            RoomEvent::SongChosen,
            RoomEvent::NextRound,
            RoomEvent::GameCompleted { last_game: false },
            RoomEvent::SummaryAcknowledged,
        ] {
            assert!(advance(RoomStatus::Finished, event).is_err());
        }
    }

    #[test]
    fn joining_phase_rejects_round_events() {
        let err = advance(RoomStatus::Waiting, RoomEvent::SongChosen).unwrap_err();
        assert_eq!(err.from, RoomStatus::Waiting);
        assert_eq!(err.event, RoomEvent::SongChosen);
    }

    #[test]
    fn summary_only_accepts_acknowledgement() {
        assert!(advance(RoomStatus::Summary, RoomEvent::SummaryAcknowledged).is_ok());
        assert!(advance(RoomStatus::Summary, RoomEvent::SongChosen).is_err());
        assert!(advance(RoomStatus::Summary, RoomEvent::StartGame).is_err());
    }
}
