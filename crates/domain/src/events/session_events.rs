//! Session mutation outcomes.
//!
//! Every [`GameSession`](crate::GameSession) operation returns the notices it
//! produced. The caller delivers them in order; the aggregate never performs I/O.

use crate::aggregates::GameResult;
use crate::{ClockSnapshot, Color, ConnectionId, MoveRequest, MoveResult, TimeControl};

/// Something a participant must be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Session formed; tells one participant its color.
    GameStarted {
        color: Color,
        time_control: TimeControl,
    },
    /// A validated move to apply to local state.
    MovePlayed(MoveResult),
    /// The sender's move was refused. Nothing changed.
    MoveRejected { request: MoveRequest, reason: String },
    /// Periodic clock snapshot.
    ClockUpdated(ClockSnapshot),
    /// Session is over.
    GameEnded(GameResult),
    /// The opponent disconnected; `winner` is the surviving side.
    OpponentLeft { winner: Color },
}

/// Who receives a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Both participants, white first.
    Both,
    Only(ConnectionId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub audience: Audience,
    pub event: SessionEvent,
}

impl Notice {
    pub fn both(event: SessionEvent) -> Self {
        Self {
            audience: Audience::Both,
            event,
        }
    }

    pub fn only(connection_id: ConnectionId, event: SessionEvent) -> Self {
        Self {
            audience: Audience::Only(connection_id),
            event,
        }
    }
}
