//! GameSession aggregate - sole authority over one paired match.
//!
//! # State machine
//!
//! `Active -> Ended`, one-way. A session is `Active` from construction and ends
//! on exactly one of: checkmate or draw after a move, clock expiry, resignation,
//! or a participant disconnecting. Once ended every operation is a no-op that
//! returns no notices.
//!
//! # Invariants
//!
//! - Colors are fixed at construction: first-queued connection is white.
//! - The position only changes through moves accepted by the rules engine.
//! - The clock only runs after the first accepted move, and only for the side on move.
//! - A move that arrives after its sender's time ran out loses to the timeout.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::{Notice, SessionEvent};
use crate::rules::{Outcome, RulesEngine};
use crate::{Color, ConnectionId, GameClock, MoveRequest, SessionId, TimeControl};

/// Reason text sent back when a participant moves out of turn.
pub const NOT_YOUR_TURN: &str = "Not your turn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Ended,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Checkmate,
    Draw,
    Resignation,
    Timeout,
    Disconnect,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checkmate => "checkmate",
            Self::Draw => "draw",
            Self::Resignation => "resignation",
            Self::Timeout => "timeout",
            Self::Disconnect => "disconnect",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final result of an ended session. `winner` is `None` for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub winner: Option<Color>,
    pub reason: EndReason,
}

pub struct GameSession {
    id: SessionId,
    white: ConnectionId,
    black: ConnectionId,
    rules: Box<dyn RulesEngine>,
    clock: GameClock,
    time_control: TimeControl,
    status: SessionStatus,
    result: Option<GameResult>,
    move_count: u32,
}

impl GameSession {
    /// Pair two connections and run the start sequence.
    ///
    /// Returns the session plus one `GameStarted` notice per participant.
    /// The clock is armed but frozen until the first move is accepted.
    pub fn start(
        id: SessionId,
        white: ConnectionId,
        black: ConnectionId,
        rules: Box<dyn RulesEngine>,
        time_control: TimeControl,
        now: DateTime<Utc>,
    ) -> (Self, Vec<Notice>) {
        let session = Self {
            id,
            white,
            black,
            rules,
            clock: GameClock::new(time_control, now),
            time_control,
            status: SessionStatus::Active,
            result: None,
            move_count: 0,
        };

        let notices = vec![
            Notice::only(
                white,
                SessionEvent::GameStarted {
                    color: Color::White,
                    time_control,
                },
            ),
            Notice::only(
                black,
                SessionEvent::GameStarted {
                    color: Color::Black,
                    time_control,
                },
            ),
        ];

        (session, notices)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Result once ended, `None` while active.
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn participant(&self, color: Color) -> ConnectionId {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    pub fn participants(&self) -> [ConnectionId; 2] {
        [self.white, self.black]
    }

    pub fn color_of(&self, connection_id: ConnectionId) -> Option<Color> {
        if connection_id == self.white {
            Some(Color::White)
        } else if connection_id == self.black {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Side to move according to the rules engine.
    pub fn turn(&self) -> Color {
        self.rules.turn()
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn time_control(&self) -> TimeControl {
        self.time_control
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Validate and apply a move from `connection_id`.
    pub fn make_move(
        &mut self,
        connection_id: ConnectionId,
        request: MoveRequest,
        now: DateTime<Utc>,
    ) -> Vec<Notice> {
        if !self.is_active() {
            return Vec::new();
        }
        let Some(color) = self.color_of(connection_id) else {
            return Vec::new();
        };

        if self.rules.turn() != color {
            return vec![Notice::only(
                connection_id,
                SessionEvent::MoveRejected {
                    request,
                    reason: NOT_YOUR_TURN.to_string(),
                },
            )];
        }

        // Settle the mover's clock up to this instant first; if that flags
        // them, the move is too late.
        if self.clock.is_started() && self.clock.charge(color, now) {
            return self.finish(Some(color.opposite()), EndReason::Timeout);
        }

        let result = match self.rules.try_move(&request) {
            Ok(result) => result,
            Err(e) => {
                return vec![Notice::only(
                    connection_id,
                    SessionEvent::MoveRejected {
                        request,
                        reason: e.to_string(),
                    },
                )];
            }
        };

        self.move_count += 1;
        if self.clock.is_started() {
            self.clock.reset_anchor(now);
        } else {
            self.clock.start(now);
        }

        let mut notices = vec![Notice::both(SessionEvent::MovePlayed(result))];

        if let Some(outcome) = self.rules.outcome() {
            let (winner, reason) = match outcome {
                Outcome::Checkmate { winner } => (Some(winner), EndReason::Checkmate),
                Outcome::Draw(_) => (None, EndReason::Draw),
            };
            notices.extend(self.finish(winner, reason));
        }

        notices
    }

    /// Forfeit on behalf of `connection_id`. Idempotent.
    pub fn resign(&mut self, connection_id: ConnectionId) -> Vec<Notice> {
        if !self.is_active() {
            return Vec::new();
        }
        let Some(color) = self.color_of(connection_id) else {
            return Vec::new();
        };
        self.finish(Some(color.opposite()), EndReason::Resignation)
    }

    /// One periodic clock evaluation.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Notice> {
        if !self.is_active() {
            return Vec::new();
        }
        if !self.clock.is_started() {
            self.clock.reset_anchor(now);
            return Vec::new();
        }

        let side = self.rules.turn();
        if self.clock.charge(side, now) {
            return self.finish(Some(side.opposite()), EndReason::Timeout);
        }

        vec![Notice::both(SessionEvent::ClockUpdated(
            self.clock.snapshot(),
        ))]
    }

    /// `connection_id` went away mid-game. The survivor wins by default and
    /// is the only one notified.
    pub fn abandon(&mut self, connection_id: ConnectionId) -> Vec<Notice> {
        if !self.is_active() {
            return Vec::new();
        }
        let Some(color) = self.color_of(connection_id) else {
            return Vec::new();
        };

        let winner = color.opposite();
        let survivor = self.participant(winner);
        let result = GameResult {
            winner: Some(winner),
            reason: EndReason::Disconnect,
        };
        self.end(result);

        vec![
            Notice::only(survivor, SessionEvent::OpponentLeft { winner }),
            Notice::only(survivor, SessionEvent::GameEnded(result)),
        ]
    }

    fn finish(&mut self, winner: Option<Color>, reason: EndReason) -> Vec<Notice> {
        let result = GameResult { winner, reason };
        self.end(result);
        vec![Notice::both(SessionEvent::GameEnded(result))]
    }

    fn end(&mut self, result: GameResult) {
        self.status = SessionStatus::Ended;
        self.clock.stop();
        self.result = Some(result);
    }
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("white", &self.white)
            .field("black", &self.black)
            .field("status", &self.status)
            .field("result", &self.result)
            .field("move_count", &self.move_count)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
