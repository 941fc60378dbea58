//! WebSocket message types for Engine-client communication
//!
//! Every frame is one JSON text message with a `type` discriminator.
//! Client messages carry their fields inline; server messages nest them
//! under `payload`.
//!
//! ## Versioning Policy
//!
//! - New variants can be added at the end (forward compatible)
//! - New optional payload fields are allowed; consumers must ignore unknown fields
//! - Renaming variants is a breaking change

use serde::{Deserialize, Serialize};

use gambit_domain::{
    ClockSnapshot, Color, EndReason, MoveRequest, MoveResult, PromotionPiece, SessionEvent,
    TimeControl,
};

/// Text sent with `opponent_left`.
pub const OPPONENT_LEFT_MESSAGE: &str = "Opponent left the game";

// =============================================================================
// Client Messages (client → Engine)
// =============================================================================

/// Messages from client to server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Request matchmaking
    InitGame,
    /// Propose a move in the active session
    Move {
        #[serde(rename = "move")]
        request: MoveRequest,
    },
    /// Forfeit the active session
    Resign,
}

// =============================================================================
// Server Messages (Engine → client)
// =============================================================================

/// Messages from server to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Session formed; carries the recipient's color
    InitGame(InitGamePayload),
    /// A validated move, sent to both participants
    Move(MovePayload),
    /// The recipient's last move was refused
    InvalidMove(InvalidMovePayload),
    /// Periodic clock snapshot
    TimeUpdate(ClockSnapshot),
    /// Session ended
    GameOver(GameOverPayload),
    /// The recipient's opponent disconnected
    OpponentLeft(OpponentLeftPayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitGamePayload {
    pub color: Color,
    #[serde(
        rename = "timeControl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub time_control: Option<TimeControl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePayload {
    pub from: String,
    pub to: String,
    pub san: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PromotionPiece>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidMovePayload {
    pub error: String,
    #[serde(rename = "move")]
    pub request: MoveRequest,
}

/// `winner` is `null` for a draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverPayload {
    pub winner: Option<Color>,
    pub reason: EndReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentLeftPayload {
    pub message: String,
    /// Surviving side, which wins by default. Older clients only read `message`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Color>,
}

impl OpponentLeftPayload {
    pub fn new(winner: Color) -> Self {
        Self {
            message: OPPONENT_LEFT_MESSAGE.to_string(),
            winner: Some(winner),
        }
    }
}

// =============================================================================
// Domain → wire
// =============================================================================

impl From<MoveResult> for MovePayload {
    fn from(result: MoveResult) -> Self {
        Self {
            from: result.from,
            to: result.to,
            san: result.san,
            promotion: result.promotion,
        }
    }
}

impl From<SessionEvent> for ServerMessage {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::GameStarted {
                color,
                time_control,
            } => Self::InitGame(InitGamePayload {
                color,
                time_control: Some(time_control),
            }),
            SessionEvent::MovePlayed(result) => Self::Move(result.into()),
            SessionEvent::MoveRejected { request, reason } => {
                Self::InvalidMove(InvalidMovePayload {
                    error: reason,
                    request,
                })
            }
            SessionEvent::ClockUpdated(snapshot) => Self::TimeUpdate(snapshot),
            SessionEvent::GameEnded(result) => Self::GameOver(GameOverPayload {
                winner: result.winner,
                reason: result.reason,
            }),
            SessionEvent::OpponentLeft { winner } => {
                Self::OpponentLeft(OpponentLeftPayload::new(winner))
            }
        }
    }
}
