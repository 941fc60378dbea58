//! Gambit Domain - chess session rules independent of any transport.
//!
//! - `types/` - Shared vocabulary (colors, moves, time control)
//! - `game_clock` - Passive per-session clock
//! - `rules` - Port to the external chess rules engine
//! - `aggregates/` - The `GameSession` aggregate
//! - `events/` - Notices returned from session mutations

pub mod aggregates;
pub mod error;
pub mod events;
pub mod game_clock;
pub mod ids;
pub mod rules;
pub mod types;

pub use aggregates::{EndReason, GameResult, GameSession, SessionStatus};
pub use error::DomainError;
pub use events::{Audience, Notice, SessionEvent};
pub use game_clock::GameClock;
pub use ids::{ConnectionId, SessionId};
pub use rules::{DrawKind, MoveError, Outcome, RulesEngine};
pub use types::{
    ClockSnapshot, Color, MoveRequest, MoveResult, PromotionPiece, TimeControl,
    DEFAULT_INITIAL_TIME_MS,
};
