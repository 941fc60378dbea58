//! Rules engine port.
//!
//! Move legality, position updates, notation and terminal detection are
//! delegated to an external chess library behind [`RulesEngine`]. The session
//! aggregate only ever talks to this trait.

use thiserror::Error;

use crate::{Color, MoveRequest, MoveResult};

/// Why a proposed move was refused by the rules engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("Invalid square: {0}")]
    InvalidSquare(String),

    #[error("Illegal move: {0}")]
    Illegal(String),

    #[error("Game is already over")]
    GameOver,
}

/// How a drawn position was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
}

/// Terminal state of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Color },
    Draw(DrawKind),
}

impl Outcome {
    pub fn winner(&self) -> Option<Color> {
        match self {
            Self::Checkmate { winner } => Some(*winner),
            Self::Draw(_) => None,
        }
    }
}

/// Chess rules collaborator owned by one session.
#[cfg_attr(test, mockall::automock)]
pub trait RulesEngine: Send {
    /// Side to move in the current position.
    fn turn(&self) -> Color;

    /// Validate and apply `request`. On success the position advances.
    fn try_move(&mut self, request: &MoveRequest) -> Result<MoveResult, MoveError>;

    /// Terminal state of the current position, if any.
    fn outcome(&self) -> Option<Outcome>;

    fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    fn is_checkmate(&self) -> bool {
        matches!(self.outcome(), Some(Outcome::Checkmate { .. }))
    }

    fn winner(&self) -> Option<Color> {
        self.outcome().and_then(|o| o.winner())
    }
}
