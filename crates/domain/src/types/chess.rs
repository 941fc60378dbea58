//! Chess vocabulary shared by the session aggregate and the wire protocol.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Side color. First-queued player is always white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Get the opposite color.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Piece a pawn may promote to.
///
/// Serialized as the single-letter form clients already send (`q`, `r`, `b`, `n`);
/// full names are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromotionPiece {
    #[serde(rename = "q", alias = "queen", alias = "Q")]
    Queen,
    #[serde(rename = "r", alias = "rook", alias = "R")]
    Rook,
    #[serde(rename = "b", alias = "bishop", alias = "B")]
    Bishop,
    #[serde(rename = "n", alias = "knight", alias = "N")]
    Knight,
}

impl PromotionPiece {
    pub fn as_char(&self) -> char {
        match self {
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
        }
    }
}

impl fmt::Display for PromotionPiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for PromotionPiece {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "q" | "queen" => Ok(Self::Queen),
            "r" | "rook" => Ok(Self::Rook),
            "b" | "bishop" => Ok(Self::Bishop),
            "n" | "knight" => Ok(Self::Knight),
            other => Err(DomainError::parse(format!("unknown promotion piece '{other}'"))),
        }
    }
}

/// A proposed move as received from a client.
///
/// Squares are kept as raw coordinates; the rules engine decides whether they
/// name real squares, so a rejected request can be echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PromotionPiece>,
}

impl MoveRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, piece: PromotionPiece) -> Self {
        self.promotion = Some(piece);
        self
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{piece}")?;
        }
        Ok(())
    }
}

/// A move accepted by the rules engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    pub from: String,
    pub to: String,
    /// Standard algebraic notation, e.g. `e4`, `Nf3`, `O-O`, `a8=Q#`.
    pub san: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PromotionPiece>,
}
