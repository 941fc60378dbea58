//! Rules engine adapter backed by shakmaty.
//!
//! Provides move validation, SAN generation, and terminal detection for the
//! standard chess variant:
//! - checkmate, stalemate, insufficient material (from shakmaty)
//! - fifty-move rule and threefold repetition (tracked here)

use std::collections::HashMap;

use shakmaty::{
    fen::Fen, san::SanPlus, uci::UciMove, CastlingMode, Chess, EnPassantMode, Move, Position,
    Rank, Role, Square,
};

use gambit_domain::{
    Color, DomainError, DrawKind, MoveError, MoveRequest, MoveResult, Outcome, PromotionPiece,
    RulesEngine,
};

/// Half-moves without capture or pawn push before the game is drawn.
const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// Occurrences of the same position that draw the game.
const REPETITION_LIMIT: u32 = 3;

#[derive(Debug, Clone)]
pub struct ShakmatyRules {
    position: Chess,
    /// Occurrences per position key (placement, side, castling, en passant).
    seen: HashMap<String, u32>,
}

impl ShakmatyRules {
    /// Standard starting position.
    pub fn new() -> Self {
        Self::from_position(Chess::default())
    }

    pub fn from_fen(fen: &str) -> Result<Self, DomainError> {
        let fen: Fen = fen
            .parse()
            .map_err(|e| DomainError::parse(format!("invalid FEN: {e}")))?;
        let position: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| DomainError::parse(format!("invalid FEN: {e}")))?;
        Ok(Self::from_position(position))
    }

    fn from_position(position: Chess) -> Self {
        let mut rules = Self {
            position,
            seen: HashMap::new(),
        };
        rules.record_position();
        rules
    }

    fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    /// FEN without the move counters.
    fn position_key(&self) -> String {
        self.fen()
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn record_position(&mut self) {
        *self.seen.entry(self.position_key()).or_insert(0) += 1;
    }

    fn repetitions(&self) -> u32 {
        self.seen.get(&self.position_key()).copied().unwrap_or(0)
    }

    fn is_promotion_push(&self, from: Square, to: Square) -> bool {
        let is_pawn = self
            .position
            .board()
            .piece_at(from)
            .is_some_and(|piece| piece.role == Role::Pawn);
        is_pawn && matches!(to.rank(), Rank::First | Rank::Eighth)
    }

    fn resolve(&self, request: &MoveRequest) -> Result<(Square, Square, Move), MoveError> {
        let from = parse_square(&request.from)?;
        let to = parse_square(&request.to)?;

        // Promotion defaults to a queen; a promotion piece on any other move is ignored.
        let promotion = if self.is_promotion_push(from, to) {
            Some(role_for(request.promotion.unwrap_or(PromotionPiece::Queen)))
        } else {
            None
        };

        let uci = UciMove::Normal {
            from,
            to,
            promotion,
        };
        let m = uci
            .to_move(&self.position)
            .map_err(|_| MoveError::Illegal(request.to_string()))?;

        // Castling only in king-to-destination form (e1g1, never e1h1).
        if m.to_uci(CastlingMode::Standard) != uci {
            return Err(MoveError::Illegal(request.to_string()));
        }

        Ok((from, to, m))
    }
}

impl Default for ShakmatyRules {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine for ShakmatyRules {
    fn turn(&self) -> Color {
        color_from(self.position.turn())
    }

    fn try_move(&mut self, request: &MoveRequest) -> Result<MoveResult, MoveError> {
        if self.outcome().is_some() {
            return Err(MoveError::GameOver);
        }

        let (from, to, m) = self.resolve(request)?;

        // `m` came from `to_move`, so it is legal in the current position.
        let san = SanPlus::from_move_and_play_unchecked(&mut self.position, &m).to_string();
        self.record_position();

        Ok(MoveResult {
            from: from.to_string(),
            to: to.to_string(),
            san,
            promotion: m.promotion().and_then(piece_for),
        })
    }

    fn outcome(&self) -> Option<Outcome> {
        if self.position.is_checkmate() {
            // Side to move is mated.
            Some(Outcome::Checkmate {
                winner: color_from(self.position.turn()).opposite(),
            })
        } else if self.position.is_stalemate() {
            Some(Outcome::Draw(DrawKind::Stalemate))
        } else if self.position.is_insufficient_material() {
            Some(Outcome::Draw(DrawKind::InsufficientMaterial))
        } else if self.position.halfmoves() >= FIFTY_MOVE_HALFMOVES {
            Some(Outcome::Draw(DrawKind::FiftyMoveRule))
        } else if self.repetitions() >= REPETITION_LIMIT {
            Some(Outcome::Draw(DrawKind::ThreefoldRepetition))
        } else {
            None
        }
    }
}

fn parse_square(s: &str) -> Result<Square, MoveError> {
    s.trim()
        .to_ascii_lowercase()
        .parse::<Square>()
        .map_err(|_| MoveError::InvalidSquare(s.to_string()))
}

fn color_from(color: shakmaty::Color) -> Color {
    match color {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}

fn role_for(piece: PromotionPiece) -> Role {
    match piece {
        PromotionPiece::Queen => Role::Queen,
        PromotionPiece::Rook => Role::Rook,
        PromotionPiece::Bishop => Role::Bishop,
        PromotionPiece::Knight => Role::Knight,
    }
}

fn piece_for(role: Role) -> Option<PromotionPiece> {
    match role {
        Role::Queen => Some(PromotionPiece::Queen),
        Role::Rook => Some(PromotionPiece::Rook),
        Role::Bishop => Some(PromotionPiece::Bishop),
        Role::Knight => Some(PromotionPiece::Knight),
        Role::Pawn | Role::King => None,
    }
}
