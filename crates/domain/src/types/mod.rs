//! # Gambit Domain Types
//!
//! Shared vocabulary types used by both the domain layer and the wire protocol.
//!
//! 1. **Pure data types** - No I/O, no async, no side effects
//! 2. **Serializable** - All types derive Serialize/Deserialize

mod chess;
pub use chess::{Color, MoveRequest, MoveResult, PromotionPiece};

mod time_control;
pub use time_control::{ClockSnapshot, TimeControl, DEFAULT_INITIAL_TIME_MS};
