//! Gambit Shared - Wire protocol between the Engine and chess clients
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json, and the domain vocabulary
//! 2. **No business logic** - Pure data types and serialization

pub mod messages;

pub use messages::{
    ClientMessage, GameOverPayload, InitGamePayload, InvalidMovePayload, MovePayload,
    OpponentLeftPayload, ServerMessage, OPPONENT_LEFT_MESSAGE,
};
