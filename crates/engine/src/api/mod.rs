//! API layer - WebSocket entry point.

pub mod connections;
pub mod websocket;

pub use connections::ConnectionManager;
