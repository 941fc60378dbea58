//! Domain Events
//!
//! Return types from aggregate mutations, communicating what happened when
//! state was modified. They get mapped to protocol messages at the engine boundary.

pub mod session_events;

pub use session_events::*;
