//! Port traits for the engine's external collaborators.
//!
//! Time and outbound delivery are injected so the matchmaker can be driven
//! deterministically in tests.

use chrono::{DateTime, Utc};

use gambit_domain::ConnectionId;
use gambit_shared::ServerMessage;

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

// =============================================================================
// Transport Ports
// =============================================================================

/// Fire-and-forget delivery of one message to one connection.
///
/// Implementations must not block: a slow peer can never stall the caller.
/// Delivery to an unknown or closed connection is silently dropped.
#[cfg_attr(test, mockall::automock)]
pub trait OutboundPort: Send + Sync {
    fn send(&self, connection_id: ConnectionId, message: ServerMessage);
}
