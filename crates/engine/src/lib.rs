//! Gambit Engine library.
//!
//! Matchmaking and authoritative chess sessions over WebSocket.
//!
//! ## Structure
//!
//! - `use_cases/` - Matchmaking and the clock driver
//! - `infrastructure/` - Ports and adapters (clock, rules engine)
//! - `api/` - WebSocket entry point and connection registry
//! - `config` - Environment configuration
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod config;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
pub use config::{ConfigError, ServerConfig};
