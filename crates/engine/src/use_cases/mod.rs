//! Use cases - orchestration between transport and the session aggregate.

mod clock_tick;
mod matchmaking;

pub use clock_tick::spawn_clock_driver;
pub use matchmaking::{Matchmaker, RulesFactory, SharedSession};
