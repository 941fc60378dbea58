//! Application state and composition.

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use gambit_domain::RulesEngine;

use crate::api::websocket::{ws_handler, WsState};
use crate::api::ConnectionManager;
use crate::config::{ConfigError, ServerConfig};
use crate::infrastructure::{
    clock::SystemClock,
    ports::{ClockPort, OutboundPort},
    shakmaty_rules::ShakmatyRules,
};
use crate::use_cases::{spawn_clock_driver, Matchmaker, RulesFactory};

/// Main application state.
///
/// Wires the connection registry, the matchmaker, and the rules engine
/// together. Handlers reach it through [`WsState`].
pub struct App {
    pub config: ServerConfig,
    pub connections: Arc<ConnectionManager>,
    pub matchmaker: Arc<Matchmaker>,
    tick_interval: Duration,
}

impl App {
    pub fn new(config: ServerConfig) -> Result<Self, ConfigError> {
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
        let rules: RulesFactory =
            Arc::new(|| Box::new(ShakmatyRules::new()) as Box<dyn RulesEngine>);
        Self::with_ports(config, clock, rules)
    }

    /// Compose with explicit clock and rules implementations.
    pub fn with_ports(
        config: ServerConfig,
        clock: Arc<dyn ClockPort>,
        rules: RulesFactory,
    ) -> Result<Self, ConfigError> {
        let time_control = config.time_control()?;
        let tick_interval = config.tick_interval()?;
        let connections = Arc::new(ConnectionManager::new());
        let outbound: Arc<dyn OutboundPort> = connections.clone();
        let matchmaker = Arc::new(Matchmaker::new(outbound, clock, rules, time_control));

        Ok(Self {
            config,
            connections,
            matchmaker,
            tick_interval,
        })
    }

    pub fn router(&self) -> Router {
        let ws_state = Arc::new(WsState {
            matchmaker: self.matchmaker.clone(),
            connections: self.connections.clone(),
        });

        Router::new()
            .route("/ws", get(ws_handler))
            .with_state(ws_state)
            .layer(TraceLayer::new_for_http())
    }

    /// Start ticking session clocks at the configured interval.
    pub fn spawn_clock_driver(&self) -> JoinHandle<()> {
        spawn_clock_driver(self.matchmaker.clone(), self.tick_interval)
    }
}
