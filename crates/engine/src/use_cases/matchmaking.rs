//! Matchmaking and session routing.
//!
//! The [`Matchmaker`] turns per-connection events into paired sessions and
//! routes moves, resignations, and disconnects to the session a connection
//! is seated in.
//!
//! # Locking
//!
//! Matchmaker state (pending slot, session table, connection index) sits behind
//! one mutex; each session behind its own. The state lock may be held while a
//! session lock is taken, never the other way round. Notices are delivered
//! while the session lock is held, so one event's messages reach both
//! participants back-to-back.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;

use gambit_domain::{
    Audience, ConnectionId, GameSession, MoveRequest, Notice, RulesEngine, SessionId,
    TimeControl,
};
use gambit_shared::ServerMessage;

use crate::infrastructure::ports::{ClockPort, OutboundPort};

/// Builds a fresh rules engine for every new session.
pub type RulesFactory = Arc<dyn Fn() -> Box<dyn RulesEngine> + Send + Sync>;

pub type SharedSession = Arc<Mutex<GameSession>>;

#[derive(Default)]
struct MatchmakerState {
    pending: Option<ConnectionId>,
    known: HashSet<ConnectionId>,
    sessions: HashMap<SessionId, SharedSession>,
    by_connection: HashMap<ConnectionId, SessionId>,
}

impl MatchmakerState {
    fn session_for(&self, connection_id: ConnectionId) -> Option<SharedSession> {
        self.by_connection
            .get(&connection_id)
            .and_then(|session_id| self.sessions.get(session_id))
            .cloned()
    }

    /// Drop a session and every index entry still pointing at it.
    fn remove_session(&mut self, session_id: SessionId) -> bool {
        let removed = self.sessions.remove(&session_id).is_some();
        self.by_connection.retain(|_, id| *id != session_id);
        removed
    }
}

pub struct Matchmaker {
    state: Mutex<MatchmakerState>,
    outbound: Arc<dyn OutboundPort>,
    clock: Arc<dyn ClockPort>,
    rules: RulesFactory,
    time_control: TimeControl,
}

impl Matchmaker {
    pub fn new(
        outbound: Arc<dyn OutboundPort>,
        clock: Arc<dyn ClockPort>,
        rules: RulesFactory,
        time_control: TimeControl,
    ) -> Self {
        Self {
            state: Mutex::new(MatchmakerState::default()),
            outbound,
            clock,
            rules,
            time_control,
        }
    }

    pub fn time_control(&self) -> TimeControl {
        self.time_control
    }

    // =========================================================================
    // Connection lifecycle
    // =========================================================================

    pub async fn on_connect(&self, connection_id: ConnectionId) {
        let mut state = self.state.lock().await;
        state.known.insert(connection_id);
        tracing::debug!(connection_id = %connection_id, "Connection known to matchmaker");
    }

    /// Forget a connection. Idempotent.
    ///
    /// A pending connection is silently removed from the slot. A seated
    /// connection forfeits its session; only the survivor is notified.
    pub async fn on_disconnect(&self, connection_id: ConnectionId) {
        let mut state = self.state.lock().await;
        state.known.remove(&connection_id);

        if state.pending == Some(connection_id) {
            state.pending = None;
            tracing::info!(connection_id = %connection_id, "Pending player left before pairing");
            return;
        }

        let Some(session) = state.session_for(connection_id) else {
            return;
        };

        let session_id = {
            let mut session = session.lock().await;
            let notices = session.abandon(connection_id);
            if !notices.is_empty() {
                tracing::info!(
                    session_id = %session.id(),
                    connection_id = %connection_id,
                    "Player disconnected mid-game"
                );
            }
            self.deliver(&session, notices);
            session.id()
        };

        if state.remove_session(session_id) {
            tracing::debug!(session_id = %session_id, "Session retired");
        }
    }

    // =========================================================================
    // Client requests
    // =========================================================================

    pub async fn on_match_request(&self, connection_id: ConnectionId) {
        let mut state = self.state.lock().await;

        if !state.known.contains(&connection_id) {
            tracing::warn!(connection_id = %connection_id, "Match request from unknown connection");
            return;
        }
        if state.pending == Some(connection_id) {
            tracing::debug!(connection_id = %connection_id, "Already waiting for an opponent");
            return;
        }
        if let Some(session) = state.session_for(connection_id) {
            if session.lock().await.is_active() {
                tracing::warn!(
                    connection_id = %connection_id,
                    "Match request while seated in an active session"
                );
                return;
            }
        }

        let Some(white) = state.pending.take() else {
            state.pending = Some(connection_id);
            tracing::info!(connection_id = %connection_id, "Player waiting for an opponent");
            return;
        };

        let black = connection_id;
        let session_id = SessionId::new();
        let (session, notices) = GameSession::start(
            session_id,
            white,
            black,
            (self.rules)(),
            self.time_control,
            self.clock.now(),
        );

        tracing::info!(
            session_id = %session_id,
            white = %white,
            black = %black,
            "Game started"
        );
        self.deliver(&session, notices);

        state
            .sessions
            .insert(session_id, Arc::new(Mutex::new(session)));
        state.by_connection.insert(white, session_id);
        state.by_connection.insert(black, session_id);
    }

    pub async fn on_move(&self, connection_id: ConnectionId, request: MoveRequest) {
        let Some(session) = self.session_for(connection_id).await else {
            tracing::warn!(
                connection_id = %connection_id,
                request = %request,
                "Move without an active session"
            );
            return;
        };

        let ended = {
            let mut session = session.lock().await;
            let notices = session.make_move(connection_id, request, self.clock.now());
            self.deliver(&session, notices);
            Self::ended_id(&session)
        };

        if let Some(session_id) = ended {
            self.retire(session_id).await;
        }
    }

    pub async fn on_resign(&self, connection_id: ConnectionId) {
        let Some(session) = self.session_for(connection_id).await else {
            tracing::warn!(connection_id = %connection_id, "Resign without an active session");
            return;
        };

        let ended = {
            let mut session = session.lock().await;
            let notices = session.resign(connection_id);
            self.deliver(&session, notices);
            Self::ended_id(&session)
        };

        if let Some(session_id) = ended {
            self.retire(session_id).await;
        }
    }

    // =========================================================================
    // Clock
    // =========================================================================

    /// Run one clock tick on every live session.
    pub async fn tick_all(&self) {
        let sessions: Vec<SharedSession> = {
            let state = self.state.lock().await;
            state.sessions.values().cloned().collect()
        };

        let mut ended = Vec::new();
        for session in sessions {
            let mut session = session.lock().await;
            let notices = session.tick(self.clock.now());
            self.deliver(&session, notices);
            ended.extend(Self::ended_id(&session));
        }

        for session_id in ended {
            self.retire(session_id).await;
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn pending(&self) -> Option<ConnectionId> {
        self.state.lock().await.pending
    }

    pub async fn session_count(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    /// The session `connection_id` is seated in, if any.
    pub async fn session_for(&self, connection_id: ConnectionId) -> Option<SharedSession> {
        self.state.lock().await.session_for(connection_id)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn ended_id(session: &GameSession) -> Option<SessionId> {
        if session.is_active() {
            return None;
        }
        if let Some(result) = session.result() {
            tracing::info!(
                session_id = %session.id(),
                winner = ?result.winner,
                reason = %result.reason,
                moves = session.move_count(),
                "Game over"
            );
        }
        Some(session.id())
    }

    /// Remove an ended session. Must not be called with a session lock held.
    async fn retire(&self, session_id: SessionId) {
        let mut state = self.state.lock().await;
        if state.remove_session(session_id) {
            tracing::debug!(session_id = %session_id, "Session retired");
        }
    }

    fn deliver(&self, session: &GameSession, notices: Vec<Notice>) {
        for notice in notices {
            let message = ServerMessage::from(notice.event);
            match notice.audience {
                Audience::Both => {
                    let [white, black] = session.participants();
                    self.outbound.send(white, message.clone());
                    self.outbound.send(black, message);
                }
                Audience::Only(connection_id) => self.outbound.send(connection_id, message),
            }
        }
    }
}
