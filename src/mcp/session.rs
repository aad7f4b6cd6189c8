//! SSE session lifecycle.
//!
//! A session moves `Connecting -> Open -> Closed`. The keep-alive timer is
//! owned by the event stream, and the stream owns the [`SseSession`]; when
//! the client disconnects axum drops the stream, which drops the timer and
//! closes the session. Server shutdown ends every stream through the shared
//! cancellation token.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::Event;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::stream::{self, Stream};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Open,
    Closed,
}

#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub client: String,
    pub opened_at: DateTime<Utc>,
}

/// Process-wide map of live SSE sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<Uuid, SessionInfo>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session in the `Connecting` state.
    pub fn open(&self, client: &str) -> SseSession {
        let id = Uuid::new_v4();
        self.sessions.insert(
            id,
            SessionInfo {
                client: client.to_string(),
                opened_at: Utc::now(),
            },
        );
        debug!(session_id = %id, client, "SSE session connecting");
        SseSession {
            id,
            state: SessionState::Connecting,
            registry: self.clone(),
        }
    }

    pub fn active(&self) -> usize {
        self.sessions.len()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.sessions.contains_key(id)
    }
}

/// One SSE connection. Leaves the registry when closed or dropped.
#[derive(Debug)]
pub struct SseSession {
    id: Uuid,
    state: SessionState,
    registry: SessionRegistry,
}

impl SseSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mark_open(&mut self) {
        if self.state == SessionState::Connecting {
            self.state = SessionState::Open;
            info!(session_id = %self.id, "SSE session open");
        }
    }

    /// Idempotent.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;
        if let Some((_, info)) = self.registry.sessions.remove(&self.id) {
            let lifetime = Utc::now() - info.opened_at;
            info!(
                session_id = %self.id,
                client = %info.client,
                seconds = lifetime.num_seconds(),
                "SSE session closed"
            );
        }
    }
}

impl Drop for SseSession {
    fn drop(&mut self) {
        self.close();
    }
}

struct StreamState {
    session: SseSession,
    endpoint: Option<String>,
    keepalive: Interval,
    shutdown: CancellationToken,
}

/// Event stream for one session: the `endpoint` event, then `: ping`
/// comments every `keepalive` until the client leaves or the server stops.
pub fn session_events(
    session: SseSession,
    endpoint_url: String,
    keepalive: Duration,
    shutdown: CancellationToken,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let mut ticker = interval_at(Instant::now() + keepalive, keepalive);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let state = StreamState {
        session,
        endpoint: Some(endpoint_url),
        keepalive: ticker,
        shutdown,
    };

    stream::unfold(state, |mut st| async move {
        if let Some(url) = st.endpoint.take() {
            st.session.mark_open();
            return Some((Ok(Event::default().event("endpoint").data(url)), st));
        }

        tokio::select! {
            _ = st.shutdown.cancelled() => {
                st.session.close();
                None
            }
            _ = st.keepalive.tick() => Some((Ok(Event::default().comment("ping")), st)),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn session_lifecycle_updates_registry() {
        let registry = SessionRegistry::new();
        let mut session = registry.open("10.0.0.1");
        assert_eq!(session.state(), SessionState::Connecting);
        assert!(registry.contains(&session.id()));

        session.mark_open();
        assert_eq!(session.state(), SessionState::Open);

        session.close();
        session.close();
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(registry.active(), 0);
    }

    #[test]
    fn dropping_a_session_releases_it() {
        let registry = SessionRegistry::new();
        let session = registry.open("unknown");
        assert_eq!(registry.active(), 1);
        drop(session);
        assert_eq!(registry.active(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stream_pings_until_shutdown() {
        let registry = SessionRegistry::new();
        let shutdown = CancellationToken::new();
        let events = session_events(
            registry.open("unknown"),
            "http://localhost:3000/api/mcp".into(),
            Duration::from_secs(30),
            shutdown.clone(),
        );
        tokio::pin!(events);

        assert!(events.next().await.is_some()); // endpoint
        assert!(events.next().await.is_some()); // first ping, after auto-advance
        assert_eq!(registry.active(), 1);

        shutdown.cancel();
        assert!(events.next().await.is_none());
        assert_eq!(registry.active(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_stream_closes_the_session() {
        let registry = SessionRegistry::new();
        let events = session_events(
            registry.open("unknown"),
            "http://localhost:3000/api/mcp".into(),
            Duration::from_secs(30),
            CancellationToken::new(),
        );
        let mut events = Box::pin(events);
        events.next().await;
        assert_eq!(registry.active(), 1);

        drop(events);
        assert_eq!(registry.active(), 0);
    }
}
