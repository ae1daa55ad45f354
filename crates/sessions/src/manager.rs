use std::{
    future::Future,
    pin::Pin,
    sync::{
        Arc, Mutex, RwLock, Weak,
        atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering},
    },
    time::Duration,
};

use {
    serde::Serialize,
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use {
    flock_common::now_ms,
    flock_wire::{
        AuthState, CloseReason, ConnectOptions, Connection, RawMessage, WireEvent, WireEvents,
        normalize,
    },
};

use crate::{
    error::{Error, Result},
    host::SessionContext,
    reaction,
};

/// Connection lifecycle states of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    Stopped,
}

impl SessionState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one session's bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct SessionHandle {
    pub session_id: String,
    pub state: SessionState,
    pub started_at_ms: u64,
    pub last_activity_ms: u64,
    pub reconnect_attempts: u32,
}

/// Reconnect delay: grows linearly with the attempt count, capped.
pub(crate) fn reconnect_delay(attempts: u32, base_ms: u64, cap_ms: u64) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(u64::from(attempts)).min(cap_ms))
}

/// Owns one connection to the messaging network and drives its state
/// machine.
///
/// All per-session mutation happens in the manager's own event loop (one
/// spawned task per live link), so successive events for one session are
/// handled in order. Sessions are otherwise fully independent.
pub struct SessionManager {
    session_id: String,
    ctx: Arc<SessionContext>,
    /// Self-handle for tasks the manager spawns about itself.
    weak: Weak<SessionManager>,

    state: RwLock<SessionState>,
    auth: Mutex<Option<AuthState>>,
    connection: Mutex<Option<Arc<dyn Connection>>>,

    started_at_ms: u64,
    last_activity_ms: AtomicU64,
    reconnect_attempts: AtomicU32,

    /// Cleared exactly once by `stop()`; a stopped session is never revived.
    live: AtomicBool,
    /// Cancels the event loop and any pending reconnect timer.
    cancel: CancellationToken,
    /// Token of the currently scheduled reconnect, if any.
    pending_reconnect: Mutex<Option<CancellationToken>>,
}

impl SessionManager {
    pub(crate) fn new(
        session_id: &str,
        auth: Option<AuthState>,
        ctx: Arc<SessionContext>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            session_id: session_id.to_string(),
            ctx,
            weak: weak.clone(),
            state: RwLock::new(SessionState::Disconnected),
            auth: Mutex::new(auth),
            connection: Mutex::new(None),
            started_at_ms: now_ms(),
            last_activity_ms: AtomicU64::new(now_ms()),
            reconnect_attempts: AtomicU32::new(0),
            live: AtomicBool::new(true),
            cancel: CancellationToken::new(),
            pending_reconnect: Mutex::new(None),
        })
    }

    fn arc(&self) -> Option<Arc<Self>> {
        self.weak.upgrade()
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.read().unwrap()
    }

    pub(crate) fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Current bookkeeping snapshot.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            session_id: self.session_id.clone(),
            state: self.state(),
            started_at_ms: self.started_at_ms,
            last_activity_ms: self.last_activity_ms.load(Ordering::Relaxed),
            reconnect_attempts: self.reconnect_attempts.load(Ordering::Relaxed),
        }
    }

    /// Start the session. Idempotent: an already connecting or connected
    /// session returns its current handle untouched.
    ///
    /// Without a local [`AuthState`] the store is consulted first; store
    /// absence or failure is non-fatal and the session proceeds with
    /// whatever material it has. Errors only on unrecoverable setup
    /// failure; network trouble during the dial arrives later as a close
    /// event, not here.
    pub async fn start(&self) -> Result<SessionHandle> {
        {
            let mut state = self.state.write().unwrap();
            match *state {
                SessionState::Connecting | SessionState::Connected => {
                    debug!(session_id = %self.session_id, "start: already running");
                    drop(state);
                    return Ok(self.handle());
                },
                SessionState::Stopped => return Err(Error::stopped(&self.session_id)),
                SessionState::Disconnected => *state = SessionState::Connecting,
            }
        }

        let needs_hydration = self.auth.lock().unwrap().is_none();
        if needs_hydration
            && let Some(record) = self.ctx.store.get_session(&self.session_id).await
        {
            debug!(session_id = %self.session_id, "hydrated credentials from store");
            *self.auth.lock().unwrap() = Some(record.auth);
        }

        match self.dial().await {
            Ok(()) => {
                if let Some(arc) = self.arc()
                    && !self.ctx.registry.insert(arc)
                {
                    warn!(session_id = %self.session_id, "session was already registered");
                }
                info!(session_id = %self.session_id, "session started");
                Ok(self.handle())
            },
            Err(e) => {
                *self.state.write().unwrap() = SessionState::Disconnected;
                Err(e.into())
            },
        }
    }

    /// Stop the session for good. Idempotent; removes the session from the
    /// registry exactly once and cancels any pending reconnect so a stale
    /// timer can never revive it.
    pub async fn stop(&self) {
        if !self.live.swap(false, Ordering::SeqCst) {
            return;
        }
        info!(session_id = %self.session_id, "stopping session");
        *self.state.write().unwrap() = SessionState::Stopped;
        self.cancel.cancel();

        let connection = self.connection.lock().unwrap().take();
        if let Some(conn) = connection
            && let Err(e) = conn.close().await
        {
            debug!(session_id = %self.session_id, error = %e, "error closing connection on stop");
        }

        self.ctx.store.set_status(&self.session_id, "stopped").await;
        self.ctx.registry.remove(&self.session_id);
    }

    fn connect_options(&self) -> ConnectOptions {
        let s = &self.ctx.settings;
        ConnectOptions {
            connect_timeout: Duration::from_millis(s.connect_timeout_ms),
            request_timeout: Duration::from_millis(s.request_timeout_ms),
            keepalive_interval: Duration::from_millis(s.keepalive_interval_ms),
        }
    }

    async fn dial(&self) -> flock_wire::Result<()> {
        let auth = self.auth.lock().unwrap().clone().unwrap_or_default();
        let options = self.connect_options();
        let (connection, events) = self
            .ctx
            .transport
            .connect(&self.session_id, &auth, &options)
            .await?;
        *self.connection.lock().unwrap() = Some(connection);
        self.spawn_event_loop(events);
        Ok(())
    }

    /// One task per live link; exactly one handler runs per event, in
    /// arrival order.
    fn spawn_event_loop(&self, mut events: WireEvents) {
        let Some(mgr) = self.arc() else {
            return;
        };
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    event = events.recv() => match event {
                        Some(WireEvent::Closed(reason)) => {
                            // The link is done; its stream is abandoned.
                            mgr.handle_closed(reason).await;
                            break;
                        },
                        Some(event) => mgr.handle_event(event).await,
                        None => {
                            // Stream died without a close frame.
                            if mgr.is_live() {
                                mgr.handle_closed(CloseReason::ConnectionLost).await;
                            }
                            break;
                        },
                    },
                }
            }
        });
    }

    async fn handle_event(&self, event: WireEvent) {
        match event {
            WireEvent::Opened => self.handle_opened().await,
            WireEvent::Closed(reason) => self.handle_closed(reason).await,
            WireEvent::CredentialsUpdated(auth) => self.handle_credentials(auth).await,
            WireEvent::Message(raw) => self.handle_message(*raw).await,
        }
    }

    async fn handle_opened(&self) {
        info!(session_id = %self.session_id, "connection open");
        *self.state.write().unwrap() = SessionState::Connected;
        self.reconnect_attempts.store(0, Ordering::SeqCst);
        self.last_activity_ms.store(now_ms(), Ordering::Relaxed);

        let auth = self.auth.lock().unwrap().clone();
        if let Some(auth) = auth
            && !self.ctx.store.save_session(&self.session_id, &auth).await
        {
            debug!(session_id = %self.session_id, "credentials not persisted on open");
        }
    }

    async fn handle_credentials(&self, auth: AuthState) {
        debug!(session_id = %self.session_id, "credentials updated");
        *self.auth.lock().unwrap() = Some(auth.clone());
        if !self.ctx.store.save_session(&self.session_id, &auth).await {
            debug!(session_id = %self.session_id, "credential update not persisted");
        }
    }

    pub(crate) async fn handle_closed(&self, reason: CloseReason) {
        if !self.is_live() {
            return;
        }
        if self.reconnect_pending() {
            // A second close racing a scheduled reconnect must not stack
            // another attempt.
            debug!(session_id = %self.session_id, ?reason, "close ignored, reconnect already pending");
            return;
        }

        warn!(session_id = %self.session_id, ?reason, "connection closed");
        *self.state.write().unwrap() = SessionState::Disconnected;

        if reason.is_terminal() {
            info!(session_id = %self.session_id, ?reason, "terminal close, destroying session");
            if reason == CloseReason::LoggedOut {
                self.ctx.store.delete_session(&self.session_id).await;
            }
            self.stop().await;
            return;
        }

        let settings = &self.ctx.settings;
        let attempts = self.reconnect_attempts.load(Ordering::SeqCst) + 1;
        if attempts >= settings.max_reconnect_attempts {
            warn!(
                session_id = %self.session_id,
                attempts = attempts - 1,
                "reconnect attempts exhausted, stopping"
            );
            self.stop().await;
            return;
        }
        self.reconnect_attempts.store(attempts, Ordering::SeqCst);
        let delay = reconnect_delay(attempts, settings.reconnect_base_ms, settings.reconnect_cap_ms);
        info!(session_id = %self.session_id, attempts, ?delay, "scheduling reconnect");
        self.schedule_reconnect(delay);
    }

    fn reconnect_pending(&self) -> bool {
        self.pending_reconnect
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    fn schedule_reconnect(&self, delay: Duration) {
        let Some(mgr) = self.arc() else {
            return;
        };
        let token = self.cancel.child_token();
        *self.pending_reconnect.lock().unwrap() = Some(token.clone());

        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    debug!(session_id = %mgr.session_id, "pending reconnect cancelled");
                },
                () = tokio::time::sleep(delay) => {
                    *mgr.pending_reconnect.lock().unwrap() = None;
                    // A stop() racing the timer must win.
                    if mgr.is_live() {
                        mgr.run_reconnect().await;
                    }
                },
            }
        });
    }

    /// Drop the old link and dial again. Boxed so the reconnect cycle
    /// (a failed dial feeds back into close handling, which schedules the
    /// next dial) has a finite future type.
    fn run_reconnect(&self) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        let Some(mgr) = self.arc() else {
            return Box::pin(async {});
        };
        Box::pin(async move {
            if !mgr.is_live() {
                return;
            }
            info!(session_id = %mgr.session_id, "reconnecting");

            let stale = mgr.connection.lock().unwrap().take();
            if let Some(conn) = stale
                && let Err(e) = conn.close().await
            {
                debug!(session_id = %mgr.session_id, error = %e, "error closing stale connection");
            }

            match mgr.dial().await {
                Ok(()) => {
                    *mgr.state.write().unwrap() = SessionState::Connecting;
                },
                Err(e) => {
                    warn!(session_id = %mgr.session_id, error = %e, "reconnect dial failed");
                    mgr.handle_closed(CloseReason::ConnectionLost).await;
                },
            }
        })
    }

    /// Inbound pipeline: normalize, kick off the auto-reaction, dispatch.
    /// The reaction task is never awaited here and swallows its own errors.
    async fn handle_message(&self, raw: RawMessage) {
        self.last_activity_ms.store(now_ms(), Ordering::Relaxed);

        let Some(connection) = self.connection.lock().unwrap().clone() else {
            return;
        };
        let message = normalize(&raw, Arc::clone(&connection));

        if !message.is_self && self.ctx.settings.auto_react {
            reaction::spawn_auto_reaction(message.clone());
        }

        if message.text.is_empty() {
            return;
        }
        self.ctx
            .dispatcher
            .dispatch(&message, connection.as_ref())
            .await;
    }
}
