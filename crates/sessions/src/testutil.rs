//! Shared test doubles: a scripted in-process transport and a wired-up
//! engine environment.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use {async_trait::async_trait, tokio::sync::mpsc};

use {
    flock_config::{SessionSettings, StoreSettings},
    flock_plugins::{CommandHandler, PluginDef, PluginRegistry, StaticSource},
    flock_store::{CredentialRecord, CredentialStore},
    flock_wire::{
        AuthState, CloseReason, ConnectOptions, Connection, Error as WireError, Message,
        MessageKey, RawMessage, Result as WireResult, Transport, WireEvent, WireEvents,
    },
};

use crate::{host::SessionHost, manager::SessionManager, registry::SessionRegistry};

pub(crate) fn auth(tag: &str) -> AuthState {
    AuthState {
        credentials: serde_json::json!({"noise_key": tag}),
        key_material: serde_json::json!({"signed_prekey": tag}),
    }
}

/// Connection double recording outbound traffic.
#[derive(Default)]
pub(crate) struct MockConnection {
    pub closed: AtomicBool,
    pub sent: Mutex<Vec<(String, String, Option<MessageKey>)>>,
    pub reactions: Mutex<Vec<(String, String, MessageKey)>>,
}

#[async_trait]
impl Connection for MockConnection {
    fn self_jid(&self) -> Option<String> {
        Some("15559990000:1@s.whatsapp.net".into())
    }

    async fn send_text(
        &self,
        chat: &str,
        text: &str,
        quote: Option<&MessageKey>,
    ) -> WireResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((chat.into(), text.into(), quote.cloned()));
        Ok(())
    }

    async fn send_reaction(&self, chat: &str, emoji: &str, key: &MessageKey) -> WireResult<()> {
        self.reactions
            .lock()
            .unwrap()
            .push((chat.into(), emoji.into(), key.clone()));
        Ok(())
    }

    async fn close(&self) -> WireResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// One dialed link, driven by the test.
pub(crate) struct DialHandle {
    pub events: mpsc::Sender<WireEvent>,
    pub connection: Arc<MockConnection>,
    pub auth: AuthState,
}

impl DialHandle {
    pub async fn opened(&self) {
        let _ = self.events.send(WireEvent::Opened).await;
    }

    pub async fn closed(&self, reason: CloseReason) {
        let _ = self.events.send(WireEvent::Closed(reason)).await;
    }

    pub async fn credentials_updated(&self, auth: AuthState) {
        let _ = self.events.send(WireEvent::CredentialsUpdated(auth)).await;
    }

    pub async fn message(&self, raw: RawMessage) {
        let _ = self.events.send(WireEvent::Message(Box::new(raw))).await;
    }
}

/// Transport double handing out scripted links.
#[derive(Default)]
pub(crate) struct MockTransport {
    dials: Mutex<Vec<Arc<DialHandle>>>,
    refuse: AtomicBool,
}

impl MockTransport {
    pub fn dial_count(&self) -> usize {
        self.dials.lock().unwrap().len()
    }

    pub fn last_dial(&self) -> Arc<DialHandle> {
        self.dials
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no dial recorded")
    }

    pub fn refuse_dials(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(
        &self,
        _session_id: &str,
        auth: &AuthState,
        _options: &ConnectOptions,
    ) -> WireResult<(Arc<dyn Connection>, WireEvents)> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(WireError::message("dial refused"));
        }
        let (tx, rx) = mpsc::channel(16);
        let connection = Arc::new(MockConnection::default());
        self.dials.lock().unwrap().push(Arc::new(DialHandle {
            events: tx,
            connection: Arc::clone(&connection),
            auth: auth.clone(),
        }));
        Ok((connection, rx))
    }
}

/// Handler double replying "pong".
pub(crate) struct PingHandler;

#[async_trait]
impl CommandHandler for PingHandler {
    async fn handle(&self, message: &Message, _connection: &dyn Connection) -> anyhow::Result<()> {
        message.reply("pong").await?;
        Ok(())
    }
}

fn fast_settings() -> SessionSettings {
    SessionSettings {
        max_reconnect_attempts: 2,
        reconnect_base_ms: 20,
        reconnect_cap_ms: 100,
        ..Default::default()
    }
}

/// A fully wired engine over mock transport and a real (or unreachable)
/// SQLite store.
pub(crate) struct TestEnv {
    pub host: SessionHost,
    pub transport: Arc<MockTransport>,
    pub store: Arc<CredentialStore>,
    _dir: Option<tempfile::TempDir>,
}

impl TestEnv {
    async fn build(settings: SessionSettings, connected_store: bool, defs: Vec<PluginDef>) -> Self {
        let transport = Arc::new(MockTransport::default());

        let (store, dir) = if connected_store {
            let dir = tempfile::tempdir().expect("tempdir");
            let store = Arc::new(CredentialStore::new(StoreSettings {
                database_url: format!("sqlite://{}/creds.db?mode=rwc", dir.path().display()),
                ..Default::default()
            }));
            assert!(store.connect().await);
            (store, Some(dir))
        } else {
            let store = Arc::new(CredentialStore::new(StoreSettings {
                database_url: "sqlite:///nonexistent-dir/flock/creds.db".into(),
                ..Default::default()
            }));
            store.connect().await;
            (store, None)
        };

        let plugins = Arc::new(PluginRegistry::new(Arc::new(StaticSource::new(defs))));
        plugins.load().expect("plugin load");

        let host = SessionHost::new(
            settings,
            Arc::clone(&transport) as Arc<dyn Transport>,
            Arc::clone(&store),
            plugins,
        );

        Self {
            host,
            transport,
            store,
            _dir: dir,
        }
    }

    pub async fn connected() -> Self {
        Self::build(fast_settings(), true, vec![]).await
    }

    pub async fn degraded() -> Self {
        Self::build(fast_settings(), false, vec![]).await
    }

    pub async fn degraded_slow_reconnect() -> Self {
        let settings = SessionSettings {
            reconnect_base_ms: 150,
            reconnect_cap_ms: 500,
            ..fast_settings()
        };
        Self::build(settings, false, vec![]).await
    }

    pub async fn with_ping_plugin() -> Self {
        Self::build(
            fast_settings(),
            false,
            vec![PluginDef::new("ping", Arc::new(PingHandler))],
        )
        .await
    }

    pub async fn auto_react() -> Self {
        let settings = SessionSettings {
            auto_react: true,
            ..fast_settings()
        };
        Self::build(settings, false, vec![]).await
    }

    pub fn manager(&self, session_id: &str, auth: Option<AuthState>) -> Arc<SessionManager> {
        SessionManager::new(session_id, auth, self.host.context())
    }

    pub fn registry(&self) -> Arc<SessionRegistry> {
        self.host.registry()
    }
}

/// Poll `cond` until it holds; panic after two seconds.
pub(crate) async fn wait_for(cond: impl Fn() -> bool) {
    for _ in 0..400 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within deadline");
}

/// Poll the store until `session_id` has a record matching `pred`; panic
/// after two seconds.
pub(crate) async fn wait_for_record(
    store: &CredentialStore,
    session_id: &str,
    pred: impl Fn(&CredentialRecord) -> bool,
) {
    for _ in 0..400 {
        if store
            .get_session(session_id)
            .await
            .as_ref()
            .is_some_and(&pred)
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("store record condition not reached within deadline");
}
