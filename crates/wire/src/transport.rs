use std::{sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
    tokio::sync::mpsc,
};

use crate::{
    error::Result,
    event::{MessageKey, WireEvent},
};

/// Opaque authentication material for one session.
///
/// The engine never inspects the blobs; it only moves them between the
/// network client and the credential store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthState {
    pub credentials: serde_json::Value,
    pub key_material: serde_json::Value,
}

impl AuthState {
    /// Whether any material is present at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credentials.is_null() && self.key_material.is_null()
    }
}

/// Dial parameters for one connection attempt.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub keepalive_interval: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(20),
            request_timeout: Duration::from_secs(60),
            keepalive_interval: Duration::from_secs(30),
        }
    }
}

/// Live link to the messaging network for one session.
///
/// All outbound calls are bounded by the [`ConnectOptions`] timeouts the
/// link was dialed with.
#[async_trait]
pub trait Connection: Send + Sync {
    /// JID this session is authenticated as, once the link has opened.
    fn self_jid(&self) -> Option<String>;

    /// Send text to a chat, optionally quoting an earlier message.
    async fn send_text(&self, chat: &str, text: &str, quote: Option<&MessageKey>) -> Result<()>;

    /// Send an emoji reaction to the message identified by `key`.
    async fn send_reaction(&self, chat: &str, emoji: &str, key: &MessageKey) -> Result<()>;

    /// Close the link. Safe to call more than once.
    async fn close(&self) -> Result<()>;
}

/// Stream of events for one connection.
pub type WireEvents = mpsc::Receiver<WireEvent>;

/// Factory for connections; the network client implements this.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dial one session. Returns the live link and its event stream.
    ///
    /// Errors only on unrecoverable setup failure (malformed auth state,
    /// client refused to construct). Network failures during the dial are
    /// reported later as a [`WireEvent::Closed`] on the stream.
    async fn connect(
        &self,
        session_id: &str,
        auth: &AuthState,
        options: &ConnectOptions,
    ) -> Result<(Arc<dyn Connection>, WireEvents)>;
}
