use serde::{Deserialize, Serialize};

use crate::transport::AuthState;

/// Why a connection closed, as classified by the network client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// The link dropped without a specific reason from the server.
    ConnectionLost,
    /// The server asked for an immediate reconnect (stream restart).
    Restart,
    /// A request or keep-alive timed out.
    Timeout,
    /// The account was logged out; credentials are no longer valid.
    LoggedOut,
    /// Another client took over the session.
    Replaced,
}

impl CloseReason {
    /// Terminal reasons destroy the session instead of scheduling a retry.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::LoggedOut | Self::Replaced)
    }
}

/// Identity of one message on the wire. Quoting and reactions key off this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageKey {
    /// Network-assigned message id.
    pub id: String,
    /// JID of the chat the message belongs to.
    pub remote_jid: String,
    /// Whether this account sent the message.
    pub from_me: bool,
    /// Sender JID inside a group chat; absent in direct chats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<String>,
}

/// Content fields carried by an inbound event, mirroring the wire shape:
/// several may be populated at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPayload {
    /// Plain conversation text.
    pub conversation: Option<String>,
    /// Extended/quoted message text.
    pub extended_text: Option<String>,
    /// Caption attached to an image.
    pub image_caption: Option<String>,
    /// Caption attached to a video.
    pub video_caption: Option<String>,
}

/// One inbound message event, prior to normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessage {
    pub key: MessageKey,
    /// Display name the sender advertises; often absent.
    pub push_name: Option<String>,
    pub payload: RawPayload,
}

/// Events delivered by a connection, in arrival order.
#[derive(Debug)]
pub enum WireEvent {
    /// Refreshed credential material that should be persisted.
    CredentialsUpdated(AuthState),
    /// The link came up and the session is authenticated.
    Opened,
    /// The link went down.
    Closed(CloseReason),
    /// An inbound message.
    Message(Box<RawMessage>),
}
