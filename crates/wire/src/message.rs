//! Canonical message model and the normalizer that produces it.

use std::sync::Arc;

use crate::{
    error::Result,
    event::{MessageKey, RawMessage, RawPayload},
    jid::{decode_jid, is_group_jid},
    transport::Connection,
};

/// Placeholder used when the sender advertises no display name.
pub const DEFAULT_PUSH_NAME: &str = "Unknown";

/// Canonical inbound message, one per raw event. Ephemeral: lives for the
/// duration of one dispatch.
#[derive(Clone)]
pub struct Message {
    /// Network-assigned message id.
    pub id: String,
    /// Whether this account sent the message.
    pub is_self: bool,
    /// JID of the chat the message arrived in.
    pub from_chat: String,
    /// Whether the chat is a group.
    pub is_group: bool,
    /// Bare JID of the sender.
    pub sender: String,
    /// Display name of the sender.
    pub push_name: String,
    /// Extracted text; empty when the event carried none.
    pub text: String,

    key: MessageKey,
    connection: Arc<dyn Connection>,
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.id)
            .field("is_self", &self.is_self)
            .field("from_chat", &self.from_chat)
            .field("is_group", &self.is_group)
            .field("sender", &self.sender)
            .field("push_name", &self.push_name)
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}

impl Message {
    /// Send text into the originating chat, quoting this message.
    pub async fn reply(&self, text: &str) -> Result<()> {
        self.connection
            .send_text(&self.from_chat, text, Some(&self.key))
            .await
    }

    /// Send an emoji reaction keyed to this message.
    pub async fn react(&self, emoji: &str) -> Result<()> {
        self.connection
            .send_reaction(&self.from_chat, emoji, &self.key)
            .await
    }
}

/// Convert a raw inbound event into a canonical [`Message`].
///
/// Sender resolution: in a group chat the sender is the decoded
/// participant JID; for a self-originated event it is the decoded own JID;
/// otherwise the decoded chat JID.
#[must_use]
pub fn normalize(raw: &RawMessage, connection: Arc<dyn Connection>) -> Message {
    let from_chat = raw.key.remote_jid.clone();
    let is_group = is_group_jid(&from_chat);

    let sender = if is_group {
        decode_jid(raw.key.participant.as_deref().unwrap_or(&from_chat))
    } else if raw.key.from_me {
        match connection.self_jid() {
            Some(own) => decode_jid(&own),
            None => decode_jid(&from_chat),
        }
    } else {
        decode_jid(&from_chat)
    };

    Message {
        id: raw.key.id.clone(),
        is_self: raw.key.from_me,
        from_chat,
        is_group,
        sender,
        push_name: raw
            .push_name
            .clone()
            .unwrap_or_else(|| DEFAULT_PUSH_NAME.to_string()),
        text: extract_text(&raw.payload),
        key: raw.key.clone(),
        connection,
    }
}

/// Extract message text, first match wins: plain conversation, extended
/// text, image caption, video caption. Empty string when none is present.
#[must_use]
pub fn extract_text(payload: &RawPayload) -> String {
    payload
        .conversation
        .as_deref()
        .or(payload.extended_text.as_deref())
        .or(payload.image_caption.as_deref())
        .or(payload.video_caption.as_deref())
        .unwrap_or_default()
        .to_string()
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use {super::*, async_trait::async_trait, std::sync::Mutex};

    /// Records outbound calls instead of touching a network.
    #[derive(Default)]
    pub(crate) struct RecordingConnection {
        pub self_jid: Option<String>,
        pub sent: Mutex<Vec<(String, String, Option<MessageKey>)>>,
        pub reactions: Mutex<Vec<(String, String, MessageKey)>>,
    }

    #[async_trait]
    impl Connection for RecordingConnection {
        fn self_jid(&self) -> Option<String> {
            self.self_jid.clone()
        }

        async fn send_text(
            &self,
            chat: &str,
            text: &str,
            quote: Option<&MessageKey>,
        ) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((chat.to_string(), text.to_string(), quote.cloned()));
            Ok(())
        }

        async fn send_reaction(&self, chat: &str, emoji: &str, key: &MessageKey) -> Result<()> {
            self.reactions
                .lock()
                .unwrap()
                .push((chat.to_string(), emoji.to_string(), key.clone()));
            Ok(())
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    fn raw(key: MessageKey, payload: RawPayload, push_name: Option<&str>) -> RawMessage {
        RawMessage {
            key,
            push_name: push_name.map(str::to_string),
            payload,
        }
    }

    fn direct_key(from_me: bool) -> MessageKey {
        MessageKey {
            id: "ABC123".into(),
            remote_jid: "15550001111@s.whatsapp.net".into(),
            from_me,
            participant: None,
        }
    }

    #[test]
    fn text_precedence_conversation_wins() {
        let payload = RawPayload {
            conversation: Some("hello".into()),
            image_caption: Some("a picture".into()),
            ..Default::default()
        };
        assert_eq!(extract_text(&payload), "hello");
    }

    #[test]
    fn text_precedence_caption_without_conversation() {
        let payload = RawPayload {
            image_caption: Some("a picture".into()),
            video_caption: Some("a clip".into()),
            ..Default::default()
        };
        assert_eq!(extract_text(&payload), "a picture");
    }

    #[test]
    fn text_extraction_empty_when_no_fields() {
        assert_eq!(extract_text(&RawPayload::default()), "");
    }

    #[test]
    fn group_message_sender_is_decoded_participant() {
        let key = MessageKey {
            id: "M1".into(),
            remote_jid: "15550001111-1600000000@g.us".into(),
            from_me: false,
            participant: Some("15552223333:7@s.whatsapp.net".into()),
        };
        let conn = Arc::new(RecordingConnection::default());
        let msg = normalize(
            &raw(key, RawPayload::default(), Some("Dana")),
            conn,
        );
        assert!(msg.is_group);
        assert_eq!(msg.sender, "15552223333@s.whatsapp.net");
        assert_eq!(msg.push_name, "Dana");
    }

    #[test]
    fn self_message_sender_is_own_jid() {
        let conn = Arc::new(RecordingConnection {
            self_jid: Some("15559998888:3@s.whatsapp.net".into()),
            ..Default::default()
        });
        let msg = normalize(&raw(direct_key(true), RawPayload::default(), None), conn);
        assert!(msg.is_self);
        assert_eq!(msg.sender, "15559998888@s.whatsapp.net");
    }

    #[test]
    fn direct_message_sender_is_chat_jid() {
        let conn = Arc::new(RecordingConnection::default());
        let msg = normalize(&raw(direct_key(false), RawPayload::default(), None), conn);
        assert!(!msg.is_group);
        assert_eq!(msg.sender, "15550001111@s.whatsapp.net");
        assert_eq!(msg.push_name, DEFAULT_PUSH_NAME);
    }

    #[tokio::test]
    async fn reply_quotes_the_original() {
        let conn = Arc::new(RecordingConnection::default());
        let msg = normalize(
            &raw(direct_key(false), RawPayload::default(), None),
            Arc::clone(&conn) as Arc<dyn Connection>,
        );
        msg.reply("pong").await.unwrap();

        let sent = conn.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (chat, text, quote) = &sent[0];
        assert_eq!(chat, "15550001111@s.whatsapp.net");
        assert_eq!(text, "pong");
        assert_eq!(quote.as_ref().unwrap().id, "ABC123");
    }

    #[tokio::test]
    async fn react_targets_the_original_key() {
        let conn = Arc::new(RecordingConnection::default());
        let msg = normalize(
            &raw(direct_key(false), RawPayload::default(), None),
            Arc::clone(&conn) as Arc<dyn Connection>,
        );
        msg.react("🔥").await.unwrap();

        let reactions = conn.reactions.lock().unwrap();
        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].1, "🔥");
        assert_eq!(reactions[0].2.id, "ABC123");
    }
}
