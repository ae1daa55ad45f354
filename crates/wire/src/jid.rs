//! JID helpers.
//!
//! The network addresses chat-accounts as `user@server`, with an optional
//! `:device` suffix on the user part identifying one linked device
//! (`12345:1@s.whatsapp.net`). The engine only ever cares about the bare
//! `user@server` form.

/// Server suffix for individual chat-accounts.
pub const USER_SERVER: &str = "s.whatsapp.net";

/// Server suffix for group chats.
pub const GROUP_SERVER: &str = "g.us";

/// Rewrite a JID with a device-suffix marker to its bare `user@server`
/// form. A JID without the marker is returned unchanged.
#[must_use]
pub fn decode_jid(raw: &str) -> String {
    match raw.split_once('@') {
        Some((user, server)) => match user.split_once(':') {
            Some((bare, _device)) => format!("{bare}@{server}"),
            None => raw.to_string(),
        },
        None => raw.to_string(),
    }
}

/// Whether a JID addresses a group chat.
#[must_use]
pub fn is_group_jid(raw: &str) -> bool {
    raw.split_once('@')
        .is_some_and(|(_, server)| server == GROUP_SERVER)
}

/// The user part of a JID with any device suffix and server tail stripped.
///
/// Accepts bare identifiers too: `"12345"` yields `"12345"`.
#[must_use]
pub fn bare_user(raw: &str) -> &str {
    let user = raw.split('@').next().unwrap_or(raw);
    user.split(':').next().unwrap_or(user)
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_strips_device_marker() {
        assert_eq!(
            decode_jid("12345:1@s.whatsapp.net"),
            "12345@s.whatsapp.net"
        );
    }

    #[test]
    fn decode_passes_bare_jid_through() {
        assert_eq!(decode_jid("12345@s.whatsapp.net"), "12345@s.whatsapp.net");
    }

    #[test]
    fn decode_passes_non_jid_through() {
        assert_eq!(decode_jid("not-a-jid"), "not-a-jid");
    }

    #[test]
    fn group_detection() {
        assert!(is_group_jid("12345-67890@g.us"));
        assert!(!is_group_jid("12345@s.whatsapp.net"));
        assert!(!is_group_jid("12345"));
    }

    #[test]
    fn bare_user_strips_device_and_server() {
        assert_eq!(bare_user("12345:2@s.whatsapp.net"), "12345");
        assert_eq!(bare_user("12345@s.whatsapp.net"), "12345");
        assert_eq!(bare_user("12345"), "12345");
    }
}
