//! Fire-and-forget auto-reactions.

use {rand::Rng, tracing::debug};

use flock_wire::Message;

/// Emoji pool for the auto-reaction feature.
const REACTION_EMOJIS: &[&str] = &["👍", "❤️", "🔥", "😂", "🎉", "👀", "💯", "🤝"];

/// Pick one reaction emoji uniformly.
fn pick_emoji() -> &'static str {
    let index = rand::rng().random_range(0..REACTION_EMOJIS.len());
    REACTION_EMOJIS[index]
}

/// Send one reaction to `message` on a detached task.
///
/// Never awaited by the dispatch path; errors end at a debug log.
pub(crate) fn spawn_auto_reaction(message: Message) {
    let emoji = pick_emoji();
    tokio::spawn(async move {
        if let Err(e) = message.react(emoji).await {
            debug!(error = %e, "auto-reaction failed");
        }
    });
}
