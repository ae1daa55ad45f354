use std::sync::Arc;

use tracing::{debug, warn};

use {
    flock_config::SessionSettings,
    flock_plugins::PluginRegistry,
    flock_wire::{Connection, Message, jid::bare_user},
};

use crate::{
    parse::{ParsedCommand, parse_command},
    status::SessionStatusSource,
};

/// Routes parsed commands to plugin handlers with builtin fallback.
///
/// One dispatcher serves every session; it carries no per-session state.
pub struct CommandDispatcher {
    prefix: String,
    owner: String,
    plugins: Arc<PluginRegistry>,
    status: Arc<dyn SessionStatusSource>,
}

impl CommandDispatcher {
    #[must_use]
    pub fn new(
        settings: &SessionSettings,
        plugins: Arc<PluginRegistry>,
        status: Arc<dyn SessionStatusSource>,
    ) -> Self {
        Self {
            prefix: settings.command_prefix.clone(),
            owner: settings.owner.clone(),
            plugins,
            status,
        }
    }

    /// Parse and execute at most one handler for `message`.
    ///
    /// Not-a-command text is ignored. Handler failures are confined here:
    /// the user gets a short diagnostic via the reply capability and the
    /// session carries on.
    pub async fn dispatch(&self, message: &Message, connection: &dyn Connection) {
        let Some(cmd) = parse_command(&message.text, &self.prefix) else {
            return;
        };

        // Plugins shadow builtins; once a plugin matched there is no
        // fallback, success or not.
        if let Some(handler) = self.plugins.get(&cmd.name) {
            debug!(command = %cmd.name, sender = %message.sender, "running plugin handler");
            if let Err(e) = handler.handle(message, connection).await {
                warn!(command = %cmd.name, error = %e, "plugin handler failed");
                let diagnostic = format!("Command '{}' failed: {e}", cmd.name);
                if let Err(e) = message.reply(&diagnostic).await {
                    warn!(command = %cmd.name, error = %e, "failed to deliver diagnostic");
                }
            }
            return;
        }

        self.run_builtin(&cmd, message).await;
    }

    async fn run_builtin(&self, cmd: &ParsedCommand, message: &Message) {
        debug!(command = %cmd.name, sender = %message.sender, "running builtin");
        let reply = match cmd.name.as_str() {
            "status" => self.status_text(),
            "plugins" => self.plugin_list_text(),
            "reload" => self.reload_text(&message.sender),
            other => format!("Unknown command: {}{other}", self.prefix),
        };

        if let Err(e) = message.reply(&reply).await {
            warn!(command = %cmd.name, error = %e, "failed to send builtin reply");
        }
    }

    fn status_text(&self) -> String {
        let sessions = self.status.sessions();
        if sessions.is_empty() {
            return "No active sessions.".into();
        }
        let mut lines = vec![format!("{} active session(s):", sessions.len())];
        for s in sessions {
            lines.push(format!(
                "  {} - {} (reconnects: {})",
                s.session_id, s.state, s.reconnect_attempts
            ));
        }
        lines.join("\n")
    }

    fn plugin_list_text(&self) -> String {
        let names = self.plugins.names();
        if names.is_empty() {
            "No plugins registered.".into()
        } else {
            format!("Plugins: {}", names.join(", "))
        }
    }

    fn reload_text(&self, sender: &str) -> String {
        if !owner_matches(&self.owner, sender) {
            return "Only the owner can reload plugins.".into();
        }
        match self.plugins.reload() {
            Ok(count) => format!("Reloaded {count} plugin(s)."),
            Err(e) => {
                warn!(error = %e, "plugin reload failed");
                format!("Reload failed: {e}")
            },
        }
    }
}

/// Owner identity comparison on bare user parts.
///
/// The configured owner may be a bare phone number or a full chat
/// address; the sender is always a JID. Both sides are reduced to the
/// user part before comparing, so `"15551234567"` matches
/// `"15551234567:2@s.whatsapp.net"`. An empty owner matches nobody.
#[must_use]
pub fn owner_matches(owner: &str, sender: &str) -> bool {
    !owner.is_empty() && bare_user(owner) == bare_user(sender)
}
