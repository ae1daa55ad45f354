use std::sync::Arc;

use {
    flock_commands::{CommandDispatcher, SessionStatusSource},
    flock_config::SessionSettings,
    flock_plugins::PluginRegistry,
    flock_store::CredentialStore,
    flock_wire::{AuthState, Transport},
};

use crate::{
    error::Result,
    manager::{SessionHandle, SessionManager},
    registry::SessionRegistry,
};

/// Shared engine dependencies handed to every session manager.
pub(crate) struct SessionContext {
    pub settings: SessionSettings,
    pub transport: Arc<dyn Transport>,
    pub store: Arc<CredentialStore>,
    pub dispatcher: Arc<CommandDispatcher>,
    pub registry: Arc<SessionRegistry>,
}

/// Front door for the bootstrap and administrative collaborators.
///
/// The pairing/QR surface calls [`start_session`](Self::start_session)
/// once it has auth material; the admin surface is a thin wrapper over
/// [`list_active_sessions`](Self::list_active_sessions) and
/// [`stop_session`](Self::stop_session).
pub struct SessionHost {
    ctx: Arc<SessionContext>,
}

impl SessionHost {
    /// Wire the engine together. The registry and dispatcher are created
    /// here, once, and shared by every session.
    #[must_use]
    pub fn new(
        settings: SessionSettings,
        transport: Arc<dyn Transport>,
        store: Arc<CredentialStore>,
        plugins: Arc<PluginRegistry>,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let dispatcher = Arc::new(CommandDispatcher::new(
            &settings,
            plugins,
            Arc::clone(&registry) as Arc<dyn SessionStatusSource>,
        ));
        Self {
            ctx: Arc::new(SessionContext {
                settings,
                transport,
                store,
                dispatcher,
                registry,
            }),
        }
    }

    pub(crate) fn context(&self) -> Arc<SessionContext> {
        Arc::clone(&self.ctx)
    }

    /// Start `session_id`, reusing the live manager when one exists.
    ///
    /// `auth` may be omitted; the credential store is consulted in that
    /// case, and an empty auth state is used as a last resort (the
    /// transport then runs its out-of-band pairing).
    pub async fn start_session(
        &self,
        session_id: &str,
        auth: Option<AuthState>,
    ) -> Result<SessionHandle> {
        if let Some(existing) = self.ctx.registry.get(session_id) {
            return existing.start().await;
        }
        let manager = SessionManager::new(session_id, auth, Arc::clone(&self.ctx));
        manager.start().await
    }

    /// Snapshots of all active sessions.
    #[must_use]
    pub fn list_active_sessions(&self) -> Vec<SessionHandle> {
        self.ctx.registry.list()
    }

    /// Stop one session. Returns whether it existed.
    pub async fn stop_session(&self, session_id: &str) -> bool {
        self.ctx.registry.stop(session_id).await
    }

    /// Stop every active session (process shutdown).
    pub async fn shutdown(&self) {
        for handle in self.ctx.registry.list() {
            self.ctx.registry.stop(&handle.session_id).await;
        }
    }

    #[must_use]
    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.ctx.registry)
    }
}
