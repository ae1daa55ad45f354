use std::{future::Future, pin::Pin, sync::Arc};

use {
    async_trait::async_trait,
    flock_wire::{Connection, Message},
};

/// A unit of command logic registered under a command name.
///
/// Handlers may fail; failures are isolated to the invocation and reported
/// back to the user by the dispatcher. Only side effects matter; there is
/// no return value beyond the outcome.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, message: &Message, connection: &dyn Connection) -> anyhow::Result<()>;
}

/// One handler definition as produced by a [`crate::PluginSource`].
#[derive(Clone)]
pub struct PluginDef {
    /// Command name the handler is registered under.
    pub name: String,
    pub handler: Arc<dyn CommandHandler>,
}

impl PluginDef {
    #[must_use]
    pub fn new(name: impl Into<String>, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl std::fmt::Debug for PluginDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDef")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Boxed handler function, for sources that build handlers from closures.
pub type HandlerFn = Arc<
    dyn for<'a> Fn(
            &'a Message,
            &'a dyn Connection,
        ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>
        + Send
        + Sync,
>;

/// Wraps a [`HandlerFn`] as a [`CommandHandler`].
pub struct FnHandler {
    f: HandlerFn,
}

impl FnHandler {
    #[must_use]
    pub fn new(f: HandlerFn) -> Arc<Self> {
        Arc::new(Self { f })
    }
}

#[async_trait]
impl CommandHandler for FnHandler {
    async fn handle(&self, message: &Message, connection: &dyn Connection) -> anyhow::Result<()> {
        (self.f)(message, connection).await
    }
}
