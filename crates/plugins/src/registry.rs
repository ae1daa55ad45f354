use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use tracing::{info, warn};

use crate::{handler::CommandHandler, source::PluginSource};

type HandlerMap = HashMap<String, Arc<dyn CommandHandler>>;

/// Registry of command handlers keyed by (case-folded) command name.
///
/// Lookups clone an `Arc` snapshot of the whole mapping, so handler
/// execution happens outside any lock and `reload()` can swap the mapping
/// wholesale without a dispatch ever observing a partial mix.
pub struct PluginRegistry {
    source: Arc<dyn PluginSource>,
    handlers: RwLock<Arc<HandlerMap>>,
}

impl PluginRegistry {
    /// Create an empty registry over `source`. Call [`load`](Self::load)
    /// to populate it.
    #[must_use]
    pub fn new(source: Arc<dyn PluginSource>) -> Self {
        Self {
            source,
            handlers: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// Populate the mapping from the source.
    ///
    /// Invalid definitions (empty or whitespace-carrying names, duplicates
    /// within one load; first wins) are skipped and logged, never fatal.
    /// Errors only when the source itself cannot enumerate. Returns the
    /// number of handlers registered.
    pub fn load(&self) -> anyhow::Result<usize> {
        let defs = self.source.definitions()?;
        let mut map: HandlerMap = HashMap::with_capacity(defs.len());

        for def in defs {
            let name = def.name.trim().to_lowercase();
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                warn!(name = %def.name, "skipping plugin with invalid command name");
                continue;
            }
            if map.contains_key(&name) {
                warn!(name = %name, "skipping duplicate plugin definition");
                continue;
            }
            map.insert(name, def.handler);
        }

        let count = map.len();
        let mut handlers = self.handlers.write().unwrap();
        *handlers = Arc::new(map);
        info!(count, "plugin registry loaded");
        Ok(count)
    }

    /// Rebuild the mapping from scratch and swap it in atomically.
    pub fn reload(&self) -> anyhow::Result<usize> {
        self.load()
    }

    /// Resolve a handler by exact (case-folded) name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.snapshot().get(name).cloned()
    }

    /// The current mapping as a consistent snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<HandlerMap> {
        Arc::clone(&self.handlers.read().unwrap())
    }

    /// Registered command names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.snapshot().keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
