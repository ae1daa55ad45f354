use crate::handler::PluginDef;

/// Enumerates handler definitions for the registry.
///
/// The engine does not care where definitions come from: a fixed set
/// wired up at startup, a manifest, a directory scan. Each `load()` and
/// `reload()` asks the source for the full current set.
pub trait PluginSource: Send + Sync {
    fn definitions(&self) -> anyhow::Result<Vec<PluginDef>>;
}

/// Fixed in-process source: the definition set is chosen at construction.
pub struct StaticSource {
    defs: Vec<PluginDef>,
}

impl StaticSource {
    #[must_use]
    pub fn new(defs: Vec<PluginDef>) -> Self {
        Self { defs }
    }
}

impl PluginSource for StaticSource {
    fn definitions(&self) -> anyhow::Result<Vec<PluginDef>> {
        Ok(self.defs.clone())
    }
}
