//! Command plugin system.
//!
//! Handlers are registered under command names and resolved by the
//! dispatcher before any builtin. The registry is populated at startup
//! from a [`PluginSource`] and can be rebuilt at runtime with an atomic
//! whole-map swap, so an in-flight dispatch always observes either the old
//! or the new mapping in full.

pub mod handler;
pub mod registry;
pub mod source;

pub use {
    handler::{CommandHandler, FnHandler, HandlerFn, PluginDef},
    registry::PluginRegistry,
    source::{PluginSource, StaticSource},
};
