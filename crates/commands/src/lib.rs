//! Command parsing and dispatch.
//!
//! Inbound text that starts with the configured prefix is parsed into a
//! command name and argument string, resolved against the plugin registry
//! first and a fixed builtin table second, and executed with failure
//! isolation: a handler error becomes a short in-chat diagnostic, never a
//! dead session.

pub mod dispatch;
pub mod parse;
pub mod status;

pub use {
    dispatch::{CommandDispatcher, owner_matches},
    parse::{ParsedCommand, parse_command},
    status::{SessionBrief, SessionStatusSource},
};
