//! Session orchestration: one state machine per chat-account, kept alive
//! against an external messaging network.
//!
//! A [`SessionManager`] owns one connection, serializes its event stream,
//! persists credentials through the store, schedules bounded reconnects,
//! and feeds normalized messages into the command dispatcher. The
//! [`SessionRegistry`] is the process-wide table of live managers; the
//! [`SessionHost`] is the front door the bootstrap and administrative
//! collaborators call.

pub mod error;
pub mod host;
pub mod manager;
pub mod registry;

mod reaction;

#[cfg(test)]
pub(crate) mod testutil;

pub use {
    error::{Error, Result},
    host::SessionHost,
    manager::{SessionHandle, SessionManager, SessionState},
    registry::SessionRegistry,
};
