//! Consumed surface of the external messaging network.
//!
//! The engine never touches the wire protocol itself; a network client
//! implements [`Transport`] and [`Connection`] and delivers lifecycle,
//! credential, and message events on an mpsc stream. This crate also owns
//! the canonical [`Message`] model and the normalizer that produces it
//! from raw inbound events.

pub mod error;
pub mod event;
pub mod jid;
pub mod message;
pub mod transport;

pub use {
    error::{Error, Result},
    event::{CloseReason, MessageKey, RawMessage, RawPayload, WireEvent},
    message::{Message, normalize},
    transport::{AuthState, ConnectOptions, Connection, Transport, WireEvents},
};
