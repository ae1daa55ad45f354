use {flock_common::FromMessage, std::error::Error as StdError};

/// Crate-wide result type for wire operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors shared across the transport traits.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Supplied authentication material cannot be used to dial.
    #[error("invalid auth state: {message}")]
    InvalidAuth { message: String },

    /// Operation requires a live link and there is none.
    #[error("not connected")]
    NotConnected,

    /// An outbound send was rejected or timed out.
    #[error("send failed: {context}: {source}")]
    Send {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// JSON (de)serialization failed.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn invalid_auth(message: impl std::fmt::Display) -> Self {
        Self::InvalidAuth {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn send(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Send {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message { message }
    }
}

flock_common::impl_context!();
