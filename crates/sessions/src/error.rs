use flock_common::FromMessage;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection setup failed in a way retrying cannot fix.
    #[error(transparent)]
    Wire(#[from] flock_wire::Error),

    /// The session reached its terminal state; a stopped manager is never
    /// revived.
    #[error("session stopped: {session_id}")]
    Stopped { session_id: String },

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn stopped(session_id: impl Into<String>) -> Self {
        Self::Stopped {
            session_id: session_id.into(),
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

pub type Result<T> = std::result::Result<T, Error>;

flock_common::impl_context!();
