use thiserror::Error;

/// Errors raised while building or parsing host-facing values.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    /// A command argument could not be interpreted.
    #[error("invalid argument '{value}': {reason}")]
    InvalidArgument { value: String, reason: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    #[must_use]
    pub fn invalid_argument(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
