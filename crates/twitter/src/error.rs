use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing API credentials")]
    MissingCredentials,

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("twitter request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("twitter returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl Error {
    #[must_use]
    pub fn status(status: reqwest::StatusCode, body: impl Into<String>) -> Self {
        Self::Status {
            status: status.as_u16(),
            body: body.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
