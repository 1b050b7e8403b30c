use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("bitly request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("bitly API request returned non-20x code: {status}")]
    Status { status: u16 },

    #[error("bitly response has no link")]
    MissingLink,
}

impl Error {
    #[must_use]
    pub fn status(status: reqwest::StatusCode) -> Self {
        Self::Status {
            status: status.as_u16(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
