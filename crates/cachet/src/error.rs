use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Cachet API call failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cachet API call failed with code: {status}")]
    Status { status: u16 },

    #[error(transparent)]
    Config(#[from] botplugs_config::Error),

    #[error(transparent)]
    Schedule(#[from] botplugs_plugins::Error),
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
