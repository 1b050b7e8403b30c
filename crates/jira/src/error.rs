use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("JIRA request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JIRA returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("template error: {0}")]
    Template(String),

    #[error(transparent)]
    Config(#[from] botplugs_config::Error),

    #[error(transparent)]
    Schedule(#[from] botplugs_plugins::Error),
}

impl Error {
    #[must_use]
    pub fn status(status: reqwest::StatusCode, body: impl Into<String>) -> Self {
        Self::Status {
            status: status.as_u16(),
            body: body.into(),
        }
    }

    #[must_use]
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
