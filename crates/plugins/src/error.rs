use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid schedule '{spec}': {reason}")]
    InvalidSchedule { spec: String, reason: String },

    #[error("unknown periodic command: {name}")]
    UnknownPeriodic { name: String },

    #[error(transparent)]
    CronParse(#[from] cron::error::Error),
}

impl Error {
    #[must_use]
    pub fn invalid_schedule(spec: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidSchedule {
            spec: spec.into(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn unknown_periodic(name: impl Into<String>) -> Self {
        Self::UnknownPeriodic { name: name.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
