pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("`concurrency` must be a positive integer")]
    InvalidConcurrency,

    #[error("`duration` must be a positive duration")]
    InvalidDuration,

    #[error("`request_timeout` must be a positive duration")]
    InvalidRequestTimeout,

    #[error("cannot start http client: {0}")]
    Client(#[from] adbench_http::Error),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    /// Errors caused by the run configuration rather than the environment.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidConcurrency
                | Self::InvalidDuration
                | Self::InvalidRequestTimeout
                | Self::Client(_)
        )
    }
}
