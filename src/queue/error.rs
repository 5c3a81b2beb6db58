use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue API error ({status}): {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type QueueResult<T> = Result<T, QueueError>;
