use thiserror::Error;

/// Failure of a call to the movie proxy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The proxy answered with a non-success status; `message` is its
    /// `{error}` body, or the status reason when there is none.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("network failure: {0}")]
    Network(String),
    #[error("undecodable proxy response: {0}")]
    Decode(String),
    #[error("invalid proxy url: {0}")]
    InvalidUrl(String),
}
