use thiserror::Error;

/// Failure of a call to the upstream movie provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// The provider answered with a non-success HTTP status.
    #[error("provider responded with HTTP status {0}")]
    Transport(u16),
    /// The provider understood the request but flagged it as failed,
    /// e.g. "Movie not found!".
    #[error("{0}")]
    NotFound(String),
    /// The call never completed (connection refused, DNS, timeout...).
    #[error("network failure: {0}")]
    Network(String),
    /// The body was neither a success shape nor a failure flag.
    #[error("undecodable provider response: {0}")]
    Decode(String),
}
