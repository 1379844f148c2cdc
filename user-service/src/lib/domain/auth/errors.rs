use thiserror::Error;

/// Failures of the login flow and of bearer token verification.
///
/// `InvalidCredentials` and `InvalidToken` are the only kinds whose message
/// reaches a client verbatim. The others carry detail for the server log.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token")]
    InvalidToken,

    #[error("Infrastructure failure: {0}")]
    Infrastructure(String),

    #[error("Request cancelled: {0}")]
    Cancelled(String),
}
