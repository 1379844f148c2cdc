use thiserror::Error;

/// Error type for JWT operations.
///
/// Verification failures are deliberately a single variant: callers cannot
/// tell a bad signature from an expired or malformed token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("JWT signing secret is not configured")]
    MissingSecret,

    #[error("Token lifetime must be between 1 and 8760 hours, got {0}")]
    InvalidTtl(i64),

    #[error("Failed to sign token: {0}")]
    SigningFailed(String),

    #[error("Invalid token")]
    InvalidToken,
}
