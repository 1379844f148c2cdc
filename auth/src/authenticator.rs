use std::sync::Arc;

use crate::jwt::Claims;
use crate::jwt::Clock;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and JWT issuance.
///
/// Holds only immutable configuration (cost parameters, secret, TTL), so one
/// instance can be shared across all requests without locking.
#[derive(Debug)]
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
}

/// Result of successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("JWT error: {0}")]
    Jwt(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `ttl_hours` - Lifetime of issued tokens in hours
    ///
    /// # Errors
    /// * `Jwt(MissingSecret)` / `Jwt(InvalidTtl)` - Configuration is unusable
    pub fn new(jwt_secret: &[u8], ttl_hours: i64) -> Result<Self, AuthenticationError> {
        Ok(Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret, ttl_hours)?,
        })
    }

    /// Create an authenticator whose tokens read time from `clock`.
    pub fn with_clock(
        jwt_secret: &[u8],
        ttl_hours: i64,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AuthenticationError> {
        Ok(Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::with_clock(jwt_secret, ttl_hours, clock)?,
        })
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored hash.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and issue a token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `claims` - Identity claims to bind into the token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match or the hash is unusable
    /// * `Jwt` - Token signing failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        claims: &Claims,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.jwt_handler.issue(claims)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Issue a token without password verification.
    pub fn issue_token(&self, claims: &Claims) -> Result<String, JwtError> {
        self.jwt_handler.issue(claims)
    }

    /// Validate a token and return its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.verify(token)
    }

    /// Lifetime of issued tokens in hours.
    pub fn token_ttl_hours(&self) -> i64 {
        self.jwt_handler.ttl_hours()
    }
}
