use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::clock::Clock;
use super::clock::SystemClock;
use super::errors::JwtError;

/// JWT token handler for issuing and verifying access tokens.
///
/// Tokens are signed with HS256 using a shared secret and expire a fixed
/// number of hours after issuance. Nothing is stored server side.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtHandler {
    const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Longest accepted token lifetime (one year).
    pub const MAX_TTL_HOURS: i64 = 24 * 365;

    /// Create a new JWT handler.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    /// * `ttl_hours` - Token lifetime in whole hours
    ///
    /// # Errors
    /// * `MissingSecret` - Secret is empty
    /// * `InvalidTtl` - Lifetime is not between 1 and `MAX_TTL_HOURS`
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Rotating the secret invalidates every outstanding token
    pub fn new(secret: &[u8], ttl_hours: i64) -> Result<Self, JwtError> {
        Self::with_clock(secret, ttl_hours, Arc::new(SystemClock))
    }

    /// Create a JWT handler reading time from `clock`.
    pub fn with_clock(
        secret: &[u8],
        ttl_hours: i64,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::MissingSecret);
        }
        if ttl_hours <= 0 || ttl_hours > Self::MAX_TTL_HOURS {
            return Err(JwtError::InvalidTtl(ttl_hours));
        }
        let ttl = Duration::try_hours(ttl_hours).ok_or(JwtError::InvalidTtl(ttl_hours))?;

        let mut validation = Validation::new(Self::ALGORITHM);
        // Expiry is checked against `clock` once the signature is verified.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
            clock,
        })
    }

    /// Token lifetime in hours.
    pub fn ttl_hours(&self) -> i64 {
        self.ttl.num_hours()
    }

    /// Issue a signed token for `claims`.
    ///
    /// `iat` is set to the current time and `exp` to `iat + ttl`. The
    /// signature covers every claim, including `exp`.
    ///
    /// # Errors
    /// * `SigningFailed` - Token encoding failed
    pub fn issue(&self, claims: &Claims) -> Result<String, JwtError> {
        let now = self.clock.now();

        let mut claims = claims.clone();
        claims.iat = now.timestamp();
        claims.exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| JwtError::SigningFailed("expiry is out of range".to_string()))?
            .timestamp();

        encode(&Header::new(Self::ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| JwtError::SigningFailed(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// The header algorithm must be HS256 and the signature must match before
    /// `exp` is looked at. Any failure is reported as `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                JwtError::InvalidToken
            })?;

        let now = self.clock.now().timestamp();
        if claims.is_expired(now) {
            tracing::debug!(exp = claims.exp, now, "Token rejected: expired");
            return Err(JwtError::InvalidToken);
        }

        Ok(claims)
    }
}

impl fmt::Debug for JwtHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtHandler")
            .field("algorithm", &Self::ALGORITHM)
            .field("ttl_hours", &self.ttl_hours())
            .finish_non_exhaustive()
    }
}
